mod analytics;
mod clients;
mod config_cmd;
mod dashboard;
pub mod display;
pub mod login;
mod logout;
mod profile;
mod progress;
pub mod register;
mod routine;
mod templates;
mod users;
mod whoami;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

use crate::context::AppContext;
use crate::validation::FieldErrors;

pub use analytics::AnalyticsCommand;
pub use clients::ClientsSubcommands;
pub use dashboard::DashboardCommand;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use profile::ProfileSubcommands;
pub use progress::ProgressCommand;
pub use register::RegisterCommand;
pub use routine::RoutineSubcommands;
pub use templates::TemplatesSubcommands;
pub use users::UsersSubcommands;
pub use whoami::WhoamiCommand;

/// Outcome of a form submission
#[derive(Debug)]
pub enum Submitted<T> {
    /// Validation failed locally; no request was sent
    Invalid(FieldErrors),
    Accepted(T),
}

#[derive(Parser)]
#[command(name = "stay-hungry")]
#[command(about = "Terminal client for the Stay Hungry Gym", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "STAY_HUNGRY_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login to Stay Hungry
    Login(LoginCommand),

    /// Create a client account
    Register(RegisterCommand),

    /// Logout and clear the stored session
    Logout(LogoutCommand),

    /// Show current user information
    Whoami(WhoamiCommand),

    /// Show or update your profile
    #[command(subcommand)]
    Profile(ProfileSubcommands),

    /// Launch the dashboard
    Dashboard(DashboardCommand),

    /// Manage users (Administrador)
    #[command(subcommand)]
    Users(UsersSubcommands),

    /// Gym reports (Administrador)
    Analytics(AnalyticsCommand),

    /// Manage your clients (Entrenador)
    #[command(subcommand)]
    Clients(ClientsSubcommands),

    /// Build and assign routine templates (Entrenador)
    #[command(subcommand)]
    Templates(TemplatesSubcommands),

    /// Today's routine and set logging (Cliente)
    #[command(subcommand)]
    Routine(RoutineSubcommands),

    /// Weight, BMI, strength and calories over time (Cliente)
    Progress(ProgressCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Edit configuration file
    Edit,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let config_path = self.config.as_deref().map(Path::new);

        let command = match self.command {
            Commands::Config(subcmd) => {
                return match subcmd {
                    ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                    ConfigSubcommands::Edit => config_cmd::edit_config(config_path).await,
                    ConfigSubcommands::Init { force } => {
                        config_cmd::init_config(config_path, force).await
                    }
                };
            }
            Commands::Completions { shell } => {
                generate_completions(shell);
                return Ok(());
            }
            command => command,
        };

        let mut ctx = AppContext::init(config_path)?;
        let result = run(command, &mut ctx).await;

        if ctx.session_expired() {
            display::session_expired();
        }
        ctx.finish().await;

        result
    }
}

async fn run(command: Commands, ctx: &mut AppContext) -> Result<()> {
    match command {
        Commands::Login(cmd) => cmd.execute(ctx).await,
        Commands::Register(cmd) => cmd.execute(ctx).await,
        Commands::Logout(cmd) => cmd.execute(ctx).await,
        Commands::Whoami(cmd) => cmd.execute(ctx).await,
        Commands::Profile(subcmd) => subcmd.execute(ctx).await,
        Commands::Dashboard(cmd) => cmd.execute(ctx).await,
        Commands::Users(subcmd) => subcmd.execute(ctx).await,
        Commands::Analytics(cmd) => cmd.execute(ctx).await,
        Commands::Clients(subcmd) => subcmd.execute(ctx).await,
        Commands::Templates(subcmd) => subcmd.execute(ctx).await,
        Commands::Routine(subcmd) => subcmd.execute(ctx).await,
        Commands::Progress(cmd) => cmd.execute(ctx).await,
        Commands::Config(_) | Commands::Completions { .. } => Ok(()),
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
