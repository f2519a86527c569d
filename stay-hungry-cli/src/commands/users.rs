use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::display::{fit, section, spinner, success};
use crate::api::AdminUserUpdate;
use crate::context::AppContext;
use crate::export::{self, reports};
use crate::models::{active_count, Rol, StatusFilter, UserFilter, UserProfile};
use crate::router::Route;

#[derive(Subcommand)]
pub enum UsersSubcommands {
    /// List users, active and inactive
    List {
        /// Only this role (administrador, entrenador, cliente)
        #[arg(short, long)]
        rol: Option<Rol>,

        /// todos, activos or inactivos
        #[arg(short, long, default_value = "todos")]
        status: StatusFilter,

        /// Substring of name or email
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Change a user's name or role
    Edit {
        /// User ID
        id: i64,

        #[arg(long)]
        nombre: Option<String>,

        #[arg(long)]
        rol: Option<Rol>,
    },

    /// Activate or deactivate a user
    Toggle {
        /// User ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Export all users to an xlsx workbook
    Export,
}

fn find(users: &[UserProfile], id: i64) -> Result<&UserProfile> {
    users
        .iter()
        .find(|u| u.id == id)
        .with_context(|| format!("User {} not found", id))
}

/// Name and role to send, keeping current values for what is not given
pub fn edit_request(user: &UserProfile, nombre: Option<String>, rol: Option<Rol>) -> Result<AdminUserUpdate> {
    if !user.activo {
        bail!(
            "{} está inactivo; actívalo con 'stay-hungry users toggle {}' antes de editarlo",
            user.nombre,
            user.id
        );
    }

    let nombre = nombre.unwrap_or_else(|| user.nombre.clone());
    let nombre = nombre.trim();
    if nombre.is_empty() {
        bail!("El nombre es requerido");
    }

    Ok(AdminUserUpdate {
        nombre: nombre.to_string(),
        rol: rol.unwrap_or(user.rol),
    })
}

fn print_users(users: &[&UserProfile]) {
    println!(
        "{:>5}  {:<24} {:<28} {:<14} {:>4}  {}",
        "ID".bold(),
        "Nombre".bold(),
        "Email".bold(),
        "Rol".bold(),
        "Edad".bold(),
        "Estado".bold()
    );
    for user in users {
        let estado = if user.activo {
            "Activo".green()
        } else {
            "Inactivo".red()
        };
        println!(
            "{:>5}  {:<24} {:<28} {:<14} {:>4}  {}",
            user.id,
            fit(&user.nombre, 24),
            fit(&user.email, 28),
            user.rol.to_string(),
            user.edad.map(|e| e.to_string()).unwrap_or_default(),
            estado
        );
    }
}

fn print_counts(users: &[UserProfile]) {
    let counts: Vec<String> = Rol::ALL
        .iter()
        .map(|rol| format!("{}: {}", rol, active_count(users, *rol)))
        .collect();
    println!("Activos por rol  {}", counts.join("  "));
}

impl UsersSubcommands {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        ctx.enter(Route::Users).await?;

        let progress = spinner("Loading users...");
        let users = ctx.api.users().await;
        progress.finish_and_clear();
        let users = users?;

        match self {
            UsersSubcommands::List {
                rol,
                status,
                search,
            } => {
                let filter = UserFilter {
                    rol,
                    status,
                    search: search.filter(|s| !s.trim().is_empty()),
                };
                let shown: Vec<&UserProfile> = users.iter().filter(|u| filter.matches(u)).collect();

                section(&format!("Usuarios ({} de {})", shown.len(), users.len()));
                if shown.is_empty() {
                    println!("No hay usuarios que coincidan con el filtro.");
                } else {
                    print_users(&shown);
                }
                println!();
                print_counts(&users);
                Ok(())
            }
            UsersSubcommands::Edit { id, nombre, rol } => {
                let user = find(&users, id)?;
                let update = edit_request(user, nombre, rol)?;

                ctx.api.admin_update_user(id, &update).await?;
                success(&format!("Usuario {} actualizado ({}, {})", id, update.nombre, update.rol));
                Ok(())
            }
            UsersSubcommands::Toggle { id, force } => {
                let user = find(&users, id)?;
                let activo = !user.activo;

                if !activo && !force {
                    let confirmed = Confirm::new()
                        .with_prompt(format!("¿Desactivar a {}?", user.nombre))
                        .default(false)
                        .interact()?;
                    if !confirmed {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }

                ctx.api.set_user_status(id, activo).await?;
                let estado = if activo { "activado" } else { "desactivado" };
                success(&format!("Usuario {} {}", user.nombre, estado));
                Ok(())
            }
            UsersSubcommands::Export => {
                let filename = reports::users_filename(Local::now().date_naive());
                let bytes = export::workbook_bytes(&reports::users_sheets(&users))?;
                let path = export::write_file(&ctx.export_dir(), &filename, &bytes)?;

                success(&format!("Exported {} users to {}", users.len(), path.display()));
                Ok(())
            }
        }
    }
}
