use anyhow::Result;
use chrono::{Local, Timelike};
use clap::Args;
use colored::Colorize;
use std::io::IsTerminal;

use super::display::{section, spinner};
use crate::context::AppContext;
use crate::router::Route;
use crate::ui::{self, command_for, greeting, App, Dashboard, DashboardData};

#[derive(Args)]
pub struct DashboardCommand {
    /// Print a summary instead of launching the interactive dashboard
    #[arg(long)]
    plain: bool,
}

fn print_summary(data: &DashboardData, hour: u32) {
    let user = &data.user;

    println!("{}, {}!", greeting(hour), user.nombre.bold());
    println!("{}", user.rol.welcome_message());
    println!();

    match user.bmi() {
        Some(bmi) => println!(
            "IMC: {:.1} ({})",
            bmi,
            crate::models::BmiCategory::from_bmi(bmi)
        ),
        None => println!("IMC: completa tu peso y estatura en el perfil"),
    }

    if let Some(counts) = &data.counts {
        println!();
        section("Usuarios por rol");
        for count in counts {
            println!(
                "  {:<14} {:>4} ({} activos)",
                count.rol.to_string(),
                count.total,
                count.activos
            );
        }
    }

    println!();
    section("Menú");
    for route in crate::router::nav_items(user.rol) {
        println!("  {:<14} {}", route.title(), command_for(route).dimmed());
    }
}

impl DashboardCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        ctx.enter(Route::Dashboard).await?;
        let hour = Local::now().hour();

        let progress = spinner("Loading dashboard...");
        let data = ui::load(ctx).await;
        progress.finish_and_clear();
        let data = data?;

        if self.plain || !std::io::stdout().is_terminal() {
            print_summary(&data, hour);
            return Ok(());
        }

        let app = App::new(data.user, data.counts, hour);
        let mut dashboard = Dashboard::new(app)?;
        let result = dashboard.run(ctx).await;
        dashboard.cleanup()?;

        result
    }
}
