use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::display::spinner;
use crate::context::AppContext;
use crate::router::nav_items;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        if !ctx.session.is_authenticated() {
            println!("You are not logged in.");
            println!();
            println!("Use 'stay-hungry login' to authenticate.");
            return Ok(());
        }

        let progress = spinner("Fetching user information...");
        let result = ctx.api.profile().await;
        progress.finish_and_clear();

        match result {
            Ok(user) => {
                println!("{} Authenticated as:", "✓".green());
                println!();
                println!("  Name:    {} ({})", user.nombre, user.initials());
                println!("  Email:   {}", user.email);
                println!("  Role:    {}", user.rol);
                println!("  User ID: {}", user.id);
                println!();

                let menu: Vec<&str> = nav_items(user.rol).iter().map(|r| r.path()).collect();
                println!("  Screens: {}", menu.join(", "));

                Ok(())
            }
            Err(e) => {
                println!("{} Failed to fetch user information: {}", "✗".red(), e);
                Err(e)
            }
        }
    }
}
