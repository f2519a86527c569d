use anyhow::Result;
use clap::Args;

use super::display::success;
use crate::context::AppContext;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        if !ctx.session.is_authenticated() {
            println!("You are not logged in.");
            return Ok(());
        }

        ctx.session.logout()?;

        success("Logged out successfully!");

        Ok(())
    }
}
