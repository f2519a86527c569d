use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::display::{print_field_errors, spinner, success};
use super::Submitted;
use crate::api::{ApiClient, AuthData};
use crate::context::AppContext;
use crate::router::Route;
use crate::validation::LoginForm;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,
}

/// Validate and send the login form; nothing is sent when invalid
pub async fn submit(api: &ApiClient, form: &LoginForm) -> Result<Submitted<AuthData>> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => return Ok(Submitted::Invalid(errors)),
    };

    let auth = api.login(&request).await?;
    Ok(Submitted::Accepted(auth))
}

impl LoginCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        if let Some(user) = ctx.session.user() {
            println!("Already logged in as {} ({}).", user.email, user.rol);
            println!("Use 'stay-hungry logout' to switch accounts.");
            return Ok(());
        }
        ctx.track(Route::Login).await;

        println!("{}", "Stay Hungry Gym - Login".bold());
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new().with_prompt("Password").interact()?;

        let form = LoginForm { email, password };

        let progress = spinner("Logging in...");
        let result = submit(&ctx.api, &form).await;
        progress.finish_and_clear();

        match result {
            Ok(Submitted::Accepted(auth)) => {
                success("Login successful!");
                println!();
                println!("¡Bienvenido, {}!", auth.user.nombre);
                println!("{}", auth.user.rol.welcome_message());
                ctx.track(Route::Dashboard).await;
                Ok(())
            }
            Ok(Submitted::Invalid(errors)) => {
                print_field_errors(&errors);
                Err(errors.into())
            }
            Err(e) => {
                println!("{} Login failed: {}", "✗".red(), e);
                Err(e)
            }
        }
    }
}
