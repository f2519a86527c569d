use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::display::{print_field_errors, spinner, success};
use super::Submitted;
use crate::api::{ApiClient, AuthData};
use crate::context::AppContext;
use crate::router::Route;
use crate::validation::RegisterForm;

/// Create a new client account
#[derive(Args)]
pub struct RegisterCommand {
    #[arg(long)]
    nombre: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// Age in years (16-100)
    #[arg(long)]
    edad: Option<String>,

    /// Weight in kg (30-300)
    #[arg(long)]
    peso: Option<String>,

    /// Height in metres (1.0-2.5)
    #[arg(long)]
    estatura: Option<String>,
}

/// Validate and send the registration form; nothing is sent when invalid
pub async fn submit(api: &ApiClient, form: &RegisterForm) -> Result<Submitted<AuthData>> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!("Registration form rejected: {}", errors);
            return Ok(Submitted::Invalid(errors));
        }
    };

    let auth = api.register(&request).await?;
    Ok(Submitted::Accepted(auth))
}

fn ask(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
    }
}

impl RegisterCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        if let Some(user) = ctx.session.user() {
            println!("Already logged in as {}.", user.email);
            return Ok(());
        }
        ctx.track(Route::Register).await;

        println!("{}", "Stay Hungry Gym - Registro".bold());
        println!();

        let nombre = ask(self.nombre, "Nombre completo")?;
        let email = ask(self.email, "Email")?;
        let password = Password::new()
            .with_prompt("Contraseña")
            .allow_empty_password(true)
            .interact()?;
        let confirm_password = Password::new()
            .with_prompt("Confirmar contraseña")
            .allow_empty_password(true)
            .interact()?;
        let edad = ask(self.edad, "Edad")?;
        let peso = ask(self.peso, "Peso (kg)")?;
        let estatura = ask(self.estatura, "Estatura (m)")?;

        let form = RegisterForm {
            nombre,
            email,
            password,
            confirm_password,
            edad,
            peso,
            estatura,
        };

        let progress = spinner("Creating account...");
        let result = submit(&ctx.api, &form).await;
        progress.finish_and_clear();

        match result? {
            Submitted::Accepted(auth) => {
                success("Account created!");
                println!();
                println!("¡Bienvenido, {}!", auth.user.nombre);
                println!("{}", auth.user.rol.welcome_message());
                ctx.track(Route::Dashboard).await;
                Ok(())
            }
            Submitted::Invalid(errors) => {
                print_field_errors(&errors);
                Err(errors.into())
            }
        }
    }
}
