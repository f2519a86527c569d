use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::display::{num, opt, print_field_errors, section, spinner, success};
use super::Submitted;
use crate::api::ApiClient;
use crate::context::AppContext;
use crate::models::{BmiCategory, UserProfile};
use crate::router::Route;
use crate::validation::ProfileForm;

#[derive(Subcommand)]
pub enum ProfileSubcommands {
    /// Show your profile
    Show,

    /// Update name, age, weight or height
    Update {
        #[arg(long)]
        nombre: Option<String>,

        /// Age in years (16-100)
        #[arg(long)]
        edad: Option<String>,

        /// Weight in kg (30-300)
        #[arg(long)]
        peso: Option<String>,

        /// Height in metres (1.0-2.5)
        #[arg(long)]
        estatura: Option<String>,
    },
}

/// Validate and send a profile update; nothing is sent when invalid
pub async fn submit(api: &ApiClient, form: &ProfileForm) -> Result<Submitted<UserProfile>> {
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => return Ok(Submitted::Invalid(errors)),
    };

    let user = api.update_profile(&update).await?;
    Ok(Submitted::Accepted(user))
}

/// Form prefilled from the current profile, with the given overrides
fn prefill(user: &UserProfile, nombre: Option<String>, edad: Option<String>, peso: Option<String>, estatura: Option<String>) -> ProfileForm {
    ProfileForm {
        nombre: nombre.unwrap_or_else(|| user.nombre.clone()),
        edad: edad.unwrap_or_else(|| opt(user.edad)),
        peso: peso.unwrap_or_else(|| opt(user.peso)),
        estatura: estatura.unwrap_or_else(|| opt(user.estatura)),
    }
}

fn print_profile(user: &UserProfile) {
    section(&format!("{}  {}", user.initials(), user.nombre));
    println!("  Email:         {}", user.email);
    println!("  Rol:           {}", user.rol);
    println!("  Edad:          {}", opt(user.edad));
    println!("  Peso:          {} kg", num(user.peso, 1));
    println!("  Estatura:      {} m", num(user.estatura, 2));

    match user.bmi() {
        Some(bmi) => println!("  IMC:           {:.1} ({})", bmi, BmiCategory::from_bmi(bmi)),
        None => println!("  IMC:           -"),
    }

    println!("  Miembro desde: {}", user.member_since());
    let estado = if user.activo { "Activo".green() } else { "Inactivo".red() };
    println!("  Estado:        {}", estado);
}

impl ProfileSubcommands {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        ctx.enter(Route::Profile).await?;

        let progress = spinner("Loading profile...");
        let current = ctx.api.profile().await;
        progress.finish_and_clear();
        let current = current?;

        match self {
            ProfileSubcommands::Show => {
                print_profile(&current);
                Ok(())
            }
            ProfileSubcommands::Update {
                nombre,
                edad,
                peso,
                estatura,
            } => {
                let form = prefill(&current, nombre, edad, peso, estatura);

                let progress = spinner("Saving profile...");
                let result = submit(&ctx.api, &form).await;
                progress.finish_and_clear();

                match result? {
                    Submitted::Accepted(user) => {
                        success("Perfil actualizado");
                        println!();
                        print_profile(&user);
                        Ok(())
                    }
                    Submitted::Invalid(errors) => {
                        print_field_errors(&errors);
                        Err(errors.into())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rol;

    #[test]
    fn test_prefill_keeps_unchanged_fields() {
        let user = UserProfile {
            id: 3,
            nombre: "Luis Pérez".to_string(),
            email: "luis@gym.com".to_string(),
            rol: Rol::Cliente,
            edad: Some(28),
            peso: Some(75.5),
            estatura: Some(1.78),
            fecha_registro: None,
            activo: true,
        };

        let form = prefill(&user, None, None, Some("74".to_string()), None);
        assert_eq!(form.nombre, "Luis Pérez");
        assert_eq!(form.edad, "28");
        assert_eq!(form.peso, "74");
        assert_eq!(form.estatura, "1.78");

        let update = form.validate().unwrap();
        assert_eq!(update.peso, 74.0);
    }
}
