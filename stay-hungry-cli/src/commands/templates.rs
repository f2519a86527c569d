use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use colored::Colorize;

use super::display::{fit, opt, print_field_errors, section, spinner, success};
use crate::api::{NewTemplate, RoutineAssignment};
use crate::context::AppContext;
use crate::router::Route;
use crate::validation::{search_term, validate_template_items, TemplateItemRow, MIN_SEARCH_LEN};

#[derive(Subcommand)]
pub enum TemplatesSubcommands {
    /// Search the exercise catalogue
    Exercises {
        /// Name fragment (at least 2 characters)
        term: String,
    },

    /// Create an empty routine template
    Create {
        #[arg(long)]
        nombre: String,

        #[arg(long)]
        descripcion: Option<String>,
    },

    /// Save the exercises of a template
    AddExercises {
        /// Template ID
        plantilla_id: i64,

        /// EJERCICIO_ID:ORDEN:SERIES:REPS[:PESO], repeatable
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },

    /// Assign a template to one of your clients
    Assign {
        /// Template ID
        plantilla_id: i64,

        /// Client ID
        cliente_id: i64,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        inicio: Option<NaiveDate>,
    },
}

/// Split `ejercicio:orden:series:reps[:peso]` into a form row; missing parts
/// stay empty so validation reports them
pub fn parse_item_row(raw: &str) -> TemplateItemRow {
    let mut parts = raw.split(':').map(|p| p.trim().to_string());
    let mut next = || parts.next().unwrap_or_default();

    TemplateItemRow {
        ejercicio_id: next(),
        orden: next(),
        series: next(),
        repeticiones: next(),
        peso_objetivo: next(),
    }
}

impl TemplatesSubcommands {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let session = ctx.enter(Route::TrainerRoutines).await?;
        let entrenador_id = session.user.id;

        match self {
            TemplatesSubcommands::Exercises { term } => {
                let Some(term) = search_term(&term) else {
                    println!("Type at least {} characters to search.", MIN_SEARCH_LEN);
                    return Ok(());
                };

                let progress = spinner("Searching exercises...");
                let exercises = ctx.api.search_exercises(term).await;
                progress.finish_and_clear();
                let exercises = exercises?;

                if exercises.is_empty() {
                    println!("Sin resultados para \"{}\".", term);
                    return Ok(());
                }

                println!(
                    "{:>5}  {:<30} {:<16} {}",
                    "ID".bold(),
                    "Ejercicio".bold(),
                    "Grupo".bold(),
                    "Dificultad".bold()
                );
                for exercise in exercises {
                    println!(
                        "{:>5}  {:<30} {:<16} {}",
                        exercise.id,
                        fit(&exercise.nombre, 30),
                        fit(&opt(exercise.grupo_muscular), 16),
                        opt(exercise.dificultad)
                    );
                }
                Ok(())
            }
            TemplatesSubcommands::Create {
                nombre,
                descripcion,
            } => {
                let nombre = nombre.trim();
                if nombre.is_empty() {
                    bail!("El nombre de la plantilla es requerido");
                }

                let template = NewTemplate {
                    entrenador_id,
                    nombre: nombre.to_string(),
                    descripcion: descripcion.filter(|d| !d.trim().is_empty()),
                };
                let id = ctx.api.create_template(&template).await?;

                success(&format!("Plantilla \"{}\" creada con ID {}", template.nombre, id));
                println!();
                println!(
                    "Add exercises with: stay-hungry templates add-exercises {} --item EJERCICIO:ORDEN:SERIES:REPS",
                    id
                );
                Ok(())
            }
            TemplatesSubcommands::AddExercises {
                plantilla_id,
                items,
            } => {
                let rows: Vec<TemplateItemRow> = items.iter().map(|raw| parse_item_row(raw)).collect();
                let items = match validate_template_items(&rows) {
                    Ok(items) => items,
                    Err(errors) => {
                        print_field_errors(&errors);
                        return Err(errors.into());
                    }
                };

                ctx.api.save_template_items(plantilla_id, &items).await?;

                section(&format!("Plantilla {}", plantilla_id));
                for item in &items {
                    println!(
                        "  {}. ejercicio {}  {} x {}{}",
                        item.orden,
                        item.ejercicio_id,
                        item.series,
                        item.repeticiones,
                        item.peso_objetivo
                            .map(|p| format!(" @ {} kg", p))
                            .unwrap_or_default()
                    );
                }
                success(&format!("{} ejercicios guardados", items.len()));
                Ok(())
            }
            TemplatesSubcommands::Assign {
                plantilla_id,
                cliente_id,
                inicio,
            } => {
                let assignment = RoutineAssignment {
                    plantilla_id,
                    entrenador_id,
                    cliente_id,
                    fecha_inicio: inicio.unwrap_or_else(|| Local::now().date_naive()),
                };
                ctx.api.assign_routine(&assignment).await?;

                success(&format!(
                    "Plantilla {} asignada al cliente {} desde {}",
                    plantilla_id, cliente_id, assignment.fecha_inicio
                ));
                Ok(())
            }
        }
    }
}
