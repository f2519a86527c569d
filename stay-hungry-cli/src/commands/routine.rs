use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use super::display::{num, opt, print_field_errors, section, spinner, success};
use crate::context::AppContext;
use crate::models::{NewSet, SessionItem, SetRow, TodaySession};
use crate::router::Route;
use crate::validation::SetForm;

#[derive(Subcommand)]
pub enum RoutineSubcommands {
    /// Show today's session
    Today,

    /// Mark an exercise done, or undone if it already was
    Toggle {
        /// Routine item ID (shown by `routine today`)
        item: i64,
    },

    /// List the sets logged today for an exercise
    Sets {
        /// Routine item ID
        item: i64,
    },

    /// Log a set for an exercise
    LogSet {
        /// Routine item ID
        item: i64,

        #[arg(long)]
        reps: String,

        /// Weight in kg
        #[arg(long)]
        peso: String,

        /// Rate of perceived exertion
        #[arg(long, default_value = "")]
        rpe: String,

        /// Mark as a max attempt
        #[arg(long = "max")]
        es_max: bool,

        /// Set number, defaults to the next one
        #[arg(long)]
        set_num: Option<u32>,
    },
}

fn session_id(today: &TodaySession) -> Result<i64> {
    match today.sesion_id {
        Some(id) => Ok(id),
        None => bail!("No tienes una rutina activa para hoy"),
    }
}

fn item(today: &TodaySession, id: i64) -> Result<&SessionItem> {
    today
        .items
        .iter()
        .find(|i| i.plantilla_ejercicio_id == id)
        .with_context(|| format!("Exercise {} is not part of today's routine", id))
}

fn print_today(today: &TodaySession) {
    let done = today.items.iter().filter(|i| i.completado).count();
    section(&format!(
        "Rutina de hoy {} ({}/{} completados)",
        today.date,
        done,
        today.items.len()
    ));

    for item in &today.items {
        let mark = if item.completado {
            "✓".green()
        } else {
            "·".dimmed()
        };
        println!(
            "  {} [{:>4}] {:<28} {} x {}",
            mark,
            item.plantilla_ejercicio_id,
            item.ejercicio_nombre,
            opt(item.series),
            opt(item.repeticiones)
        );
    }
}

fn print_sets(sets: &[SetRow]) {
    if sets.is_empty() {
        println!("Sin sets registrados.");
        return;
    }

    println!(
        "{:>4} {:>6} {:>8} {:>5}  {}",
        "Set".bold(),
        "Reps".bold(),
        "Kg".bold(),
        "RPE".bold(),
        "Máx".bold()
    );
    for set in sets {
        println!(
            "{:>4} {:>6} {:>8} {:>5}  {}",
            opt(set.set_num),
            opt(set.reps),
            num(set.peso_kg, 1),
            num(set.rpe, 1),
            if set.es_max { "sí" } else { "" }
        );
    }
}

impl RoutineSubcommands {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let session = ctx.enter(Route::Routines).await?;

        let progress = spinner("Loading today's routine...");
        let today = ctx.api.today_session(session.user.id).await;
        progress.finish_and_clear();
        let today = today?;

        match self {
            RoutineSubcommands::Today => {
                if today.sesion_id.is_none() || today.items.is_empty() {
                    println!("No tienes una rutina activa para hoy.");
                    println!("Pide a tu entrenador que te asigne una plantilla.");
                } else {
                    print_today(&today);
                }
                Ok(())
            }
            RoutineSubcommands::Toggle { item: id } => {
                let sesion_id = session_id(&today)?;
                let current = item(&today, id)?;
                let completado = !current.completado;

                ctx.api.toggle_exercise(sesion_id, id, completado).await?;

                let estado = if completado { "completado" } else { "pendiente" };
                success(&format!("{} marcado como {}", current.ejercicio_nombre, estado));
                Ok(())
            }
            RoutineSubcommands::Sets { item: id } => {
                let sesion_id = session_id(&today)?;
                let current = item(&today, id)?;

                let sets = ctx.api.sets(sesion_id, id).await?;
                section(&current.ejercicio_nombre);
                print_sets(&sets);
                Ok(())
            }
            RoutineSubcommands::LogSet {
                item: id,
                reps,
                peso,
                rpe,
                es_max,
                set_num,
            } => {
                let sesion_id = session_id(&today)?;
                let current = item(&today, id)?;

                let logged = ctx.api.sets(sesion_id, id).await?;
                let form = SetForm {
                    set_num: set_num.unwrap_or_else(|| NewSet::next_set_num(&logged)),
                    reps,
                    peso_kg: peso,
                    rpe,
                    es_max,
                };
                let set = match form.validate(id) {
                    Ok(set) => set,
                    Err(errors) => {
                        print_field_errors(&errors);
                        return Err(errors.into());
                    }
                };

                ctx.api.log_set(sesion_id, &set).await?;
                success(&format!(
                    "Set {} de {} registrado: {} x {} kg",
                    set.set_num, current.ejercicio_nombre, set.reps, set.peso_kg
                ));
                Ok(())
            }
        }
    }
}
