use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use super::display::{fit, num, opt, section, spinner, success};
use crate::api::TodaySummary;
use crate::context::AppContext;
use crate::models::ClientSummary;
use crate::router::Route;
use crate::validation::{search_term, MIN_SEARCH_LEN};

#[derive(Subcommand)]
pub enum ClientsSubcommands {
    /// List the clients assigned to you
    List,

    /// Search clients without a trainer
    Search {
        /// Name or email fragment (at least 2 characters)
        term: String,
    },

    /// Assign a client to yourself
    Assign {
        /// Client ID
        cliente_id: i64,
    },

    /// Show a client's session for today
    Summary {
        /// Client ID
        cliente_id: i64,
    },
}

fn print_clients(clients: &[ClientSummary]) {
    println!(
        "{:>5}  {:<24} {:<28} {:>4} {:>7} {:>6}",
        "ID".bold(),
        "Nombre".bold(),
        "Email".bold(),
        "Edad".bold(),
        "Peso".bold(),
        "Est.".bold()
    );
    for client in clients {
        println!(
            "{:>5}  {:<24} {:<28} {:>4} {:>7} {:>6}",
            client.id,
            fit(&client.nombre, 24),
            fit(&client.email, 28),
            opt(client.edad),
            num(client.peso, 1),
            num(client.estatura, 2)
        );
    }
}

impl ClientsSubcommands {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let session = ctx.enter(Route::TrainerClients).await?;
        let entrenador_id = session.user.id;

        match self {
            ClientsSubcommands::List => {
                let progress = spinner("Loading clients...");
                let clients = ctx.api.my_clients(entrenador_id).await;
                progress.finish_and_clear();
                let clients = clients?;

                section(&format!("Mis clientes ({})", clients.len()));
                if clients.is_empty() {
                    println!("Aún no tienes clientes asignados.");
                    println!("Use 'stay-hungry clients search <term>' to find one.");
                } else {
                    print_clients(&clients);
                }
                Ok(())
            }
            ClientsSubcommands::Search { term } => {
                let Some(term) = search_term(&term) else {
                    println!("Type at least {} characters to search.", MIN_SEARCH_LEN);
                    return Ok(());
                };

                let progress = spinner("Searching...");
                let clients = ctx.api.search_unassigned_clients(term).await;
                progress.finish_and_clear();
                let clients = clients?;

                if clients.is_empty() {
                    println!("Sin resultados para \"{}\".", term);
                } else {
                    print_clients(&clients);
                }
                Ok(())
            }
            ClientsSubcommands::Assign { cliente_id } => {
                ctx.api
                    .assign_client(entrenador_id, cliente_id)
                    .await
                    .with_context(|| format!("Failed to assign client {}", cliente_id))?;
                success(&format!("Cliente {} asignado", cliente_id));
                Ok(())
            }
            ClientsSubcommands::Summary { cliente_id } => {
                let progress = spinner("Loading today's session...");
                let summary = ctx.api.today_summary(cliente_id).await;
                progress.finish_and_clear();

                section(&format!("Sesión de hoy, cliente {}", cliente_id));
                match summary? {
                    TodaySummary::NoSession => println!("El cliente no tiene sesión hoy."),
                    TodaySummary::Message(message) => println!("{}", message),
                    TodaySummary::Rows(rows) if rows.is_empty() => {
                        println!("Sin sets registrados todavía.")
                    }
                    TodaySummary::Rows(rows) => {
                        println!(
                            "{:<26} {:>9} {:>9} {:>9}",
                            "Ejercicio".bold(),
                            "Máx kg".bold(),
                            "Máx reps".bold(),
                            "1RM est.".bold()
                        );
                        for row in rows {
                            println!(
                                "{:<26} {:>9} {:>9} {:>9}",
                                fit(&row.ejercicio, 26),
                                num(row.max_peso, 1),
                                opt(row.max_reps),
                                num(row.est_1rm, 1)
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
