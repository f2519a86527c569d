use anyhow::Result;
use chrono::Local;
use clap::Args;

use super::display::{date, fit, num, section, spinner, success};
use crate::context::AppContext;
use crate::export::{self, reports};
use crate::models::{ProgressData, ProgressKpis};
use crate::router::Route;

#[derive(Args)]
pub struct ProgressCommand {
    /// Days of history to load
    #[arg(short, long, default_value = "180")]
    days: u32,

    /// Also write the progress workbook
    #[arg(short, long)]
    export: bool,

    /// Also write the weight history as CSV
    #[arg(long)]
    csv: bool,
}

fn print_kpis(kpis: &ProgressKpis, date_format: &str) {
    section("Resumen");
    println!(
        "  Último peso:   {} kg ({})",
        num(kpis.last_weight, 1),
        kpis.last_date
            .as_deref()
            .map(|d| date(d, date_format))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("  Peso anterior: {} kg", num(kpis.previous_weight, 1));
    match (kpis.delta_kg, kpis.delta_pct) {
        (Some(kg), Some(pct)) => println!("  Cambio:        {:+.2} kg ({:+.2}%)", kg, pct),
        (Some(kg), None) => println!("  Cambio:        {:+.2} kg", kg),
        _ => println!("  Cambio:        -"),
    }
    match (kpis.bmi, kpis.bmi_category) {
        (Some(bmi), Some(category)) => println!("  IMC:           {:.1} ({})", bmi, category),
        _ => println!("  IMC:           -"),
    }
    println!("  Kcal totales:  {:.0}", kpis.total_kcal);
    println!("  Kcal/sesión:   {:.0}", kpis.avg_kcal);
}

fn print_histories(data: &ProgressData, date_format: &str) {
    if !data.weight.is_empty() {
        println!();
        section("Peso");
        for point in data.weight.iter().rev().take(10) {
            println!(
                "  {:<12} {:>7} kg",
                date(&point.date, date_format),
                num(point.weight, 1)
            );
        }
    }

    if !data.strength.is_empty() {
        println!();
        section("1RM estimado");
        for pr in &data.strength {
            println!(
                "  {:<26} {:>7} kg  {}",
                fit(&pr.ejercicio, 26),
                num(pr.est_1rm, 1),
                pr.best_set().unwrap_or_default()
            );
        }
    }

    if !data.calories.is_empty() {
        println!();
        section("Calorías por sesión");
        for row in data.calories.iter().rev().take(10) {
            println!(
                "  {:<12} {:>5} min  {:>6} kcal",
                date(&row.date, date_format),
                num(row.minutos, 0),
                num(row.kcal, 0)
            );
        }
    }
}

impl ProgressCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let session = ctx.enter(Route::Progress).await?;
        let user_id = session.user.id;

        let progress = spinner("Loading progress...");
        let data = ctx.api.progress(user_id, self.days).await;
        progress.finish_and_clear();

        let kpis = ProgressKpis::compute(&data);

        println!("Progreso de los últimos {} días", data.days);
        println!();
        let format = ctx.config.ui.date_format.clone();
        print_kpis(&kpis, &format);
        print_histories(&data, &format);

        if self.export {
            let bytes = export::workbook_bytes(&reports::progress_sheets(&data, &kpis))?;
            let filename = reports::progress_filename(user_id, Local::now().date_naive());
            let path = export::write_file(&ctx.export_dir(), &filename, &bytes)?;
            println!();
            success(&format!("Exported progress to {}", path.display()));
        }

        if self.csv {
            let csv = reports::weight_csv(&data.weight);
            let path = export::write_file(
                &ctx.export_dir(),
                &reports::weight_csv_filename(user_id),
                csv.as_bytes(),
            )?;
            success(&format!("Exported weight history to {}", path.display()));
        }

        Ok(())
    }
}
