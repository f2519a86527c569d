use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;

use super::display::{date, day_with, fit, num, section, spinner, success};
use crate::api::DateRange;
use crate::context::AppContext;
use crate::export::{self, reports};
use crate::models::{AnalyticsData, AnalyticsKpis};
use crate::router::Route;

const DEFAULT_DAYS: u32 = 180;

#[derive(Args)]
pub struct AnalyticsCommand {
    /// Start date (YYYY-MM-DD), defaults to 180 days ago
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Also write the report workbook
    #[arg(short, long)]
    export: bool,
}

/// Date range from the flags, falling back to the last 180 days
pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<DateRange> {
    let default = DateRange::last_days(DEFAULT_DAYS);
    let range = DateRange {
        from: from.unwrap_or(default.from),
        to: to.unwrap_or(default.to),
    };

    if range.from > range.to {
        bail!("--from ({}) is after --to ({})", range.from, range.to);
    }
    Ok(range)
}

fn print_kpis(kpis: &AnalyticsKpis) {
    section("Indicadores");
    println!("  Altas:            {}", kpis.altas);
    println!("  Bajas:            {}", kpis.bajas);
    println!("  Carga total:      {:.0} kg", kpis.carga_total);
    match kpis.adherencia_pct {
        Some(pct) => println!("  Adherencia:       {:.1}%", pct),
        None => println!("  Adherencia:       -"),
    }
    println!("  PRs:              {}", kpis.prs);
    println!("  Vistas de página: {}", kpis.page_views);
    println!("  Minutos activos:  {:.0}", kpis.minutes_active);
}

fn print_details(data: &AnalyticsData, date_format: &str) {
    if !data.churn.is_empty() {
        println!();
        section("Altas y bajas");
        for row in &data.churn {
            println!(
                "  {:<10} +{:<5} -{:<5} neto {}",
                row.periodo, row.altas, row.bajas, row.net()
            );
        }
    }

    if !data.volume.is_empty() {
        println!();
        section("Carga semanal");
        for row in &data.volume {
            println!("  {:<10} {:>10.0} kg", row.iso_week, row.carga_total);
        }
    }

    if !data.prs.is_empty() {
        println!();
        section("PRs recientes");
        for pr in data.prs.iter().take(10) {
            println!(
                "  {:<10} {:<20} {:<22} 1RM {}",
                date(&pr.date, date_format),
                fit(&pr.usuario, 20),
                fit(&pr.ejercicio, 22),
                num(pr.est_1rm, 1)
            );
        }
    }

    let trainers = &data.trainer_clients;
    if !trainers.rows.is_empty() || trainers.sin_asignar > 0.0 {
        println!();
        section("Clientes por entrenador");
        for row in &trainers.rows {
            println!("  {:<24} {}", fit(&row.entrenador, 24), row.clientes);
        }
        println!("  {:<24} {}", "Sin asignar".dimmed(), trainers.sin_asignar);
    }
}

impl AnalyticsCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        ctx.enter(Route::AdminAnalytics).await?;
        let range = date_range(self.from, self.to)?;

        let progress = spinner("Loading reports...");
        let data = ctx.api.analytics(&range).await;
        progress.finish_and_clear();

        let format = &ctx.config.ui.date_format;
        println!(
            "Reportes {} a {}",
            day_with(range.from, format).unwrap_or_else(|| range.from.to_string()),
            day_with(range.to, format).unwrap_or_else(|| range.to.to_string())
        );
        println!();
        print_kpis(&AnalyticsKpis::compute(&data));
        print_details(&data, format);

        if self.export {
            let bytes = export::workbook_bytes(&reports::admin_sheets(&data))?;
            let path = export::write_file(
                &ctx.export_dir(),
                &reports::admin_filename(&range),
                &bytes,
            )?;
            println!();
            success(&format!("Exported report to {}", path.display()));
        }

        Ok(())
    }
}
