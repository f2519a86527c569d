use chrono::NaiveDate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use std::time::Duration;

use crate::validation::FieldErrors;

/// Spinner shown while a request is outstanding
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn print_field_errors(errors: &FieldErrors) {
    println!("{}", "✗ Please fix the following:".red());
    for (field, message) in errors.iter() {
        println!("  {} {}", format!("{}:", field).bold(), message);
    }
}

pub fn section(title: &str) {
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count().max(32)));
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn session_expired() {
    eprintln!();
    eprintln!("{} Your session has expired.", "!".yellow().bold());
    eprintln!("Log in again with 'stay-hungry login'.");
}

/// `-` for missing values, otherwise `decimals` places
pub fn num(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

pub fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Cut `text` to `width` characters
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Reformat a server date (`YYYY-MM-DD`, optionally followed by a time) with
/// the configured `ui.date_format`. Anything unparseable is shown as is.
pub fn date(raw: &str, format: &str) -> String {
    let Some(day) = raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    else {
        return raw.to_string();
    };
    day_with(day, format).unwrap_or_else(|| raw.to_string())
}

pub fn day_with(day: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", day.format(format)).ok()?;
    Some(out)
}
