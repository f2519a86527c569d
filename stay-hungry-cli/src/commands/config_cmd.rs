use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::display::{section, success};
use crate::config::Config;

fn config_location(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file(),
    }
}

pub async fn show_config(path: Option<&Path>) -> Result<()> {
    let config_file = config_location(path)?;
    let config = Config::load_from(&config_file)?;
    let config_str = toml::to_string_pretty(&config)?;

    section("Current Configuration");
    println!("File: {}", config_file.display());
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn edit_config(path: Option<&Path>) -> Result<()> {
    let config_file = config_location(path)?;

    if !config_file.exists() {
        Config::default().save_to(&config_file)?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    Command::new(editor).arg(&config_file).status()?;

    // Re-parse so a broken edit is reported right away
    Config::load_from(&config_file)?;
    success("Configuration saved!");

    Ok(())
}

pub async fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = config_location(path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&config_file)?;

    success(&format!(
        "Configuration initialized at: {}",
        config_file.display()
    ));
    println!();
    println!("You can edit it with: stay-hungry config edit");

    Ok(())
}
