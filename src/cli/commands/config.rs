use crate::cli::output::Output;
use crate::cli::ConfigAction;
use crate::config::settings::KEYS;
use crate::config::{ensure_config_dir, global_config_path, repo_config_path, Settings};
use crate::errors::{ChangesetError, Result};
use crate::git::find_repository_root;
use std::env;
use std::path::{Path, PathBuf};

/// Handle configuration commands
pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value, global } => {
            set_config_value(&config_file(global)?, &key, &value)
        }
        ConfigAction::Get { key, global } => get_config_value(&config_file(global)?, &key),
        ConfigAction::List { global } => list_config_values(&config_file(global)?),
        ConfigAction::Unset { key, global } => unset_config_value(&config_file(global)?, &key),
    }
}

fn config_file(global: bool) -> Result<PathBuf> {
    if global {
        return global_config_path();
    }
    let current_dir = env::current_dir()
        .map_err(|e| ChangesetError::config(format!("Could not get current directory: {e}")))?;
    repo_config_path(&find_repository_root(&current_dir)?)
}

fn save(settings: &Settings, config_file: &Path) -> Result<()> {
    if let Some(parent) = config_file.parent() {
        ensure_config_dir(parent)?;
    }
    settings.save_to_file(config_file)
}

fn set_config_value(config_file: &Path, key: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;
    settings.set_value(key, value)?;
    save(&settings, config_file)?;

    Output::success(format!("Configuration updated: {key} = {value}"));
    if let Err(e) = settings.validate() {
        Output::warning(format!("Settings are incomplete: {e}"));
    }
    Ok(())
}

fn get_config_value(config_file: &Path, key: &str) -> Result<()> {
    let settings = Settings::load_from_file(config_file)?;
    let value = settings.get_value(key)?;
    if value.is_empty() {
        Output::info(format!("{key} is not set"));
    } else {
        println!("{value}");
    }
    Ok(())
}

fn list_config_values(config_file: &Path) -> Result<()> {
    let settings = Settings::load_from_file(config_file)?;
    Output::section(format!("Configuration ({})", config_file.display()));
    for key in KEYS {
        let value = settings.get_value(key)?;
        let shown = if value.is_empty() { "(not set)" } else { value.as_str() };
        Output::bullet(format!("{key} = {shown}"));
    }
    Ok(())
}

fn unset_config_value(config_file: &Path, key: &str) -> Result<()> {
    let mut settings = Settings::load_from_file(config_file)?;
    settings.unset_value(key)?;
    save(&settings, config_file)?;
    Output::success(format!("Configuration reset: {key}"));
    Ok(())
}
