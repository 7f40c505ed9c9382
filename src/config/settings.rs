use crate::changeset::{PathSpec, TopologyMode};
use crate::errors::{ChangesetError, Result};
use crate::utils::atomic_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub split: SplitSettings,
    pub git: GitSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    /// `sibling` or `stacked`
    pub default_mode: String,
    /// Write a run report under the git directory after every split
    pub save_reports: bool,
    /// Reset the index for every pending path before the first change-set
    pub unstage_first: bool,
    /// Path specs never offered to any change-set
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            default_mode: TopologyMode::default().to_string(),
            save_reports: true,
            unstage_first: true,
            exclude: Vec::new(),
        }
    }
}

/// Every key accepted by `set_value`/`get_value`
pub const KEYS: &[&str] = &[
    "split.default_mode",
    "split.save_reports",
    "split.unstage_first",
    "split.exclude",
    "git.author_name",
    "git.author_email",
];

fn parse_bool(value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| ChangesetError::config(format!("Invalid boolean value: {value}")))
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    key.split_once('.')
        .filter(|(section, field)| !section.is_empty() && !field.is_empty() && !field.contains('.'))
        .ok_or_else(|| ChangesetError::config(format!("Invalid config key format: {key}")))
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it is missing
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ChangesetError::config(format!("Failed to read config file: {e}")))?;

        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| ChangesetError::config(format!("Failed to parse config file: {e}")))?;

        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        atomic_file::write_json(path, self)
    }

    /// Update a value by dotted key. `split.exclude` takes a comma-separated list.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match split_key(key)? {
            ("split", "default_mode") => {
                let mode: TopologyMode = value.parse()?;
                self.split.default_mode = mode.to_string();
            }
            ("split", "save_reports") => self.split.save_reports = parse_bool(value)?,
            ("split", "unstage_first") => self.split.unstage_first = parse_bool(value)?,
            ("split", "exclude") => {
                let specs: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                for spec in &specs {
                    PathSpec::parse(spec).map_err(|e| {
                        ChangesetError::config(format!("Invalid exclude entry '{spec}': {e}"))
                    })?;
                }
                self.split.exclude = specs;
            }
            ("git", "author_name") => self.git.author_name = Some(value.to_string()),
            ("git", "author_email") => self.git.author_email = Some(value.to_string()),
            _ => return Err(ChangesetError::config(format!("Unknown config key: {key}"))),
        }
        Ok(())
    }

    /// Read a value by dotted key. Unset optional values read as an empty string.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match split_key(key)? {
            ("split", "default_mode") => self.split.default_mode.clone(),
            ("split", "save_reports") => self.split.save_reports.to_string(),
            ("split", "unstage_first") => self.split.unstage_first.to_string(),
            ("split", "exclude") => self.split.exclude.join(","),
            ("git", "author_name") => self.git.author_name.clone().unwrap_or_default(),
            ("git", "author_email") => self.git.author_email.clone().unwrap_or_default(),
            _ => return Err(ChangesetError::config(format!("Unknown config key: {key}"))),
        };
        Ok(value)
    }

    /// Reset a key to its default
    pub fn unset_value(&mut self, key: &str) -> Result<()> {
        let defaults = SplitSettings::default();
        match split_key(key)? {
            ("split", "default_mode") => self.split.default_mode = defaults.default_mode,
            ("split", "save_reports") => self.split.save_reports = defaults.save_reports,
            ("split", "unstage_first") => self.split.unstage_first = defaults.unstage_first,
            ("split", "exclude") => self.split.exclude.clear(),
            ("git", "author_name") => self.git.author_name = None,
            ("git", "author_email") => self.git.author_email = None,
            _ => return Err(ChangesetError::config(format!("Unknown config key: {key}"))),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.mode()?;
        self.exclude_specs()?;
        if self.git.author_name.is_some() != self.git.author_email.is_some() {
            return Err(ChangesetError::config(
                "git.author_name and git.author_email must be set together",
            ));
        }
        Ok(())
    }

    pub fn mode(&self) -> Result<TopologyMode> {
        self.split.default_mode.parse()
    }

    pub fn exclude_specs(&self) -> Result<Vec<PathSpec>> {
        self.split
            .exclude
            .iter()
            .map(|spec| {
                PathSpec::parse(spec).map_err(|e| {
                    ChangesetError::config(format!("Invalid exclude entry '{spec}': {e}"))
                })
            })
            .collect()
    }

    /// Signature override, only when both halves are configured
    pub fn author(&self) -> Option<(String, String)> {
        match (&self.git.author_name, &self.git.author_email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            _ => None,
        }
    }
}
