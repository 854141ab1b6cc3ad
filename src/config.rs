use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tunables read from the JSON file at `CONFIG_PATH`. Missing fields fall
/// back to their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_ms: u64,
    pub idle_threshold_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            idle_threshold_secs: 60,
        }
    }
}

pub struct Config {
    pub session_id: String,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    pub fn new() -> Result<Self> {
        let db_path = get_database_path()?;
        let log_path = db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("application.log");

        Ok(Config {
            session_id: Uuid::new_v4().to_string(),
            db_path,
            log_path,
            settings: load_settings(),
        })
    }
}

/// Resolves the database location from `DATABASE_URL`, falling back to the
/// platform-local data directory. Creates the parent directory; the store
/// and the log file both live in it.
pub fn get_database_path() -> Result<PathBuf> {
    let db_path = match env::var("DATABASE_URL") {
        Ok(url) => PathBuf::from(expand_app_data(&url)),
        Err(_) => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("window_tracker")
            .join("window_tracker.db"),
    };

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory {:?}", parent))?;
    }
    Ok(db_path)
}

fn expand_app_data(raw: &str) -> String {
    if !raw.contains("%AppData%") {
        return raw.to_string();
    }
    match dirs::config_dir() {
        Some(dir) => raw.replace("%AppData%", &dir.to_string_lossy()),
        None => {
            error!("Failed to resolve %AppData%. Using the path as-is.");
            raw.to_string()
        }
    }
}

/// Loads tracker settings from `CONFIG_PATH`. Every failure path degrades to
/// defaults; a missing file is created with the default contents.
pub fn load_settings() -> Settings {
    let raw = match env::var("CONFIG_PATH") {
        Ok(path) => expand_app_data(&path),
        Err(_) => return Settings::default(),
    };

    let path = Path::new(&raw);
    match fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents),
        Err(err) if err.kind() == ErrorKind::NotFound => write_default_settings(path),
        Err(err) => {
            error!(
                "Unexpected error opening settings file at {:?}: {}. Using defaults.",
                path, err
            );
            Settings::default()
        }
    }
}

fn parse_settings(contents: &str) -> Settings {
    match serde_json::from_str(contents) {
        Ok(settings) => settings,
        Err(err) => {
            error!("Failed to parse settings file: {}. Using defaults.", err);
            Settings::default()
        }
    }
}

fn write_default_settings(path: &Path) -> Settings {
    let settings = Settings::default();
    match serde_json::to_string_pretty(&settings) {
        Ok(contents) => {
            if let Err(err) = fs::write(path, contents) {
                error!("Failed to create settings file at {:?}: {}", path, err);
            }
        }
        Err(err) => error!("Failed to serialize default settings: {}", err),
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_settings_file_parses() {
        let settings = parse_settings(r#"{"poll_interval_ms": 250, "idle_threshold_secs": 300}"#);
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.idle_threshold_secs, 300);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings = parse_settings(r#"{"poll_interval_ms": 250}"#);
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.idle_threshold_secs, Settings::default().idle_threshold_secs);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        assert_eq!(parse_settings("not json"), Settings::default());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = write_default_settings(&path);
        assert_eq!(settings, Settings::default());

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_settings(&written), Settings::default());
    }
}
