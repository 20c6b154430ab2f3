//! Configuration management commands.
//!
//! Stores CLI configuration in `~/.apqp/config.toml` and the backend session
//! cookies in `~/.apqp/session.toml`.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api-url)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show all configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Persistent CLI configuration stored on disk.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Cookies of the last login, tied to the backend they came from.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub base_url: String,
    #[serde(default)]
    pub cookies: Vec<String>,
}

/// Return the CLI state directory (`~/.apqp`).
fn state_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".apqp"))
}

fn config_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("config.toml"))
}

fn session_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("session.toml"))
}

fn read_toml<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(value).context("Failed to serialize")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn remove_file(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn load_config() -> Result<CliConfig> {
    read_toml(&config_path()?)
}

/// Load the `api-url` value from the config file, if set.
pub fn load_api_url() -> Option<String> {
    load_config()
        .ok()
        .and_then(|cfg| cfg.values.get("api-url").cloned())
}

// ── Session persistence ─────────────────────────────────────────────────────

pub fn save_session(session: &SessionFile) -> Result<()> {
    write_toml(&session_path()?, session)
}

/// Cookies saved for `base_url`; empty when none were saved or they belong to
/// another backend.
pub fn load_session(base_url: &str) -> Vec<String> {
    session_path()
        .and_then(|path| read_toml::<SessionFile>(&path))
        .map(|session| session_cookies(session, base_url))
        .unwrap_or_default()
}

pub fn clear_session() -> Result<()> {
    remove_file(&session_path()?)
}

fn session_cookies(session: SessionFile, base_url: &str) -> Vec<String> {
    if session.base_url == base_url {
        session.cookies
    } else {
        Vec::new()
    }
}

pub async fn execute(cmd: ConfigCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let path = config_path()?;
            let mut cfg: CliConfig = read_toml(&path)?;
            cfg.values.insert(key.clone(), value.clone());
            write_toml(&path, &cfg)?;

            match format {
                OutputFormat::Table => {
                    output::print_success(&format!("{} = {}", key, value));
                }
                _ => {
                    output::print_item(
                        &serde_json::json!({ "key": key, "value": value }),
                        format,
                    )?;
                }
            }
        }

        ConfigCommands::Get { key } => {
            let cfg = load_config()?;
            match cfg.values.get(&key) {
                Some(value) => match format {
                    OutputFormat::Table => println!("{}", value),
                    _ => {
                        output::print_item(
                            &serde_json::json!({ "key": key, "value": value }),
                            format,
                        )?;
                    }
                },
                None => {
                    output::print_error(&format!("Key '{}' not found", key));
                }
            }
        }

        ConfigCommands::Show => {
            let cfg = load_config()?;

            if cfg.values.is_empty() {
                output::print_info("No configuration values set.");
                return Ok(());
            }

            match format {
                OutputFormat::Table => {
                    output::print_header("Configuration");
                    for (k, v) in &cfg.values {
                        output::print_detail(k, v);
                    }
                }
                _ => output::print_item(&cfg.values, format)?,
            }
        }

        ConfigCommands::Reset { force } => {
            if !force {
                output::print_info(
                    "This will reset all CLI configuration. Use --force to confirm.",
                );
                return Ok(());
            }

            remove_file(&config_path()?)?;
            output::print_success("Configuration reset to defaults");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_roundtrip_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");

        let missing: SessionFile = read_toml(&path).unwrap();
        assert_eq!(missing, SessionFile::default());

        let session = SessionFile {
            base_url: "http://localhost:8000".to_string(),
            cookies: vec!["csrftoken=abc".to_string(), "sessionid=xyz".to_string()],
        };
        write_toml(&path, &session).unwrap();
        assert_eq!(read_toml::<SessionFile>(&path).unwrap(), session);

        remove_file(&path).unwrap();
        assert!(!path.exists());
        remove_file(&path).unwrap();
    }

    #[test]
    fn test_session_cookies_only_for_same_backend() {
        let session = || SessionFile {
            base_url: "http://localhost:8000".to_string(),
            cookies: vec!["sessionid=xyz".to_string()],
        };
        assert_eq!(session_cookies(session(), "http://localhost:8000").len(), 1);
        assert!(session_cookies(session(), "https://qms.example.com").is_empty());
    }
}
