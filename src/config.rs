//! Configuration file handling.
//!
//! This module provides loading and saving of extaudit configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/extaudit/config.toml`
//! - macOS: `~/Library/Application Support/extaudit/config.toml`
//! - Windows: `%APPDATA%\extaudit\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! default_format = "table"
//! default_browsers = ["firefox", "chrome", "edge"]
//! # risk_table = "/etc/extaudit/risks.toml"
//!
//! [ignore]
//! extensions = ["uBlock0@raymondhill.net", "cjpalhdlnbpafiamejdnhcphjbkeiagm"]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::Browser;

/// Application configuration.
///
/// Can be loaded from a TOML file or created with default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Which browsers to scan when no `--browser` flag is provided.
    ///
    /// Default: all browsers
    pub default_browsers: Vec<Browser>,

    /// Optional path to a custom risk table (TOML with a `[permissions]`
    /// map). The embedded reference list is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_table: Option<PathBuf>,

    /// Ignore list configuration for suppressing known extensions.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for excluding specific extensions from the report.
///
/// Use this to suppress extensions that are centrally managed or
/// otherwise accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Extension IDs to exclude from the report.
    ///
    /// Supports glob patterns (e.g., "*@search.mozilla.org").
    pub extensions: Vec<String>,
}

impl IgnoreConfig {
    /// Check if an extension should be ignored.
    pub fn should_ignore(&self, extension_id: &str) -> bool {
        self.extensions.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, extension_id)
            } else {
                pattern == extension_id
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    // Check middle parts
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            default_browsers: vec![Browser::Firefox, Browser::Chrome, Browser::Edge],
            risk_table: None,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("extaudit")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
