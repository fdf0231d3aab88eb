// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration for actbot
//!
//! Loaded from TOML or YAML depending on the file extension. Every field has
//! a default, so a missing file or a partial file is valid.

use crate::error::{Error, Result};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-rule execution limit in milliseconds (0 disables the limit)
    pub rule_timeout_ms: u64,
    /// Rule ids never considered by the runner
    pub disabled_rules: Vec<String>,
    /// Test id used when the CLI is given none
    pub default_test: String,
    /// Report format used when the CLI is given none
    pub output: OutputFormat,
    /// Directory names the scanner skips
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rule_timeout_ms: default_rule_timeout_ms(),
            disabled_rules: Vec::new(),
            default_test: "all".to_string(),
            output: OutputFormat::Text,
            exclude: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
                "dist".to_string(),
                "build".to_string(),
            ],
        }
    }
}

fn default_rule_timeout_ms() -> u64 {
    5_000
}

impl Config {
    pub fn rule_timeout(&self) -> Option<Duration> {
        match self.rule_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|id| id == rule_id)
    }
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => Ok(toml::from_str(&content)?),
        Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(&content)?),
        other => Err(Error::Config(format!(
            "Unsupported config format {:?} for {}",
            other,
            path.display()
        ))),
    }
}
