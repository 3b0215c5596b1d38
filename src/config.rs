//! Configuration file handling.
//!
//! Configuration is read from a TOML file: the path given via `--config`, or
//! `storelint.toml` in the working directory when present, or built-in
//! defaults. Command-line flags always win over file values.
//!
//! # Example Configuration
//!
//! ```toml
//! ignore = ["localization"]
//! custom_rules = ["rules/house-style.json"]
//! fail_on = "high"
//!
//! [rules]
//! code-signing = false
//!
//! [output]
//! format = "text"
//! verbose = false
//! color = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Severity;

/// File name probed in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "storelint.toml";

/// Application configuration.
///
/// All fields have defaults, so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-rule enable switches. A rule mapped to `false` is not executed.
    pub rules: BTreeMap<String, bool>,

    /// Rule names to drop from the run entirely.
    pub ignore: Vec<String>,

    /// Paths to custom rule definition files.
    pub custom_rules: Vec<PathBuf>,

    /// Minimum severity that turns findings into a failing exit code.
    ///
    /// Default: none (findings are advisory; the exit code stays 0)
    pub fail_on: Option<Severity>,

    /// Output presentation settings.
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "text", "json", "junit"
    pub format: String,

    /// Whether to emit debug-level tracing by default.
    pub verbose: bool,

    /// Whether text output uses ANSI colors.
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            verbose: false,
            color: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: BTreeMap::new(),
            ignore: Vec::new(),
            custom_rules: Vec::new(),
            fail_on: None,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, preferring an explicit path.
    ///
    /// An explicit `--config` path must exist and parse. Without one, a
    /// missing `storelint.toml` silently yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Rule names suppressed by this configuration, combining the `ignore`
    /// list with rules switched off in the `[rules]` table.
    pub fn suppressed_rules(&self) -> Vec<String> {
        let mut suppressed = self.ignore.clone();
        for (name, enabled) in &self.rules {
            if !enabled && !suppressed.contains(name) {
                suppressed.push(name.clone());
            }
        }
        suppressed
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}
