//! User-supplied rules loaded from declarative definition files.
//!
//! A custom rule is a JSON document describing checks against manifest keys:
//!
//! ```json
//! {
//!   "name": "house-style",
//!   "description": "Org-specific manifest requirements",
//!   "checks": [
//!     {
//!       "key": "CFBundleIdentifier",
//!       "requirement": "matches",
//!       "pattern": "com.example.*",
//!       "severity": "high",
//!       "message": "Bundle identifier must live under com.example"
//!     }
//!   ]
//! }
//! ```
//!
//! The shape is validated after parse; a bad definition is a startup warning
//! and the rule is simply not registered. A definition reusing a built-in's
//! name supersedes that built-in via the registry's overwrite semantics.

use std::fs;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{Rule, ValidationContext};
use crate::error::CustomRuleLoadError;
use crate::model::{Finding, Severity};

#[derive(Debug, Clone, Deserialize)]
struct RuleDefinition {
    name: String,
    #[serde(default)]
    description: String,
    checks: Vec<CheckDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct CheckDefinition {
    key: String,
    requirement: Requirement,
    #[serde(default)]
    pattern: Option<String>,
    severity: Severity,
    message: String,
    #[serde(default)]
    remediation: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Requirement {
    /// The key must be present.
    Required,
    /// The key must not be present.
    Forbidden,
    /// The key's string value must match the glob pattern when present.
    Matches,
}

/// A rule instantiated from a definition file.
#[derive(Debug)]
pub struct CustomRule {
    definition: RuleDefinition,
}

impl CustomRule {
    /// Loads and shape-validates exactly one rule definition.
    ///
    /// # Errors
    ///
    /// Returns [`CustomRuleLoadError`] for unreadable files, invalid JSON,
    /// or a definition that fails shape validation.
    pub fn load(path: &Path) -> Result<Self, CustomRuleLoadError> {
        let content = fs::read_to_string(path).map_err(|source| CustomRuleLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let definition: RuleDefinition =
            serde_json::from_str(&content).map_err(|source| CustomRuleLoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        validate_shape(&definition).map_err(|message| CustomRuleLoadError::Shape {
            path: path.to_path_buf(),
            message,
        })?;

        Ok(Self { definition })
    }
}

fn validate_shape(definition: &RuleDefinition) -> Result<(), String> {
    if definition.name.trim().is_empty() {
        return Err("rule name must not be empty".to_string());
    }
    if definition.checks.is_empty() {
        return Err("rule must declare at least one check".to_string());
    }
    for check in &definition.checks {
        if check.key.trim().is_empty() {
            return Err("check key must not be empty".to_string());
        }
        if matches!(check.requirement, Requirement::Matches) && check.pattern.is_none() {
            return Err(format!(
                "check for key '{}' uses 'matches' but has no pattern",
                check.key
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl Rule for CustomRule {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for check in &self.definition.checks {
            let violated = match check.requirement {
                Requirement::Required => !ctx.has_key(&check.key),
                Requirement::Forbidden => ctx.has_key(&check.key),
                Requirement::Matches => match ctx.string_key(&check.key) {
                    Some(value) => {
                        let pattern = check.pattern.as_deref().unwrap_or_default();
                        !glob_match(pattern, value)
                    }
                    None => false,
                },
            };

            if violated {
                let mut finding =
                    Finding::new(&self.definition.name, check.severity, check.message.clone())
                        .with_details(format!("Key under check: {}", check.key));
                if let Some(remediation) = &check.remediation {
                    finding = finding.with_remediation(remediation.clone());
                }
                findings.push(finding);
            }
        }

        Ok(findings)
    }
}

/// Loads each definition path, warning and skipping on failure.
pub fn load_custom_rules(paths: &[std::path::PathBuf]) -> Vec<CustomRule> {
    let mut rules = Vec::new();
    for path in paths {
        match CustomRule::load(path) {
            Ok(rule) => rules.push(rule),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping custom rule");
            }
        }
    }
    rules
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

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
