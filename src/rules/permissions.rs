use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "permissions";

/// Background modes reviewers scrutinize most; abuse is a common rejection.
const SENSITIVE_MODES: &[&str] = &["location", "voip"];

const KNOWN_MODES: &[&str] = &[
    "audio",
    "location",
    "voip",
    "fetch",
    "remote-notification",
    "processing",
    "bluetooth-central",
    "bluetooth-peripheral",
    "external-accessory",
    "nearby-interaction",
];

/// Flags sensitive background execution modes declared in the manifest.
pub struct PermissionsRule;

#[async_trait]
impl Rule for PermissionsRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Sensitive UIBackgroundModes declarations"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let modes = match ctx.array_key("UIBackgroundModes") {
            Some(modes) => modes,
            None => return Ok(findings),
        };

        for value in modes {
            let mode = match value.as_string() {
                Some(mode) => mode,
                None => continue,
            };

            if SENSITIVE_MODES.contains(&mode) {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Medium,
                        format!("Sensitive background mode declared: {}", mode),
                    )
                    .with_details(
                        "Continuous background execution draws extra review scrutiny; be ready \
                         to demonstrate the feature that needs it",
                    ),
                );
            } else if KNOWN_MODES.contains(&mode) {
                findings.push(Finding::new(
                    RULE_NAME,
                    Severity::Info,
                    format!("Background mode declared: {}", mode),
                ));
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{artifacts, package};
    use crate::rules::ValidationContext;

    async fn run(modes: &[&str]) -> Vec<Finding> {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "UIBackgroundModes".into(),
            plist::Value::Array(
                modes
                    .iter()
                    .map(|m| plist::Value::String((*m).into()))
                    .collect(),
            ),
        );
        let package = package();
        let artifacts = artifacts(dict);
        let ctx = ValidationContext::new(&package, &artifacts, None);
        PermissionsRule.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_no_background_modes() {
        let package = package();
        let artifacts = artifacts(plist::Dictionary::new());
        let ctx = ValidationContext::new(&package, &artifacts, None);
        assert!(PermissionsRule.evaluate(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sensitive_modes_are_medium() {
        let findings = run(&["location", "voip"]).await;
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Medium));
    }

    #[tokio::test]
    async fn test_ordinary_modes_are_info() {
        let findings = run(&["audio", "fetch"]).await;
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
    }

    #[tokio::test]
    async fn test_unknown_mode_not_flagged() {
        assert!(run(&["made-up-mode"]).await.is_empty());
    }
}
