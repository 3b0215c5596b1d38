use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "assets";

const ICON_KEYS: &[&str] = &["CFBundleIcons", "CFBundleIconFiles", "XSAppIconAssets"];
const LAUNCH_KEYS: &[&str] = &["UILaunchScreen", "UILaunchStoryboardName"];

/// Flags missing icon and launch screen configuration.
pub struct AssetsRule;

#[async_trait]
impl Rule for AssetsRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "App icon and launch screen configuration"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if !ICON_KEYS.iter().any(|k| ctx.has_key(k)) {
            findings.push(
                Finding::new(RULE_NAME, Severity::High, "No app icon configuration found")
                    .with_details(format!(
                        "Expected one of: {}",
                        ICON_KEYS.join(", ")
                    ))
                    .with_remediation("Configure an app icon asset catalog"),
            );
        }

        if !LAUNCH_KEYS.iter().any(|k| ctx.has_key(k)) {
            findings.push(
                Finding::new(
                    RULE_NAME,
                    Severity::Medium,
                    "No launch screen configuration found",
                )
                .with_details(format!("Expected one of: {}", LAUNCH_KEYS.join(", ")))
                .with_remediation("Add a UILaunchScreen dictionary or a launch storyboard"),
            );
        }

        Ok(findings)
    }
}
