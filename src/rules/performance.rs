use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "performance";

/// Flags the deprecated app-wide status bar appearance opt-out.
pub struct PerformanceRule;

#[async_trait]
impl Rule for PerformanceRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Deprecated status bar configuration"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if ctx.bool_key("UIViewControllerBasedStatusBarAppearance") == Some(false) {
            findings.push(
                Finding::new(
                    RULE_NAME,
                    Severity::Low,
                    "UIViewControllerBasedStatusBarAppearance is disabled",
                )
                .with_details(
                    "App-wide status bar control is deprecated; per-view-controller \
                     appearance is expected on current OS versions",
                )
                .with_remediation("Remove the key or set it to true and adopt per-controller APIs")
                .automatable(),
            );
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{artifacts, package};
    use crate::rules::ValidationContext;

    async fn run(value: Option<bool>) -> Vec<Finding> {
        let mut dict = plist::Dictionary::new();
        if let Some(v) = value {
            dict.insert(
                "UIViewControllerBasedStatusBarAppearance".into(),
                plist::Value::Boolean(v),
            );
        }
        let package = package();
        let artifacts = artifacts(dict);
        let ctx = ValidationContext::new(&package, &artifacts, None);
        PerformanceRule.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_disabled_flag_is_low() {
        let findings = run(Some(false)).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_enabled_or_absent_is_clean() {
        assert!(run(Some(true)).await.is_empty());
        assert!(run(None).await.is_empty());
    }
}
