use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "content-policy";

/// Flags a missing export compliance encryption declaration.
pub struct ContentPolicyRule;

#[async_trait]
impl Rule for ContentPolicyRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Export compliance encryption declaration"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if !ctx.has_key("ITSAppUsesNonExemptEncryption") {
            findings.push(
                Finding::new(
                    RULE_NAME,
                    Severity::Medium,
                    "ITSAppUsesNonExemptEncryption is not declared",
                )
                .with_details(
                    "Without the key, every upload prompts for an export compliance answer \
                     during review",
                )
                .with_remediation(
                    "Declare ITSAppUsesNonExemptEncryption (false for apps using only exempt \
                     encryption)",
                )
                .automatable(),
            );
        }

        Ok(findings)
    }
}
