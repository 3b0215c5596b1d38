use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "metadata";

const MAX_NAME_LEN: usize = 30;
const MIN_DESCRIPTION_LEN: usize = 100;
const MAX_KEYWORDS_LEN: usize = 100;

/// Checks listing metadata against marketplace limits.
pub struct MetadataRule;

#[async_trait]
impl Rule for MetadataRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Listing name, description, and keyword length limits"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let metadata = match ctx.metadata {
            Some(metadata) => metadata,
            None => {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Info,
                        "No metadata document supplied; listing checks skipped",
                    )
                    .with_remediation("Pass --metadata <file.json> for listing coverage"),
                );
                return Ok(findings);
            }
        };

        if let Some(name) = &metadata.app_name {
            let len = name.chars().count();
            if len > MAX_NAME_LEN {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::High,
                        format!("App name exceeds {} character limit", MAX_NAME_LEN),
                    )
                    .with_details(format!("'{}' is {} characters", name, len)),
                );
            }
        }

        if let Some(description) = &metadata.description {
            let len = description.chars().count();
            if len < MIN_DESCRIPTION_LEN {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Low,
                        format!(
                            "Description is under {} characters ({} given)",
                            MIN_DESCRIPTION_LEN, len
                        ),
                    )
                    .with_remediation("Expand the description; short listings convert poorly and \
                        draw reviewer questions"),
                );
            }
        }

        if !metadata.keywords.is_empty() {
            let combined = metadata.keywords.join(",");
            let len = combined.chars().count();
            if len > MAX_KEYWORDS_LEN {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Medium,
                        format!("Combined keywords exceed {} character limit", MAX_KEYWORDS_LEN),
                    )
                    .with_details(format!("{} characters when comma-joined", len)),
                );
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AppMetadata;
    use crate::rules::test_support::{artifacts, package};
    use crate::rules::ValidationContext;

    async fn run(metadata: Option<&AppMetadata>) -> Vec<Finding> {
        let package = package();
        let artifacts = artifacts(plist::Dictionary::new());
        let ctx = ValidationContext::new(&package, &artifacts, metadata);
        MetadataRule.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_absent_metadata_is_info() {
        let findings = run(None).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_long_app_name_is_high() {
        let metadata = AppMetadata {
            app_name: Some("A".repeat(40)),
            ..Default::default()
        };
        let findings = run(Some(&metadata)).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].message.contains("exceeds 30 character limit"));
    }

    #[tokio::test]
    async fn test_short_description_is_low() {
        let metadata = AppMetadata {
            description: Some("Too short.".into()),
            ..Default::default()
        };
        let findings = run(Some(&metadata)).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[tokio::test]
    async fn test_keyword_limit() {
        let metadata = AppMetadata {
            keywords: (0..20).map(|i| format!("keyword{:02}", i)).collect(),
            ..Default::default()
        };
        let findings = run(Some(&metadata)).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[tokio::test]
    async fn test_valid_metadata_is_clean() {
        let metadata = AppMetadata {
            app_name: Some("Test App".into()),
            description: Some("D".repeat(150)),
            keywords: vec!["test".into(), "sample".into()],
            ..Default::default()
        };
        assert!(run(Some(&metadata)).await.is_empty());
    }
}
