use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "localization";

/// Reports declared localization coverage.
pub struct LocalizationRule;

#[async_trait]
impl Rule for LocalizationRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Declared supported languages"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if let Some(localizations) = ctx.array_key("CFBundleLocalizations") {
            let languages: Vec<&str> = localizations
                .iter()
                .filter_map(|v| v.as_string())
                .collect();

            if languages.len() > 1 {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Info,
                        format!("App declares {} supported languages", languages.len()),
                    )
                    .with_details(languages.join(", ")),
                );
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

    async fn run(languages: &[&str]) -> Vec<Finding> {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "CFBundleLocalizations".into(),
            plist::Value::Array(
                languages
                    .iter()
                    .map(|l| plist::Value::String((*l).into()))
                    .collect(),
            ),
        );
        let package = package();
        let artifacts = artifacts(dict);
        let ctx = ValidationContext::new(&package, &artifacts, None);
        LocalizationRule.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_multiple_languages_reported() {
        let findings = run(&["en", "de", "ja"]).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert!(findings[0].message.contains("3 supported languages"));
        assert_eq!(findings[0].details.as_deref(), Some("en, de, ja"));
    }

    #[tokio::test]
    async fn test_single_language_is_silent() {
        assert!(run(&["en"]).await.is_empty());
    }

    #[tokio::test]
    async fn test_absent_key_is_silent() {
        let package = package();
        let artifacts = artifacts(plist::Dictionary::new());
        let ctx = ValidationContext::new(&package, &artifacts, None);
        assert!(LocalizationRule.evaluate(&ctx).await.unwrap().is_empty());
    }
}
