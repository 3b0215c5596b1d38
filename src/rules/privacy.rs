use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "privacy";

const MIN_PURPOSE_LEN: usize = 30;

/// Permission keys whose presence makes a privacy declaration mandatory.
pub(crate) const USAGE_DESCRIPTION_KEYS: &[&str] = &[
    "NSCameraUsageDescription",
    "NSMicrophoneUsageDescription",
    "NSLocationWhenInUseUsageDescription",
    "NSLocationAlwaysAndWhenInUseUsageDescription",
    "NSLocationAlwaysUsageDescription",
    "NSPhotoLibraryUsageDescription",
    "NSPhotoLibraryAddUsageDescription",
    "NSContactsUsageDescription",
    "NSCalendarsUsageDescription",
    "NSRemindersUsageDescription",
    "NSMotionUsageDescription",
    "NSHealthShareUsageDescription",
    "NSHealthUpdateUsageDescription",
    "NSBluetoothAlwaysUsageDescription",
    "NSSpeechRecognitionUsageDescription",
    "NSFaceIDUsageDescription",
    "NSLocalNetworkUsageDescription",
    "NSUserTrackingUsageDescription",
    "NSAppleMusicUsageDescription",
    "NSSiriUsageDescription",
];

/// Phrases reviewers reject as non-explanations.
const GENERIC_PHRASES: &[&str] = &[
    "this app needs access",
    "this app requires access",
    "we need access",
    "used by the app",
    "for app functionality",
    "access required",
];

const PLACEHOLDER_TOKENS: &[&str] = &["todo", "fixme", "tbd", "lorem ipsum", "xxx", "$("];

/// Checks the privacy declaration and permission purpose strings.
pub struct PrivacyRule;

#[async_trait]
impl Rule for PrivacyRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Privacy manifest presence and permission purpose string quality"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let present_keys: Vec<&str> = USAGE_DESCRIPTION_KEYS
            .iter()
            .copied()
            .filter(|key| ctx.has_key(key))
            .collect();

        if ctx.artifacts.privacy_manifest.is_none() {
            if present_keys.is_empty() {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Info,
                        "Privacy manifest not present",
                    )
                    .with_details(
                        "No privacy-sensitive permission keys are declared, so \
                         PrivacyInfo.xcprivacy is not strictly required",
                    ),
                );
            } else {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::High,
                        "Privacy manifest missing",
                    )
                    .with_details(format!(
                        "The manifest declares privacy-sensitive keys ({}) but the package \
                         has no PrivacyInfo.xcprivacy",
                        present_keys.join(", ")
                    ))
                    .with_remediation("Add a PrivacyInfo.xcprivacy declaring data collection and API usage reasons"),
                );
            }
        }

        for key in &present_keys {
            if let Some(purpose) = ctx.string_key(key) {
                findings.extend(check_purpose_string(key, purpose));
            }
        }

        if ctx.has_key("NSLocationAlwaysUsageDescription")
            && !ctx.has_key("NSLocationWhenInUseUsageDescription")
        {
            findings.push(
                Finding::new(
                    RULE_NAME,
                    Severity::High,
                    "Deprecated NSLocationAlwaysUsageDescription without \
                     NSLocationWhenInUseUsageDescription",
                )
                .with_remediation(
                    "Pair always-on location access with a when-in-use description, or drop \
                     the deprecated key",
                ),
            );
        }

        Ok(findings)
    }
}

/// At most one finding per purpose string; placeholders outrank weak prose.
fn check_purpose_string(key: &str, purpose: &str) -> Option<Finding> {
    let lowered = purpose.to_lowercase();

    if PLACEHOLDER_TOKENS.iter().any(|t| lowered.contains(t)) {
        return Some(
            Finding::new(
                RULE_NAME,
                Severity::High,
                format!("Purpose string for {} contains a leftover placeholder", key),
            )
            .with_details(format!("Current value: '{}'", purpose)),
        );
    }

    if purpose.chars().count() < MIN_PURPOSE_LEN {
        return Some(
            Finding::new(
                RULE_NAME,
                Severity::Medium,
                format!(
                    "Purpose string for {} is too short (under {} characters)",
                    key, MIN_PURPOSE_LEN
                ),
            )
            .with_remediation("Explain specifically why the app needs this access"),
        );
    }

    if GENERIC_PHRASES.iter().any(|p| lowered.starts_with(p)) {
        return Some(
            Finding::new(
                RULE_NAME,
                Severity::Medium,
                format!("Purpose string for {} is a generic phrase", key),
            )
            .with_details(format!("Current value: '{}'", purpose))
            .with_remediation("Name the feature that uses the permission and what data it touches"),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{artifacts, package};
    use crate::rules::ValidationContext;

    async fn run(dict: plist::Dictionary, with_privacy_manifest: bool) -> Vec<Finding> {
        let package = package();
        let mut artifacts = artifacts(dict);
        if with_privacy_manifest {
            artifacts.privacy_manifest =
                Some(plist::Value::Dictionary(plist::Dictionary::new()));
        }
        let ctx = ValidationContext::new(&package, &artifacts, None);
        PrivacyRule.evaluate(&ctx).await.unwrap()
    }

    const GOOD_PURPOSE: &str =
        "Scans product barcodes with the camera to add items to your shopping list.";

    #[tokio::test]
    async fn test_missing_manifest_with_sensitive_keys_is_high() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSCameraUsageDescription".into(),
            plist::Value::String(GOOD_PURPOSE.into()),
        );

        let findings = run(dict, false).await;
        let high: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::High)
            .collect();
        assert_eq!(high.len(), 1);
        assert!(high[0].message.contains("Privacy manifest"));
    }

    #[tokio::test]
    async fn test_missing_manifest_without_sensitive_keys_is_info() {
        let findings = run(plist::Dictionary::new(), false).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_present_manifest_with_good_purpose_is_clean() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSCameraUsageDescription".into(),
            plist::Value::String(GOOD_PURPOSE.into()),
        );
        assert!(run(dict, true).await.is_empty());
    }

    #[tokio::test]
    async fn test_short_purpose_string() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSMicrophoneUsageDescription".into(),
            plist::Value::String("Records audio.".into()),
        );

        let findings = run(dict, true).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert!(findings[0].message.contains("too short"));
    }

    #[tokio::test]
    async fn test_placeholder_purpose_string() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSContactsUsageDescription".into(),
            plist::Value::String("TODO: fill in before release, explaining contact access".into()),
        );

        let findings = run(dict, true).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].message.contains("placeholder"));
    }

    #[tokio::test]
    async fn test_generic_purpose_string() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSPhotoLibraryUsageDescription".into(),
            plist::Value::String("This app needs access to your photo library always.".into()),
        );

        let findings = run(dict, true).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("generic"));
    }

    #[tokio::test]
    async fn test_deprecated_location_always_pairing() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSLocationAlwaysUsageDescription".into(),
            plist::Value::String(GOOD_PURPOSE.into()),
        );

        let findings = run(dict, true).await;
        assert!(findings.iter().any(|f| f.severity == Severity::High
            && f.message.contains("NSLocationAlwaysUsageDescription")));
    }

    #[tokio::test]
    async fn test_location_pairing_satisfied() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSLocationAlwaysUsageDescription".into(),
            plist::Value::String(GOOD_PURPOSE.into()),
        );
        dict.insert(
            "NSLocationWhenInUseUsageDescription".into(),
            plist::Value::String(GOOD_PURPOSE.into()),
        );

        let findings = run(dict, true).await;
        assert!(!findings
            .iter()
            .any(|f| f.message.contains("Deprecated NSLocationAlwaysUsageDescription")));
    }
}
