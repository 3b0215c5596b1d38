use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "bundle-keys";

/// Keys every submittable manifest must carry.
const REQUIRED_KEYS: &[&str] = &[
    "CFBundleIdentifier",
    "CFBundleName",
    "CFBundleDisplayName",
    "CFBundleVersion",
    "CFBundleShortVersionString",
    "LSRequiresIPhoneOS",
];

const MAX_IDENTIFIER_LEN: usize = 255;
const MAX_DISPLAY_NAME_LEN: usize = 30;

const ALLOWED_DEVICE_CAPABILITIES: &[&str] = &[
    "armv7",
    "arm64",
    "metal",
    "gps",
    "camera-flash",
    "front-facing-camera",
    "still-camera",
    "video-camera",
    "auto-focus-camera",
    "microphone",
    "location-services",
    "gyroscope",
    "accelerometer",
    "magnetometer",
    "nfc",
    "telephony",
    "wifi",
    "bluetooth-le",
    "healthkit",
    "gamekit",
    "arkit",
];

/// Validates manifest key presence and well-formedness.
pub struct BundleKeysRule;

#[async_trait]
impl Rule for BundleKeysRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Required Info.plist keys, bundle identifier and version formats"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for key in REQUIRED_KEYS {
            if !ctx.has_key(key) {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Critical,
                        format!("Missing required key: {}", key),
                    )
                    .with_remediation(format!("Add {} to the app's Info.plist", key))
                    .automatable(),
                );
            }
        }

        if let Some(identifier) = ctx.string_key("CFBundleIdentifier") {
            if !is_valid_identifier(identifier) {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::High,
                        "Invalid bundle identifier format",
                    )
                    .with_details(format!(
                        "CFBundleIdentifier '{}' must contain only alphanumerics, dots, and \
                         hyphens, be at most {} characters, and contain no empty segments",
                        identifier, MAX_IDENTIFIER_LEN
                    )),
                );
            }
        }

        for key in ["CFBundleVersion", "CFBundleShortVersionString"] {
            if let Some(version) = ctx.string_key(key) {
                if !is_valid_version(version) {
                    findings.push(
                        Finding::new(
                            RULE_NAME,
                            Severity::High,
                            format!("Invalid version string in {}", key),
                        )
                        .with_details(format!(
                            "'{}' must be one to three dot-separated numbers (e.g. 1.0.0)",
                            version
                        )),
                    );
                }
            }
        }

        if let Some(display_name) = ctx.string_key("CFBundleDisplayName") {
            if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::High,
                        format!(
                            "CFBundleDisplayName exceeds {} character limit",
                            MAX_DISPLAY_NAME_LEN
                        ),
                    )
                    .with_details(format!(
                        "'{}' is {} characters",
                        display_name,
                        display_name.chars().count()
                    )),
                );
            }
        }

        if let Some(capabilities) = ctx.array_key("UIRequiredDeviceCapabilities") {
            for value in capabilities {
                if let Some(capability) = value.as_string() {
                    if !ALLOWED_DEVICE_CAPABILITIES.contains(&capability) {
                        findings.push(
                            Finding::new(
                                RULE_NAME,
                                Severity::High,
                                format!("Unknown device capability: {}", capability),
                            )
                            .with_remediation(
                                "Use only capability values documented for \
                                 UIRequiredDeviceCapabilities",
                            ),
                        );
                    }
                }
            }
        }

        Ok(findings)
    }
}

fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier.len() <= MAX_IDENTIFIER_LEN
        && !identifier.contains("..")
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (1..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{artifacts, package};

    fn valid_manifest() -> plist::Dictionary {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "CFBundleIdentifier".into(),
            plist::Value::String("com.example.testapp".into()),
        );
        dict.insert("CFBundleName".into(), plist::Value::String("TestApp".into()));
        dict.insert(
            "CFBundleDisplayName".into(),
            plist::Value::String("Test App".into()),
        );
        dict.insert("CFBundleVersion".into(), plist::Value::String("42".into()));
        dict.insert(
            "CFBundleShortVersionString".into(),
            plist::Value::String("1.0.0".into()),
        );
        dict.insert("LSRequiresIPhoneOS".into(), plist::Value::Boolean(true));
        dict
    }

    async fn run(dict: plist::Dictionary) -> Vec<Finding> {
        let package = package();
        let artifacts = artifacts(dict);
        let ctx = ValidationContext::new(&package, &artifacts, None);
        BundleKeysRule.evaluate(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_valid_manifest_is_clean() {
        assert!(run(valid_manifest()).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_key_is_critical() {
        let mut dict = plist::Dictionary::new();
        dict.insert("CFBundleName".into(), plist::Value::String("TestApp".into()));

        let findings = run(dict).await;
        let identifier_finding = findings
            .iter()
            .find(|f| f.message.contains("CFBundleIdentifier"))
            .expect("missing identifier finding");
        assert_eq!(identifier_finding.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_invalid_identifier_format() {
        let mut dict = valid_manifest();
        dict.insert(
            "CFBundleIdentifier".into(),
            plist::Value::String("com example app".into()),
        );

        let findings = run(dict).await;
        assert!(findings
            .iter()
            .any(|f| f.severity == Severity::High
                && f.message.contains("Invalid bundle identifier format")));
    }

    #[tokio::test]
    async fn test_valid_identifiers_never_flagged() {
        for identifier in ["com.example.testapp", "a-b.c-1", "X.Y.Z-9"] {
            let mut dict = valid_manifest();
            dict.insert(
                "CFBundleIdentifier".into(),
                plist::Value::String((*identifier).into()),
            );
            let findings = run(dict).await;
            assert!(
                !findings.iter().any(|f| f.message.contains("identifier")),
                "flagged valid identifier {}",
                identifier
            );
        }
    }

    #[tokio::test]
    async fn test_double_dot_identifier_flagged() {
        let mut dict = valid_manifest();
        dict.insert(
            "CFBundleIdentifier".into(),
            plist::Value::String("com..example".into()),
        );
        let findings = run(dict).await;
        assert!(findings.iter().any(|f| f.message.contains("identifier")));
    }

    #[tokio::test]
    async fn test_invalid_version_string() {
        let mut dict = valid_manifest();
        dict.insert(
            "CFBundleShortVersionString".into(),
            plist::Value::String("1.0.beta".into()),
        );
        let findings = run(dict).await;
        assert!(findings
            .iter()
            .any(|f| f.message.contains("CFBundleShortVersionString")));
    }

    #[tokio::test]
    async fn test_long_display_name() {
        let mut dict = valid_manifest();
        dict.insert(
            "CFBundleDisplayName".into(),
            plist::Value::String("A".repeat(31)),
        );
        let findings = run(dict).await;
        assert!(findings
            .iter()
            .any(|f| f.message.contains("exceeds 30 character limit")));
    }

    #[tokio::test]
    async fn test_unknown_device_capability() {
        let mut dict = valid_manifest();
        dict.insert(
            "UIRequiredDeviceCapabilities".into(),
            plist::Value::Array(vec![
                plist::Value::String("arm64".into()),
                plist::Value::String("warp-drive".into()),
            ]),
        );
        let findings = run(dict).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("warp-drive"));
    }

    #[test]
    fn test_version_format() {
        assert!(is_valid_version("1"));
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("1.0.0"));
        assert!(!is_valid_version("1.0.0.0"));
        assert!(!is_valid_version("1..0"));
        assert!(!is_valid_version("v1.0"));
        assert!(!is_valid_version(""));
    }
}
