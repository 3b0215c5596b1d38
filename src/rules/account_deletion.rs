use anyhow::Result;
use async_trait::async_trait;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "account-deletion";

/// Entitlement granted to apps offering Sign in with Apple.
const APPLE_SIGNIN_ENTITLEMENT: &str = "com.apple.developer.applesignin";

/// Manifest keys that usually accompany account-based features.
const ACCOUNT_HINT_KEYS: &[&str] = &[
    "NSFaceIDUsageDescription",
    "NSUserTrackingUsageDescription",
    "NSContactsUsageDescription",
];

const ACCOUNT_KEYWORDS: &[&str] = &[
    "account",
    "login",
    "log in",
    "sign in",
    "sign up",
    "signup",
    "profile",
    "social",
    "subscription",
    "member",
];

const DELETION_CHECKLIST: &str = "Verify before submission: (1) account deletion is reachable \
    in-app, not only via a website; (2) deletion removes the account record, not just the \
    session; (3) any legally required retention is disclosed to the user; (4) third-party \
    sign-in providers are unlinked on deletion";

/// Reminds about the marketplace's in-app account deletion requirement when
/// account-like features are detected.
pub struct AccountDeletionRule;

#[async_trait]
impl Rule for AccountDeletionRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Account deletion requirement reminders for account-based apps"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let mut signals: Vec<String> = Vec::new();

        if let Some(plist::Value::Dictionary(entitlements)) = &ctx.artifacts.entitlements {
            if entitlements.contains_key(APPLE_SIGNIN_ENTITLEMENT) {
                signals.push(format!("entitlement {}", APPLE_SIGNIN_ENTITLEMENT));
            }
        }

        for key in ACCOUNT_HINT_KEYS {
            if ctx.has_key(key) {
                signals.push(format!("manifest key {}", key));
            }
        }

        if let Some(metadata) = ctx.metadata {
            let haystack = format!(
                "{} {}",
                metadata.description.as_deref().unwrap_or_default(),
                metadata.keywords.join(" ")
            )
            .to_lowercase();
            for keyword in ACCOUNT_KEYWORDS {
                if haystack.contains(keyword) {
                    signals.push(format!("metadata keyword '{}'", keyword));
                    break;
                }
            }
        }

        if !signals.is_empty() {
            findings.push(
                Finding::new(
                    RULE_NAME,
                    Severity::Info,
                    "App appears to offer accounts; in-app account deletion is required",
                )
                .with_details(format!("Detected signals: {}", signals.join(", "))),
            );
            findings.push(
                Finding::new(RULE_NAME, Severity::Info, "Account deletion checklist")
                    .with_details(DELETION_CHECKLIST),
            );
        }

        if let Some(metadata) = ctx.metadata {
            if metadata.privacy_policy_url.is_none() && metadata.support_url.is_none() {
                findings.push(
                    Finding::new(
                        RULE_NAME,
                        Severity::Low,
                        "Metadata declares no support or privacy policy URL",
                    )
                    .with_remediation(
                        "Add privacyPolicyUrl and supportUrl to the listing metadata",
                    ),
                );
            }
        }

        Ok(findings)
    }
}
