//! Validation rules and the rule registry.
//!
//! This module provides the [`Rule`] trait, the shared read-only
//! [`ValidationContext`] every rule receives, and the [`RuleRegistry`] that
//! holds built-in and user-supplied rules in execution order.
//!
//! # Built-in rules
//!
//! | Rule | Checks |
//! |------|--------|
//! | [`BundleKeysRule`] | Required manifest keys, identifier format, version format, display name length, device capabilities |
//! | [`PrivacyRule`] | Privacy manifest presence, purpose string quality, location key pairing |
//! | [`AccountDeletionRule`] | Account-feature heuristics and deletion checklist reminders |
//! | [`PermissionsRule`] | Sensitive background execution modes |
//! | [`AssetsRule`] | Icon and launch screen configuration |
//! | [`CodeSigningRule`] | Signature verification via the host `codesign` tool |
//! | [`LocalizationRule`] | Declared localization coverage |
//! | [`PerformanceRule`] | Deprecated status bar configuration |
//! | [`ContentPolicyRule`] | Export compliance encryption declaration |
//! | [`MetadataRule`] | Listing name, description, and keyword limits |
//!
//! # Example
//!
//! ```
//! use storelint::rules::RuleRegistry;
//!
//! let registry = RuleRegistry::with_builtins();
//! assert_eq!(registry.len(), 10);
//! ```

mod account_deletion;
mod assets;
mod bundle_keys;
mod code_signing;
mod content_policy;
pub mod custom;
mod localization;
mod metadata;
mod performance;
mod permissions;
mod privacy;

pub use account_deletion::AccountDeletionRule;
pub use assets::AssetsRule;
pub use bundle_keys::BundleKeysRule;
pub use code_signing::CodeSigningRule;
pub use content_policy::ContentPolicyRule;
pub use custom::{load_custom_rules, CustomRule};
pub use localization::LocalizationRule;
pub use metadata::MetadataRule;
pub use performance::PerformanceRule;
pub use permissions::PermissionsRule;
pub use privacy::PrivacyRule;

use crate::extract::{ExtractedArtifacts, PackageRef};
use crate::metadata::AppMetadata;
use crate::model::Finding;
use anyhow::Result;
use async_trait::async_trait;

/// Read-only facade over everything a rule may inspect.
///
/// The context is built once per run and shared by every rule; its lifetime
/// is bound to that run.
pub struct ValidationContext<'a> {
    pub package: &'a PackageRef,
    pub artifacts: &'a ExtractedArtifacts,
    pub metadata: Option<&'a AppMetadata>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        package: &'a PackageRef,
        artifacts: &'a ExtractedArtifacts,
        metadata: Option<&'a AppMetadata>,
    ) -> Self {
        Self {
            package,
            artifacts,
            metadata,
        }
    }

    /// The decoded primary manifest.
    pub fn info(&self) -> &plist::Dictionary {
        &self.artifacts.info
    }

    pub fn string_key(&self, key: &str) -> Option<&str> {
        self.info().get(key).and_then(|v| v.as_string())
    }

    pub fn bool_key(&self, key: &str) -> Option<bool> {
        self.info().get(key).and_then(|v| v.as_boolean())
    }

    pub fn array_key(&self, key: &str) -> Option<&[plist::Value]> {
        self.info().get(key).and_then(|v| v.as_array()).map(|v| v.as_slice())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.info().contains_key(key)
    }
}

/// An independent, named validation check.
///
/// Rules inspect the shared context and contribute zero or more findings.
/// An `Err` from [`evaluate`](Rule::evaluate) is captured by the engine as a
/// Medium finding naming the rule and never affects other rules.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Unique rule name; also the registry key.
    fn name(&self) -> &str;

    /// One-line description shown by `list-rules`.
    fn description(&self) -> &str;

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>>;
}

/// Returns the ten built-in rules in their fixed execution order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(BundleKeysRule),
        Box::new(PrivacyRule),
        Box::new(AccountDeletionRule),
        Box::new(PermissionsRule),
        Box::new(AssetsRule),
        Box::new(CodeSigningRule),
        Box::new(LocalizationRule),
        Box::new(PerformanceRule),
        Box::new(ContentPolicyRule),
        Box::new(MetadataRule),
    ]
}

/// Ordered collection of active rules, keyed by unique name.
///
/// Iteration order is insertion order; registering a rule under an existing
/// name replaces it in place (last registration wins), which is how a loaded
/// custom rule supersedes a built-in.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// A registry pre-populated with the built-in rule set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            registry.register(rule);
        }
        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.name() == rule.name()) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    /// Applies, in order: the configured ignore set, then the include
    /// intersection (no include set means everything remains), then the
    /// per-invocation exclude set.
    pub fn filter(&mut self, ignore: &[String], include: Option<&[String]>, exclude: &[String]) {
        self.rules.retain(|r| !ignore.iter().any(|n| n == r.name()));
        if let Some(include) = include {
            self.rules.retain(|r| include.iter().any(|n| n == r.name()));
        }
        self.rules.retain(|r| !exclude.iter().any(|n| n == r.name()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
