use serde::{Deserialize, Serialize};

use super::Severity;

/// Whether a finding's remediation can be applied mechanically or needs a
/// human to verify something first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationKind {
    Automatable,
    Manual,
}

/// One reported compliance issue.
///
/// Findings are immutable once constructed and are accumulated in rule
/// execution order, not severity order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the rule that produced this finding.
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    pub remediation_kind: RemediationKind,
}

impl Finding {
    pub fn new(rule: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            details: None,
            remediation: None,
            remediation_kind: RemediationKind::Manual,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    /// Marks the remediation as mechanically applicable.
    pub fn automatable(mut self) -> Self {
        self.remediation_kind = RemediationKind::Automatable;
        self
    }
}
