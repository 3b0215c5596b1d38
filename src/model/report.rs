use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Finding, Severity};

/// Per-severity counts plus which rules ran and which produced nothing.
///
/// A summary is derived from the finding sequence at report time; it is never
/// stored or updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    /// Rules that executed and contributed zero findings.
    pub passed: Vec<String>,
    /// Every rule that executed, in execution order.
    pub executed: Vec<String>,
}

impl Summary {
    pub fn from_findings(findings: &[Finding], executed: &[String]) -> Self {
        let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();

        let passed = executed
            .iter()
            .filter(|name| !findings.iter().any(|f| &f.rule == *name))
            .cloned()
            .collect();

        Self {
            total: findings.len(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
            info: count(Severity::Info),
            passed,
            executed: executed.to_vec(),
        }
    }

    pub fn count_for(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// Complete result of one validation run.
///
/// Serializes to the JSON contract `{summary, results[], generatedAt}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub summary: Summary,
    pub results: Vec<Finding>,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn new(results: Vec<Finding>, executed: Vec<String>) -> Self {
        let summary = Summary::from_findings(&results, &executed);
        Self {
            summary,
            results,
            generated_at: Utc::now(),
        }
    }

    /// True iff at least one finding sits at or above the given severity.
    pub fn fails_at(&self, threshold: Severity) -> bool {
        self.results.iter().any(|f| f.severity >= threshold)
    }

    /// The most severe finding level present, if any.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.results.iter().map(|f| f.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Vec<Finding> {
        vec![
            Finding::new("bundle-keys", Severity::Critical, "Missing CFBundleIdentifier"),
            Finding::new("privacy", Severity::High, "Privacy manifest not found"),
            Finding::new("metadata", Severity::Info, "No metadata document supplied"),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let executed = vec![
            "bundle-keys".to_string(),
            "privacy".to_string(),
            "assets".to_string(),
            "metadata".to_string(),
        ];
        let summary = Summary::from_findings(&findings(), &executed);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.medium, 0);
        assert_eq!(summary.info, 1);
        assert_eq!(summary.passed, vec!["assets".to_string()]);
        assert_eq!(summary.executed.len(), 4);
    }

    #[test]
    fn test_fails_at_threshold() {
        let report = ValidationReport::new(findings(), vec![]);
        assert!(report.fails_at(Severity::Critical));
        assert!(report.fails_at(Severity::High));
        assert!(report.fails_at(Severity::Info));

        let clean = ValidationReport::new(vec![], vec![]);
        assert!(!clean.fails_at(Severity::Info));
        assert!(clean.highest_severity().is_none());
    }

    #[test]
    fn test_threshold_high_requires_high_or_critical() {
        let only_medium = vec![Finding::new("permissions", Severity::Medium, "voip background mode")];
        let report = ValidationReport::new(only_medium, vec!["permissions".to_string()]);
        assert!(!report.fails_at(Severity::High));
        assert!(report.fails_at(Severity::Medium));
    }

    #[test]
    fn test_json_field_names() {
        let report = ValidationReport::new(vec![], vec![]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("generatedAt").is_some());
        assert_eq!(json["summary"]["total"], 0);
        assert!(json["results"].as_array().unwrap().is_empty());
    }
}
