use tabled::{settings::Style, Table, Tabled};

use crate::model::{Finding, Severity, ValidationReport};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Findings")]
    count: String,
}

/// Renders the report grouped by severity, most severe group first.
pub fn render_text(report: &ValidationReport, color: bool) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!(
        "Validation completed at: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Rules executed: {}\n",
        report.summary.executed.len()
    ));

    if report.results.is_empty() {
        out.push('\n');
        out.push_str("No issues found. All executed rules passed.\n");
        return out;
    }

    for severity in Severity::all() {
        let group: Vec<&Finding> = report
            .results
            .iter()
            .filter(|f| f.severity == severity)
            .collect();
        if group.is_empty() {
            continue;
        }

        out.push('\n');
        out.push_str(&format!(
            "{} ({}):\n",
            format_severity(severity, color),
            group.len()
        ));
        for finding in group {
            out.push_str(&format!("  [{}] {}\n", finding.rule, finding.message));
            if let Some(details) = &finding.details {
                for line in details.lines() {
                    out.push_str(&format!("      {}\n", line));
                }
            }
            if let Some(remediation) = &finding.remediation {
                out.push_str(&format!("      fix: {}\n", remediation));
            }
        }
    }

    out.push('\n');
    out.push_str("Summary:\n");
    let rows: Vec<SummaryRow> = Severity::all()
        .iter()
        .map(|&s| SummaryRow {
            severity: s.display_name().to_string(),
            count: report.summary.count_for(s).to_string(),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    out.push_str(&table);
    out.push('\n');

    if !report.summary.passed.is_empty() {
        out.push_str(&format!(
            "Passed rules: {}\n",
            report.summary.passed.join(", ")
        ));
    }

    out
}

fn format_severity(severity: Severity, color: bool) -> String {
    if !color {
        return severity.display_name().to_string();
    }
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Medium => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Info => "INFO".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Finding;

    fn report() -> ValidationReport {
        ValidationReport::new(
            vec![
                Finding::new("metadata", Severity::Info, "No metadata document supplied"),
                Finding::new("bundle-keys", Severity::Critical, "Missing required key: CFBundleIdentifier")
                    .with_remediation("Add CFBundleIdentifier to Info.plist"),
                Finding::new("privacy", Severity::High, "Privacy manifest missing"),
            ],
            vec![
                "bundle-keys".to_string(),
                "privacy".to_string(),
                "assets".to_string(),
                "metadata".to_string(),
            ],
        )
    }

    #[test]
    fn test_groups_ordered_most_severe_first() {
        let text = render_text(&report(), false);
        let critical = text.find("Critical (1):").unwrap();
        let high = text.find("High (1):").unwrap();
        let info = text.find("Info (1):").unwrap();
        assert!(critical < high);
        assert!(high < info);
        assert!(text.contains("fix: Add CFBundleIdentifier"));
        assert!(text.contains("Passed rules: assets"));
    }

    #[test]
    fn test_clean_report_has_all_clear_line() {
        let clean = ValidationReport::new(vec![], vec!["bundle-keys".to_string()]);
        let text = render_text(&clean, false);
        assert!(text.contains("No issues found. All executed rules passed."));
    }

    #[test]
    fn test_color_codes_only_when_enabled() {
        let plain = render_text(&report(), false);
        let colored = render_text(&report(), true);
        assert!(!plain.contains("\x1b["));
        assert!(colored.contains("\x1b[31mCRITICAL\x1b[0m"));
    }
}
