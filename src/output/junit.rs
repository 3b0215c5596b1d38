//! JUnit XML rendering for CI systems.
//!
//! Each finding becomes one `<testcase>` classed by its rule. Critical and
//! High findings carry a `<failure>` element so CI dashboards surface them;
//! lower severities render as passing cases.

use crate::model::{Severity, ValidationReport};

pub fn render_junit(report: &ValidationReport) -> String {
    let failures = report
        .results
        .iter()
        .filter(|f| f.severity >= Severity::High)
        .count();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuite name=\"storelint\" tests=\"{}\" failures=\"{}\" timestamp=\"{}\">\n",
        report.results.len(),
        failures,
        escape(&report.generated_at.to_rfc3339()),
    ));

    for finding in &report.results {
        let name = escape(&format!(
            "[{}] {}",
            finding.severity.as_str(),
            finding.message
        ));
        let classname = escape(&finding.rule);

        if finding.severity >= Severity::High {
            out.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\">\n",
                name, classname
            ));
            out.push_str(&format!(
                "    <failure message=\"{}\" type=\"{}\">{}</failure>\n",
                escape(&finding.message),
                escape(finding.severity.display_name()),
                escape(finding.details.as_deref().unwrap_or(&finding.message)),
            ));
            out.push_str("  </testcase>\n");
        } else {
            out.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\"/>\n",
                name, classname
            ));
        }
    }

    out.push_str("</testsuite>\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
