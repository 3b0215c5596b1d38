use anyhow::Result;

use crate::model::ValidationReport;

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &ValidationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
