mod json;
mod junit;
mod text;

pub use json::render_json;
pub use junit::render_junit;
pub use text::render_text;

use crate::model::ValidationReport;
use anyhow::Result;

/// Output format for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable grouped text
    Text,
    /// JSON document for programmatic use
    Json,
    /// JUnit XML for CI result ingestion
    Junit,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "junit" | "xml" => Ok(OutputFormat::Junit),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'json', or 'junit'",
                s
            )),
        }
    }
}

pub fn print_report(report: &ValidationReport, format: OutputFormat, color: bool) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render_text(report, color)),
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Junit => println!("{}", render_junit(report)),
    }
    Ok(())
}

/// Format report to string for file output
pub fn format_report_to_string(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, false)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Junit => Ok(render_junit(report)),
    }
}
