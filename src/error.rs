//! Error taxonomy for the validation pipeline.
//!
//! Only [`ValidationError`] variants ever stop a run early; every other
//! failure mode (metadata load, rule faults, custom rule load) is absorbed
//! into the finding stream by the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while locating or decoding package artifacts.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No Info.plist found in package: {0}")]
    ManifestMissing(PathBuf),

    #[error("Failed to parse Info.plist at {path}")]
    ManifestUnparseable {
        path: String,
        #[source]
        source: plist::Error,
    },

    #[error("Manifest at {0} is not a property-list dictionary")]
    ManifestNotDictionary(String),

    #[error("Failed to read archive: {0}")]
    Zip(String),

    #[error("I/O error while reading package")]
    Io(#[from] std::io::Error),
}

/// Top-level fatal errors. Anything else degrades to a finding.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid input package: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Non-fatal metadata document failure; the engine converts this to a Medium
/// finding and continues with metadata treated as absent.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to read metadata file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata file {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Non-fatal custom rule definition failure; logged as a startup warning and
/// the rule is simply not registered.
#[derive(Debug, Error)]
pub enum CustomRuleLoadError {
    #[error("Failed to read rule definition {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule definition {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rule definition {path} is invalid: {message}")]
    Shape { path: PathBuf, message: String },
}

/// Renders an error and its source chain, one cause per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    out
}
