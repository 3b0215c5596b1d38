//! Optional marketplace listing metadata.
//!
//! A metadata document is a JSON file describing listing intent (name,
//! description, keywords, category, support links). It is supplementary:
//! absence is not an error, and a bad file degrades to a Medium finding
//! rather than aborting the run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MetadataError;

/// Parsed listing metadata. Unrecognized top-level fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppMetadata {
    pub app_name: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub support_url: Option<String>,
}

/// Loads the metadata document, if a path was supplied.
///
/// # Errors
///
/// Returns [`MetadataError`] when the path was given but the file is missing
/// or not valid JSON. The caller treats this as non-fatal.
pub fn load_metadata(path: Option<&Path>) -> Result<Option<AppMetadata>, MetadataError> {
    let path = match path {
        Some(p) => p,
        None => return Ok(None),
    };

    let content = fs::read_to_string(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let metadata: AppMetadata =
        serde_json::from_str(&content).map_err(|source| MetadataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), "loaded metadata document");
    Ok(Some(metadata))
}
