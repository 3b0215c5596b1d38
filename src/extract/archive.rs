use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use super::{ExtractedArtifacts, ENTITLEMENTS_NAME, MANIFEST_NAME, PRIVACY_MANIFEST_NAME};
use crate::error::ExtractionError;

/// Extracts artifacts from an `.ipa` archive.
///
/// The archive is scanned entry-by-entry via the central directory; only the
/// matched entries are ever decompressed, so multi-gigabyte archives never
/// load fully into memory. Only the primary top-level component's manifest
/// counts: entries nested under sub-bundles (`PlugIns/`, `Watch/`,
/// `Frameworks/` and the like) have extra path segments and never match.
pub(crate) fn extract_archive(archive_path: &Path) -> Result<ExtractedArtifacts, ExtractionError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractionError::Zip(e.to_string()))?;

    // Name pass over the central directory; cheap, no entry decompression.
    let names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();

    let app_prefix = names
        .iter()
        .find_map(|name| primary_app_prefix(name))
        .ok_or_else(|| ExtractionError::ManifestMissing(archive_path.to_path_buf()))?;
    debug!(component = %app_prefix, entries = names.len(), "located primary component");

    let manifest_entry = format!("{}/{}", app_prefix, MANIFEST_NAME);
    let bytes = read_entry_bytes(&mut archive, &manifest_entry)?;
    let value = plist::Value::from_reader(Cursor::new(bytes)).map_err(|source| {
        ExtractionError::ManifestUnparseable {
            path: manifest_entry.clone(),
            source,
        }
    })?;
    let info = match value {
        plist::Value::Dictionary(dict) => dict,
        _ => return Err(ExtractionError::ManifestNotDictionary(manifest_entry)),
    };

    let privacy_entry = format!("{}/{}", app_prefix, PRIVACY_MANIFEST_NAME);
    let entitlements_entry = format!("{}/{}", app_prefix, ENTITLEMENTS_NAME);

    Ok(ExtractedArtifacts {
        info,
        privacy_manifest: probe_entry(&mut archive, &names, &privacy_entry),
        entitlements: probe_entry(&mut archive, &names, &entitlements_entry),
        primary_path: Some(app_prefix),
    })
}

/// Matches `Payload/<Name>.app/Info.plist` exactly at the primary level and
/// returns the component prefix (`Payload/<Name>.app`).
fn primary_app_prefix(entry: &str) -> Option<String> {
    let segments: Vec<&str> = entry.split('/').collect();
    if segments.len() == 3
        && segments[0] == "Payload"
        && segments[1].ends_with(".app")
        && segments[2] == MANIFEST_NAME
    {
        Some(format!("Payload/{}", segments[1]))
    } else {
        None
    }
}

fn read_entry_bytes<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, ExtractionError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractionError::Zip(e.to_string()))?;
    let mut out = Vec::new();
    entry.read_to_end(&mut out)?;
    Ok(out)
}

/// Reads an optional auxiliary plist entry; any failure is non-fatal.
fn probe_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    names: &[String],
    name: &str,
) -> Option<plist::Value> {
    if !names.iter().any(|n| n == name) {
        return None;
    }

    let bytes = match read_entry_bytes(archive, name) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(entry = name, error = %err, "ignoring unreadable auxiliary entry");
            return None;
        }
    };

    match plist::Value::from_reader(Cursor::new(bytes)) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(entry = name, error = %err, "ignoring unparseable auxiliary entry");
            None
        }
    }
}
