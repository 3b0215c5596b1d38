use std::path::Path;

use tracing::{debug, warn};

use super::{ExtractedArtifacts, ENTITLEMENTS_NAME, MANIFEST_NAME, PRIVACY_MANIFEST_NAME};
use crate::error::ExtractionError;

/// Extracts artifacts from a directory bundle.
///
/// The manifest at the bundle root is required; the privacy declaration and
/// entitlements file are probed at their sibling conventional paths and any
/// failure there degrades to a warning.
pub(crate) fn extract_bundle(bundle: &Path) -> Result<ExtractedArtifacts, ExtractionError> {
    let manifest_path = bundle.join(MANIFEST_NAME);
    if !manifest_path.exists() {
        return Err(ExtractionError::ManifestMissing(bundle.to_path_buf()));
    }

    let value = plist::Value::from_file(&manifest_path).map_err(|source| {
        ExtractionError::ManifestUnparseable {
            path: manifest_path.display().to_string(),
            source,
        }
    })?;

    let info = match value {
        plist::Value::Dictionary(dict) => dict,
        _ => {
            return Err(ExtractionError::ManifestNotDictionary(
                manifest_path.display().to_string(),
            ))
        }
    };
    debug!(keys = info.len(), "decoded bundle manifest");

    Ok(ExtractedArtifacts {
        info,
        privacy_manifest: probe_auxiliary(bundle, PRIVACY_MANIFEST_NAME),
        entitlements: probe_auxiliary(bundle, ENTITLEMENTS_NAME),
        primary_path: None,
    })
}

/// Reads an optional auxiliary plist; parse failures are non-fatal.
fn probe_auxiliary(bundle: &Path, name: &str) -> Option<plist::Value> {
    let path = bundle.join(name);
    if !path.exists() {
        return None;
    }

    match plist::Value::from_file(&path) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unparseable auxiliary manifest");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn make_bundle(manifest: Option<&plist::Dictionary>) -> (TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("TestApp.app");
        fs::create_dir(&bundle).unwrap();
        if let Some(dict) = manifest {
            plist::Value::Dictionary(dict.clone())
                .to_file_xml(bundle.join(MANIFEST_NAME))
                .unwrap();
        }
        (dir, bundle)
    }

    fn minimal_manifest() -> plist::Dictionary {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "CFBundleIdentifier".into(),
            plist::Value::String("com.example.testapp".into()),
        );
        dict.insert("CFBundleName".into(), plist::Value::String("TestApp".into()));
        dict
    }

    #[test]
    fn test_extract_bundle_ok() {
        let (_dir, bundle) = make_bundle(Some(&minimal_manifest()));
        let artifacts = extract_bundle(&bundle).unwrap();

        assert_eq!(
            artifacts.info.get("CFBundleIdentifier").and_then(|v| v.as_string()),
            Some("com.example.testapp")
        );
        assert!(artifacts.privacy_manifest.is_none());
        assert!(artifacts.primary_path.is_none());
    }

    #[test]
    fn test_extract_bundle_missing_manifest() {
        let (_dir, bundle) = make_bundle(None);
        let err = extract_bundle(&bundle).unwrap_err();
        assert!(matches!(err, ExtractionError::ManifestMissing(_)));
    }

    #[test]
    fn test_extract_bundle_malformed_manifest() {
        let (_dir, bundle) = make_bundle(None);
        fs::write(bundle.join(MANIFEST_NAME), b"this is not a plist").unwrap();

        let err = extract_bundle(&bundle).unwrap_err();
        assert!(matches!(err, ExtractionError::ManifestUnparseable { .. }));
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let mut dict = minimal_manifest();
        dict.insert(
            "XVendorCustomKey".into(),
            plist::Value::String("opaque".into()),
        );
        let (_dir, bundle) = make_bundle(Some(&dict));

        let artifacts = extract_bundle(&bundle).unwrap();
        assert_eq!(
            artifacts.info.get("XVendorCustomKey").and_then(|v| v.as_string()),
            Some("opaque")
        );
    }

    #[test]
    fn test_bad_privacy_manifest_degrades() {
        let (_dir, bundle) = make_bundle(Some(&minimal_manifest()));
        fs::write(bundle.join(PRIVACY_MANIFEST_NAME), b"garbage").unwrap();

        let artifacts = extract_bundle(&bundle).unwrap();
        assert!(artifacts.privacy_manifest.is_none());
    }

    #[test]
    fn test_privacy_manifest_parsed_when_valid() {
        let (_dir, bundle) = make_bundle(Some(&minimal_manifest()));
        let mut privacy = plist::Dictionary::new();
        privacy.insert(
            "NSPrivacyTracking".into(),
            plist::Value::Boolean(false),
        );
        plist::Value::Dictionary(privacy)
            .to_file_xml(bundle.join(PRIVACY_MANIFEST_NAME))
            .unwrap();

        let artifacts = extract_bundle(&bundle).unwrap();
        assert!(artifacts.privacy_manifest.is_some());
    }
}
