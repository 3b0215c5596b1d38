//! Package references and artifact extraction.
//!
//! A [`PackageRef`] identifies either an `.app` bundle directory or an `.ipa`
//! archive; [`extract`] runs the matching extraction path and yields the
//! decoded [`ExtractedArtifacts`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use storelint::extract::{extract, PackageRef};
//!
//! let package = PackageRef::from_path(Path::new("MyApp.app"))?;
//! let artifacts = extract(&package)?;
//! println!("Decoded {} manifest keys", artifacts.info.len());
//! # Ok::<(), storelint::error::ValidationError>(())
//! ```

mod archive;
mod bundle;

use std::path::{Path, PathBuf};

use crate::error::{ExtractionError, ValidationError};

/// Conventional file name of the primary manifest.
pub const MANIFEST_NAME: &str = "Info.plist";
/// Conventional file name of the privacy declaration.
pub const PRIVACY_MANIFEST_NAME: &str = "PrivacyInfo.xcprivacy";
/// Conventional file name of the archived entitlements plist.
pub const ENTITLEMENTS_NAME: &str = "archived-expanded-entitlements.xcent";

/// Immutable reference to the package under inspection.
///
/// Created once per invocation from user input; the variant decides which
/// extraction path runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    /// A directory bundle ending in `.app`.
    Bundle(PathBuf),
    /// A zip-compatible archive file ending in `.ipa`.
    Archive(PathBuf),
}

impl PackageRef {
    /// Validates the shape of a user-supplied path.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidInput`] if the path does not exist,
    /// or exists but is neither a `.app` directory nor an `.ipa` file.
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        if !path.exists() {
            return Err(ValidationError::InvalidInput(format!(
                "package path does not exist: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if path.is_dir() && name.ends_with(".app") {
            return Ok(PackageRef::Bundle(path.to_path_buf()));
        }
        if path.is_file() && name.ends_with(".ipa") {
            return Ok(PackageRef::Archive(path.to_path_buf()));
        }

        Err(ValidationError::InvalidInput(format!(
            "expected a .app bundle directory or .ipa archive, got: {}",
            path.display()
        )))
    }

    pub fn path(&self) -> &Path {
        match self {
            PackageRef::Bundle(p) | PackageRef::Archive(p) => p,
        }
    }
}

/// The product of extraction, owned by the engine for one run.
///
/// Rules receive read-only access. The primary manifest is always present;
/// auxiliary manifests are probed non-fatally and may be absent.
#[derive(Debug, Clone)]
pub struct ExtractedArtifacts {
    /// Decoded primary manifest. Unknown keys are preserved as opaque values.
    pub info: plist::Dictionary,
    /// Decoded privacy declaration, if one was found and parsed.
    pub privacy_manifest: Option<plist::Value>,
    /// Decoded entitlements plist, if one was found and parsed.
    pub entitlements: Option<plist::Value>,
    /// Resolved path of the primary component inside a multi-component
    /// archive (e.g. `Payload/MyApp.app`). `None` for directory bundles.
    pub primary_path: Option<String>,
}

/// Extracts artifacts from the package, dispatching on the reference kind.
///
/// # Errors
///
/// Any failure here is fatal to the run: a missing or unparseable primary
/// manifest, or an unreadable package.
pub fn extract(package: &PackageRef) -> Result<ExtractedArtifacts, ExtractionError> {
    match package {
        PackageRef::Bundle(path) => bundle::extract_bundle(path),
        PackageRef::Archive(path) => archive::extract_archive(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_path_rejects_missing() {
        let err = PackageRef::from_path(Path::new("/nonexistent/MyApp.app")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInput(_)));
    }

    #[test]
    fn test_from_path_accepts_bundle_dir() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("MyApp.app");
        fs::create_dir(&bundle).unwrap();

        let package = PackageRef::from_path(&bundle).unwrap();
        assert!(matches!(package, PackageRef::Bundle(_)));
    }

    #[test]
    fn test_from_path_rejects_wrong_shape() {
        let dir = tempdir().unwrap();

        // A directory without the bundle extension
        let plain = dir.path().join("MyApp");
        fs::create_dir(&plain).unwrap();
        assert!(PackageRef::from_path(&plain).is_err());

        // A file with the bundle extension
        let fake = dir.path().join("Fake.app");
        fs::write(&fake, b"not a directory").unwrap();
        assert!(PackageRef::from_path(&fake).is_err());
    }

    #[test]
    fn test_from_path_accepts_ipa_file() {
        let dir = tempdir().unwrap();
        let ipa = dir.path().join("MyApp.ipa");
        fs::write(&ipa, b"PK").unwrap();

        let package = PackageRef::from_path(&ipa).unwrap();
        assert!(matches!(package, PackageRef::Archive(_)));
    }
}
