use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use super::{Rule, ValidationContext};
use crate::model::{Finding, Severity};

const RULE_NAME: &str = "code-signing";

/// Bound on the external verification subprocess.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Path components that mark a debug-flavored build product.
const DEBUG_PATH_MARKERS: &[&str] = &["Debug-iphoneos", "Debug-iphonesimulator"];

/// Verifies the package signature via the host `codesign` tool.
///
/// The check is skipped (Info, with reason) for debug build paths, when a
/// fastlane setup is detected near the package (signing is automated there),
/// or when the host cannot verify signatures at all.
pub struct CodeSigningRule;

#[async_trait]
impl Rule for CodeSigningRule {
    fn name(&self) -> &str {
        RULE_NAME
    }

    fn description(&self) -> &str {
        "Signature verification via the host codesign tool"
    }

    async fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<Finding>> {
        let path = ctx.package.path();

        if let Some(reason) = skip_reason(path) {
            debug!(reason, "skipping signature verification");
            return Ok(vec![Finding::new(
                RULE_NAME,
                Severity::Info,
                format!("Signature verification skipped: {}", reason),
            )]);
        }

        let command = Command::new("codesign")
            .args(["--verify", "--deep", "--strict"])
            .arg(path)
            .output();

        let output = match tokio::time::timeout(VERIFY_TIMEOUT, command).await {
            Err(_) => {
                return Ok(vec![Finding::new(
                    RULE_NAME,
                    Severity::Low,
                    "Signature verification timed out",
                )
                .with_details(format!("codesign did not finish within {:?}", VERIFY_TIMEOUT))]);
            }
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(vec![Finding::new(
                    RULE_NAME,
                    Severity::Info,
                    "Signature verification skipped: codesign tool not available",
                )]);
            }
            Ok(Err(err)) => {
                return Ok(vec![Finding::new(
                    RULE_NAME,
                    Severity::Medium,
                    "Could not run signature verification",
                )
                .with_details(err.to_string())]);
            }
            Ok(Ok(output)) => output,
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(classify_verification(output.status.success(), &stderr)
            .into_iter()
            .collect())
    }
}

fn skip_reason(path: &Path) -> Option<String> {
    if path
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .any(|c| DEBUG_PATH_MARKERS.contains(&c))
    {
        return Some("debug build path".to_string());
    }

    if fastlane_nearby(path) {
        return Some("fastlane signing automation detected in project tree".to_string());
    }

    if !cfg!(target_os = "macos") {
        return Some("host cannot verify signatures".to_string());
    }

    None
}

/// Looks for a fastlane setup in the package's enclosing project tree.
fn fastlane_nearby(path: &Path) -> bool {
    let root = match path.parent() {
        Some(parent) => parent,
        None => return false,
    };

    WalkDir::new(root)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .any(|entry| {
            entry.file_name() == "Fastfile"
                || (entry.file_type().is_dir() && entry.file_name() == "fastlane")
        })
}

/// Maps codesign's verdict to at most one finding. A clean verification
/// produces nothing.
fn classify_verification(success: bool, stderr: &str) -> Option<Finding> {
    if success {
        return None;
    }

    if stderr.contains("code object is not signed") {
        return Some(
            Finding::new(RULE_NAME, Severity::High, "Package is not code signed")
                .with_remediation("Sign the app with a distribution certificate before submission"),
        );
    }

    if stderr.contains("invalid signature")
        || stderr.contains("a sealed resource is missing or invalid")
        || stderr.contains("modified code")
    {
        return Some(
            Finding::new(RULE_NAME, Severity::Critical, "Package signature is invalid")
                .with_details(stderr.trim().to_string()),
        );
    }

    if stderr.contains("No such file") || stderr.contains("Permission denied") {
        return Some(
            Finding::new(
                RULE_NAME,
                Severity::Medium,
                "Signature verification could not access the package",
            )
            .with_details(stderr.trim().to_string()),
        );
    }

    Some(
        Finding::new(RULE_NAME, Severity::Low, "Signature verification failed")
            .with_details(stderr.trim().to_string()),
    )
}
