//! Post-download completion checks.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::manifest::DownloadManifest;

/// Outcome of a single named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
}

/// Outcome of [`validate_completion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        Self {
            passed: checks.iter().all(|c| c.passed),
            checks,
        }
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            let mark = if check.passed { "✓" } else { "✗" };
            writeln!(f, "{mark} {}", check.name)?;
        }
        write!(f, "{}", if self.passed { "PASSED" } else { "FAILED" })
    }
}

/// Checks that a snapshot directory holds a usable manifest.
///
/// Runs `manifest_exists`, then `files_listed` (at least one file) and
/// `checksums_present` (every file has a 64-character hex SHA-256). When the
/// manifest is missing the later checks are not run. A manifest that exists
/// but does not parse is an error.
pub async fn validate_completion(dir: impl AsRef<Path>) -> Result<ValidationReport> {
    let dir = dir.as_ref();
    let manifest_path = DownloadManifest::path_in(dir);

    let exists = tokio::fs::try_exists(&manifest_path).await.unwrap_or(false);
    let mut checks = vec![CheckResult {
        name: "manifest_exists",
        passed: exists,
    }];
    if !exists {
        warn!(path = %manifest_path.display(), "Manifest not found");
        return Ok(ValidationReport::from_checks(checks));
    }

    let manifest = DownloadManifest::load(dir).await?;
    let has_files = !manifest.files.is_empty();
    checks.push(CheckResult {
        name: "files_listed",
        passed: has_files,
    });
    checks.push(CheckResult {
        name: "checksums_present",
        passed: has_files && manifest.files.iter().all(|f| f.has_valid_checksum()),
    });

    let report = ValidationReport::from_checks(checks);
    info!(passed = report.passed, "Snapshot validated");
    Ok(report)
}
