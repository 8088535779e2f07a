use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::RunProvenance;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::convergence::RunState;
use crate::metric::CoverageEllipse;

/// Structured manifest describing a completed bank generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Hashes, seed, timestamps and tool versions.
    pub provenance: RunProvenance,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Why the loop stopped.
    pub stop_reason: RunState,
    /// Proposals drawn.
    pub proposals: u64,
    /// Templates accepted during the run.
    pub accepted: usize,
    /// Final bank size, seeds included.
    pub bank_size: usize,
    /// Templates stored in the bank file; `provenance.bank_hash` covers these.
    pub written_templates: usize,
    /// Templates loaded from seed banks.
    pub seed_templates: usize,
    /// Distance evaluations performed by coverage queries.
    pub distance_evaluations: u64,
    /// Region covered by one template at `distance_max`.
    pub coverage_ellipse: CoverageEllipse,
    /// Seed bank files, in load order.
    pub seed_files: Vec<PathBuf>,
    /// Bank file (relative to the run directory).
    pub bank_file: PathBuf,
    /// Metrics file (relative to the run directory).
    pub metrics_file: PathBuf,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SbankError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SbankError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SbankError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Current UTC time as an RFC 3339 string.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
