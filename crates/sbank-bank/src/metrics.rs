use std::path::Path;

use csv::WriterBuilder;
use sbank_core::errors::{ErrorInfo, SbankError};
use serde::{Deserialize, Serialize};

/// Snapshot recorded each time a proposal is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptanceSample {
    /// Lifetime proposal count at the time of acceptance.
    pub proposals: u64,
    /// Bank size after the insertion.
    pub bank_size: usize,
    /// Proposals drawn since the previous acceptance, this one included.
    pub since_last: u64,
    /// Smoothed rejection rate `1 - window_len / window_sum`.
    pub rejection_rate: f64,
    /// Closest distance reported by the coverage query (`None` for an empty window).
    pub min_distance: Option<f64>,
    /// First coordinate of the accepted template.
    pub x1: f64,
    /// Second coordinate of the accepted template.
    pub x2: f64,
}

/// Collects acceptance samples for CSV export.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    samples: Vec<AcceptanceSample>,
}

impl MetricsRecorder {
    /// Creates a new recorder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an acceptance.
    pub fn push_sample(&mut self, sample: AcceptanceSample) {
        self.samples.push(sample);
    }

    /// Returns an immutable view over the recorded samples.
    pub fn samples(&self) -> &[AcceptanceSample] {
        &self.samples
    }

    /// Consumes the recorder.
    pub fn into_samples(self) -> Vec<AcceptanceSample> {
        self.samples
    }

    /// Writes the recorded samples to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SbankError> {
        write_samples_csv(&self.samples, path)
    }
}

const HEADER: [&str; 7] = [
    "proposals",
    "bank_size",
    "since_last",
    "rejection_rate",
    "min_distance",
    "x1",
    "x2",
];

/// Writes acceptance samples as CSV, an empty `min_distance` meaning no candidate.
///
/// The header is written even when there are no samples.
pub fn write_samples_csv<P: AsRef<Path>>(
    samples: &[AcceptanceSample],
    path: P,
) -> Result<(), SbankError> {
    let path = path.as_ref();
    let write_err = |message: String| {
        SbankError::Serde(
            ErrorInfo::new("metrics-write", message)
                .with_context("path", path.display().to_string()),
        )
    };
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| write_err(err.to_string()))?;
    writer
        .write_record(HEADER)
        .map_err(|err| write_err(err.to_string()))?;
    for sample in samples {
        writer
            .serialize(sample)
            .map_err(|err| write_err(err.to_string()))?;
    }
    writer.flush().map_err(|err| write_err(err.to_string()))
}
