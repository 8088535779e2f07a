use std::f64::consts::TAU;
use std::path::PathBuf;

use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::{CoordinateFrame, NeighborhoodKey};
use serde::{Deserialize, Serialize};

use crate::bank::check_nhood_size;
use crate::convergence::ConvergenceCriteria;
use crate::metric::Metric;
use crate::proposals::Region;

/// YAML-configurable parameters governing a bank generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Coordinate frame used for proposals and the default metric.
    #[serde(default = "default_frame")]
    pub frame: CoordinateFrame,
    /// Sampling bounds.
    #[serde(default)]
    pub region: RegionConfig,
    /// Neighbourhood window used by coverage queries.
    #[serde(default)]
    pub neighborhood: NeighborhoodConfig,
    /// Coverage radius under the metric.
    #[serde(default = "default_distance_max")]
    pub distance_max: f64,
    /// Proposals per acceptance, averaged over the last ten acceptances, at which the run stops.
    #[serde(default = "default_convergence_threshold")]
    pub convergence_threshold: u64,
    /// Optional cap on the bank size (seed templates count towards it).
    #[serde(default)]
    pub max_new_templates: Option<usize>,
    /// Row-major metric overriding the frame default.
    #[serde(default)]
    pub metric: Option<[[f64; 2]; 2]>,
    /// Master seed and labelling.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output artefact layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_frame() -> CoordinateFrame {
    CoordinateFrame::Cartesian
}

fn default_distance_max() -> f64 {
    0.1
}

fn default_convergence_threshold() -> u64 {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame: default_frame(),
            region: RegionConfig::default(),
            neighborhood: NeighborhoodConfig::default(),
            distance_max: default_distance_max(),
            convergence_threshold: default_convergence_threshold(),
            max_new_templates: None,
            metric: None,
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Sampling bounds as written in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Lower bound of the first axis (radius for the polar frame).
    #[serde(default = "default_axis_min")]
    pub x1_min: f64,
    /// Upper bound of the first axis.
    #[serde(default = "default_axis_max")]
    pub x1_max: f64,
    /// Lower bound of the second axis (angle for the polar frame).
    #[serde(default)]
    pub x2_min: Option<f64>,
    /// Upper bound of the second axis.
    #[serde(default)]
    pub x2_max: Option<f64>,
}

fn default_axis_min() -> f64 {
    0.0
}

fn default_axis_max() -> f64 {
    1.0
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            x1_min: default_axis_min(),
            x1_max: default_axis_max(),
            x2_min: None,
            x2_max: None,
        }
    }
}

impl RegionConfig {
    /// Fills missing second-axis bounds and validates the result.
    ///
    /// The polar frame defaults the angle to `[0, 2pi]`; the other frames
    /// reuse the first-axis bounds.
    pub fn resolve(&self, frame: CoordinateFrame) -> Result<Region, SbankError> {
        let (x2_min, x2_max) = match frame {
            CoordinateFrame::Polar => (self.x2_min.unwrap_or(0.0), self.x2_max.unwrap_or(TAU)),
            CoordinateFrame::Cartesian | CoordinateFrame::ScaledEuclidean => (
                self.x2_min.unwrap_or(self.x1_min),
                self.x2_max.unwrap_or(self.x1_max),
            ),
        };
        Region::new((self.x1_min, self.x1_max), (x2_min, x2_max), frame)
    }
}

/// Neighbourhood window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodConfig {
    /// Half-width of the key window. Too small a value grows the bank.
    #[serde(default = "default_nhood_size")]
    pub size: f64,
    /// Key the bank is sorted by.
    #[serde(default)]
    pub param: NeighborhoodKey,
}

fn default_nhood_size() -> f64 {
    0.25
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            size: default_nhood_size(),
            param: NeighborhoodKey::default(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed of the proposal stream.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    42
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Bank filename relative to `run_directory`; `.json` or `.csv`.
    #[serde(default = "default_bank_filename")]
    pub bank_file: PathBuf,
    /// Metrics filename relative to `run_directory`.
    #[serde(default = "default_metrics_filename")]
    pub metrics_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Write only templates accepted during this run.
    #[serde(default)]
    pub exclude_seed: bool,
}

fn default_bank_filename() -> PathBuf {
    PathBuf::from("bank.json")
}

fn default_metrics_filename() -> PathBuf {
    PathBuf::from("metrics.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            bank_file: default_bank_filename(),
            metrics_file: default_metrics_filename(),
            manifest_file: default_manifest_filename(),
            exclude_seed: false,
        }
    }
}

/// Fully validated run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    /// Coordinate frame.
    pub frame: CoordinateFrame,
    /// Sampling bounds with defaults applied.
    pub region: Region,
    /// Metric of every template.
    pub metric: Metric,
    /// Neighbourhood half-width.
    pub nhood_size: f64,
    /// Neighbourhood key.
    pub nhood_key: NeighborhoodKey,
    /// Stopping parameters.
    pub criteria: ConvergenceCriteria,
    /// Master seed.
    pub seed: u64,
}

impl RunConfig {
    /// Validates every parameter, failing before anything is sampled.
    pub fn resolve(&self) -> Result<ResolvedRun, SbankError> {
        let region = self.region.resolve(self.frame)?;
        let metric = match self.metric {
            Some(rows) => Metric::from_rows(rows)?,
            None => Metric::for_frame(self.frame),
        };
        let criteria = ConvergenceCriteria::new(
            self.distance_max,
            self.convergence_threshold,
            self.max_new_templates,
        )?;
        check_nhood_size(self.neighborhood.size)?;
        Ok(ResolvedRun {
            frame: self.frame,
            region,
            metric,
            nhood_size: self.neighborhood.size,
            nhood_key: self.neighborhood.param,
            criteria,
            seed: self.seed_policy.master_seed,
        })
    }

    /// Parses a YAML configuration document.
    pub fn from_yaml(contents: &str) -> Result<Self, SbankError> {
        serde_yaml::from_str(contents).map_err(|err| {
            SbankError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })
    }
}
