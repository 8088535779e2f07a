use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use sbank_bank::{execute, NoopObserver, RunConfig, RunReport};
use sbank_core::{CoordinateFrame, NeighborhoodKey};
use serde_json::json;
use tracing::info;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML configuration; command line flags override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Coordinate frame: Cartesian, Polar or ScaledEuclidean.
    #[arg(long)]
    pub coord_frame: Option<CoordinateFrame>,
    /// Lower bound of x1 (radius for Polar).
    #[arg(long, allow_hyphen_values = true)]
    pub x1_min: Option<f64>,
    /// Upper bound of x1.
    #[arg(long, allow_hyphen_values = true)]
    pub x1_max: Option<f64>,
    /// Lower bound of x2 (angle for Polar).
    #[arg(long, allow_hyphen_values = true)]
    pub x2_min: Option<f64>,
    /// Upper bound of x2.
    #[arg(long, allow_hyphen_values = true)]
    pub x2_max: Option<f64>,
    /// Master seed of the proposal stream.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Bank file to seed from; may be repeated.
    #[arg(long = "bank-seed", value_name = "FILE")]
    pub bank_seed: Vec<PathBuf>,
    /// Coverage radius under the metric.
    #[arg(long)]
    pub distance_max: Option<f64>,
    /// Proposals per acceptance at which the run stops.
    #[arg(long)]
    pub convergence_threshold: Option<u64>,
    /// Stop once the bank holds this many templates, seeds included.
    #[arg(long)]
    pub max_new_templates: Option<usize>,
    /// Half-width of the neighbourhood key window.
    #[arg(long)]
    pub neighborhood_size: Option<f64>,
    /// Key the bank is sorted by: x1, x2 or norm.
    #[arg(long)]
    pub neighborhood_param: Option<NeighborhoodKey>,
    /// Output directory for bank, metrics and manifest.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Bank filename inside `--out` (`.json` or `.csv`).
    #[arg(long)]
    pub bank_file: Option<PathBuf>,
    /// Only write templates accepted during this run.
    #[arg(long)]
    pub exclude_seed: bool,
    /// Label recorded in the manifest.
    #[arg(long)]
    pub seed_label: Option<String>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = build_config(args)?;
    let report = execute(&config, &args.bank_seed, &mut NoopObserver)?;
    if let Some(dir) = &config.output.run_directory {
        fs::write(dir.join("config.yaml"), serde_yaml::to_string(&config)?)?;
    }
    log_report(&report);
    let summary = json!({
        "state": report.summary.state,
        "proposals": report.summary.proposals,
        "accepted": report.summary.accepted,
        "bank_size": report.summary.bank_size,
        "seed_templates": report.summary.seed_templates,
        "distance_evaluations": report.summary.distance_evaluations,
        "rejection_rate": report.summary.rejection_rate,
        "bank_hash": report.provenance.bank_hash,
        "bank_file": report.artefacts.as_ref().map(|a| a.bank_file.display().to_string()),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn build_config(args: &GenerateArgs) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_yaml(&fs::read_to_string(path)?)?,
        None => RunConfig::default(),
    };
    if let Some(frame) = args.coord_frame {
        config.frame = frame;
    }
    if let Some(value) = args.x1_min {
        config.region.x1_min = value;
    }
    if let Some(value) = args.x1_max {
        config.region.x1_max = value;
    }
    if args.x2_min.is_some() {
        config.region.x2_min = args.x2_min;
    }
    if args.x2_max.is_some() {
        config.region.x2_max = args.x2_max;
    }
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    if let Some(value) = args.distance_max {
        config.distance_max = value;
    }
    if let Some(value) = args.convergence_threshold {
        config.convergence_threshold = value;
    }
    if args.max_new_templates.is_some() {
        config.max_new_templates = args.max_new_templates;
    }
    if let Some(value) = args.neighborhood_size {
        config.neighborhood.size = value;
    }
    if let Some(param) = args.neighborhood_param {
        config.neighborhood.param = param;
    }
    if args.out.is_some() {
        config.output.run_directory = args.out.clone();
    }
    if let Some(bank_file) = &args.bank_file {
        config.output.bank_file = bank_file.clone();
    }
    if args.exclude_seed {
        config.output.exclude_seed = true;
    }
    if args.seed_label.is_some() {
        config.seed_policy.label = args.seed_label.clone();
    }
    Ok(config)
}

fn log_report(report: &RunReport) {
    info!(
        started = %report.provenance.created_at,
        finished = %report.provenance.finished_at,
        "run window"
    );
    info!(
        proposals = report.summary.proposals,
        bank_size = report.summary.bank_size,
        distance_evaluations = report.summary.distance_evaluations,
        state = ?report.summary.state,
        "bank generation complete"
    );
}
