#![deny(missing_docs)]

//! Stochastic template bank construction over a two-dimensional parameter
//! space: uniform proposals are accepted only when no existing template lies
//! within `distance_max`, until acceptances become rare enough.

/// Sorted template bank and its coverage query.
pub mod bank;
/// YAML configuration schema and defaults.
pub mod config;
/// Acceptance window, stopping rules and the convergence loop.
pub mod convergence;
/// Canonical hashing of banks and configurations.
pub mod hash;
/// JSON and CSV bank files.
pub mod io;
/// Run manifest serialization helpers.
pub mod manifest;
/// Positive-definite metric and coverage ellipse.
pub mod metric;
/// Per-acceptance samples and CSV export.
pub mod metrics;
/// Zero-copy key view and range queries.
pub mod nhood;
/// Sampling region and proposal stream.
pub mod proposals;
/// End-to-end run driver writing bank, metrics and manifest.
pub mod runner;
/// Template points.
pub mod template;

pub use bank::{Bank, Coverage};
pub use config::{
    NeighborhoodConfig, OutputConfig, RegionConfig, ResolvedRun, RunConfig, SeedPolicy,
};
pub use convergence::{
    run, AcceptanceWindow, ConvergenceCriteria, ConvergenceLoop, LoopStatus, NoopObserver,
    ProposalEvent, RunObserver, RunState, RunSummary, WINDOW_LEN,
};
pub use hash::canonical_bank_hash;
pub use io::{read_coordinates, write_coordinates, BankFile, BankFormat};
pub use manifest::RunManifest;
pub use metric::{CoverageEllipse, Metric};
pub use metrics::{AcceptanceSample, MetricsRecorder};
pub use nhood::KeyView;
pub use proposals::{generate, ProposalStream, Region};
pub use runner::{execute, RunArtefacts, RunReport};
pub use template::Template;
