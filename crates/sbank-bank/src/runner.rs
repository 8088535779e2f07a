use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::{RngHandle, RunProvenance};
use tracing::info;

use crate::bank::Bank;
use crate::config::RunConfig;
use crate::convergence::{ConvergenceLoop, RunObserver, RunSummary};
use crate::hash::{canonical_bank_hash, stable_hash_string};
use crate::io::{check_output_collision, read_seed_files, write_coordinates, BankFile};
use crate::manifest::{timestamp_now, RunManifest};
use crate::metrics::write_samples_csv;
use crate::proposals::generate;

/// Files written by a run with an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtefacts {
    /// Final bank file.
    pub bank_file: PathBuf,
    /// Per-acceptance metrics CSV.
    pub metrics_file: PathBuf,
    /// Run manifest JSON.
    pub manifest_file: PathBuf,
}

/// Everything a caller gets back from [`execute`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Counters and stop reason of the convergence loop.
    pub summary: RunSummary,
    /// Final bank, seeds included.
    pub bank: Bank,
    /// Hashes, seed and timestamps of the run.
    pub provenance: RunProvenance,
    /// Written files, when an output directory was configured.
    pub artefacts: Option<RunArtefacts>,
}

/// Loads seed banks, grows the bank to convergence and writes the artefacts.
///
/// `provenance.bank_hash` covers the templates the bank file receives, so
/// with `exclude_seed` it omits the seeds. Every configuration problem is
/// reported before the first proposal is drawn. Nothing is written unless `config.output.run_directory` is set.
pub fn execute(
    config: &RunConfig,
    seed_files: &[PathBuf],
    observer: &mut dyn RunObserver,
) -> Result<RunReport, SbankError> {
    let created_at = timestamp_now();
    let resolved = config.resolve()?;
    let run_dir = config.output.run_directory.as_deref();
    if let Some(dir) = run_dir {
        check_output_collision(seed_files, &dir.join(&config.output.bank_file))?;
    }

    let seeds = read_seed_files(seed_files)?;
    let mut bank = Bank::new(resolved.nhood_size, resolved.nhood_key, resolved.metric)?;
    bank.seed_bulk(&seeds)?;
    info!(
        seed_files = seed_files.len(),
        seed_templates = bank.len(),
        frame = %resolved.frame,
        nhood_param = %resolved.nhood_key,
        master_seed = resolved.seed,
        "seed bank loaded"
    );

    let mut rng = RngHandle::from_seed(resolved.seed);
    let proposals = generate(&resolved.region, resolved.frame, resolved.metric, &mut rng)?;
    let summary = ConvergenceLoop::new(resolved.criteria).run(&mut bank, proposals, observer)?;

    let written = BankFile::from_bank(&bank, config.output.exclude_seed);
    let provenance = RunProvenance {
        config_hash: stable_hash_string(config)?,
        bank_hash: canonical_bank_hash(&written.coordinates()),
        seed: resolved.seed,
        created_at,
        finished_at: timestamp_now(),
        tool_versions: BTreeMap::from([(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        )]),
    };

    let artefacts = match run_dir {
        Some(dir) => Some(write_artefacts(
            config,
            seed_files,
            dir,
            &bank,
            &written,
            &summary,
            &provenance,
        )?),
        None => None,
    };

    Ok(RunReport {
        summary,
        bank,
        provenance,
        artefacts,
    })
}

fn write_artefacts(
    config: &RunConfig,
    seed_files: &[PathBuf],
    dir: &Path,
    bank: &Bank,
    written: &BankFile,
    summary: &RunSummary,
    provenance: &RunProvenance,
) -> Result<RunArtefacts, SbankError> {
    fs::create_dir_all(dir).map_err(|err| {
        SbankError::Serde(
            ErrorInfo::new("run-dir-mkdir", err.to_string())
                .with_context("path", dir.display().to_string()),
        )
    })?;
    let output = &config.output;
    let bank_file = dir.join(&output.bank_file);
    let metrics_file = dir.join(&output.metrics_file);
    let manifest_file = dir.join(&output.manifest_file);

    write_coordinates(&bank_file, &written.coordinates())?;
    write_samples_csv(&summary.samples, &metrics_file)?;

    let manifest = RunManifest {
        config: config.clone(),
        provenance: provenance.clone(),
        seed_label: config.seed_policy.label.clone(),
        stop_reason: summary.state,
        proposals: summary.proposals,
        accepted: summary.accepted,
        bank_size: summary.bank_size,
        written_templates: written.len(),
        seed_templates: summary.seed_templates,
        distance_evaluations: summary.distance_evaluations,
        coverage_ellipse: bank.metric().coverage_ellipse(config.distance_max),
        seed_files: seed_files.to_vec(),
        bank_file: output.bank_file.clone(),
        metrics_file: output.metrics_file.clone(),
    };
    manifest.write(&manifest_file)?;
    info!(
        bank = %bank_file.display(),
        written = written.len(),
        manifest = %manifest_file.display(),
        "run artefacts written"
    );

    Ok(RunArtefacts {
        bank_file,
        metrics_file,
        manifest_file,
    })
}
