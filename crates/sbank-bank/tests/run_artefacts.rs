use std::path::PathBuf;

use sbank_bank::{
    canonical_bank_hash, execute, read_coordinates, write_coordinates, NoopObserver, RunConfig, RunManifest,
    RunState,
};
use tempfile::tempdir;

fn quick_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.distance_max = 0.2;
    config.convergence_threshold = 20;
    config.seed_policy.master_seed = 31;
    config
}

#[test]
fn writes_bank_metrics_and_manifest() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("seed.csv");
    write_coordinates(&seed, &[[0.1, 0.1], [0.9, 0.9]]).unwrap();

    let mut config = quick_config();
    config.output.run_directory = Some(dir.path().join("run"));
    config.seed_policy.label = Some("artefacts".into());
    let report = execute(&config, &[seed.clone()], &mut NoopObserver).unwrap();

    let artefacts = report.artefacts.clone().unwrap();
    let written = read_coordinates(&artefacts.bank_file).unwrap();
    assert_eq!(written, report.bank.coordinates());
    assert_eq!(written.len(), report.summary.bank_size);

    let metrics = std::fs::read_to_string(&artefacts.metrics_file).unwrap();
    assert!(metrics.starts_with("proposals,bank_size,since_last"));
    assert_eq!(metrics.lines().count(), report.summary.accepted + 1);

    let manifest = RunManifest::load(&artefacts.manifest_file).unwrap();
    assert_eq!(manifest.stop_reason, RunState::StoppedByRate);
    assert_eq!(manifest.bank_size, report.summary.bank_size);
    assert_eq!(manifest.written_templates, report.summary.bank_size);
    assert_eq!(manifest.seed_templates, 2);
    assert_eq!(manifest.seed_files, vec![seed]);
    assert_eq!(manifest.seed_label.as_deref(), Some("artefacts"));
    assert_eq!(manifest.provenance.bank_hash, report.provenance.bank_hash);
    assert_eq!(manifest.provenance.seed, 31);
    assert!(!manifest.provenance.finished_at.is_empty());
    assert_eq!(manifest.bank_file, PathBuf::from("bank.json"));
    assert!((manifest.coverage_ellipse.width - 0.4).abs() < 1e-12);
}

#[test]
fn exclude_seed_writes_only_new_templates() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    write_coordinates(&seed, &[[0.5, 0.5]]).unwrap();

    let mut config = quick_config();
    config.output.run_directory = Some(dir.path().join("run"));
    config.output.exclude_seed = true;
    let report = execute(&config, &[seed], &mut NoopObserver).unwrap();

    let artefacts = report.artefacts.unwrap();
    let written = read_coordinates(&artefacts.bank_file).unwrap();
    assert_eq!(written.len(), report.summary.accepted);
    assert!(!written.contains(&[0.5, 0.5]));

    let manifest = RunManifest::load(&artefacts.manifest_file).unwrap();
    assert_eq!(manifest.provenance.bank_hash, canonical_bank_hash(&written));
    assert_eq!(report.provenance.bank_hash, manifest.provenance.bank_hash);
    assert_ne!(
        manifest.provenance.bank_hash,
        canonical_bank_hash(&report.bank.coordinates())
    );
    assert_eq!(manifest.written_templates, written.len());
    assert_eq!(manifest.bank_size, written.len() + 1);
}

#[test]
fn same_seed_gives_same_bank_hash() {
    let config = quick_config();
    let first = execute(&config, &[], &mut NoopObserver).unwrap();
    let second = execute(&config, &[], &mut NoopObserver).unwrap();
    assert!(first.artefacts.is_none());
    assert_eq!(first.provenance.bank_hash, second.provenance.bank_hash);
    assert_eq!(first.provenance.config_hash, second.provenance.config_hash);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn colliding_output_fails_before_running() {
    let dir = tempdir().unwrap();
    let run_dir = dir.path().join("run");
    std::fs::create_dir_all(&run_dir).unwrap();
    let seed = run_dir.join("bank.json");
    write_coordinates(&seed, &[[0.5, 0.5]]).unwrap();

    let mut config = quick_config();
    config.output.run_directory = Some(run_dir);
    let err = execute(&config, &[seed.clone()], &mut NoopObserver).unwrap_err();
    assert_eq!(err.info().code, "seed-output-collision");
    assert_eq!(read_coordinates(&seed).unwrap(), vec![[0.5, 0.5]]);
}

#[test]
fn invalid_configuration_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut config = quick_config();
    config.neighborhood.size = 0.0;
    config.output.run_directory = Some(dir.path().join("run"));
    let err = execute(&config, &[], &mut NoopObserver).unwrap_err();
    assert!(err.is_config());
    assert!(!dir.path().join("run").exists());
}
