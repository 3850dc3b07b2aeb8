//! Command handlers.

use anyhow::Context;
use console::style;
use gridsync_core::GridConfig;
use gridsync_core::matrix::VersionMatrix;
use gridsync_envs::reconciler::{EnvReconciler, MAIN_ALIAS};
use gridsync_envs::toolchain::SystemToolchain;
use gridsync_jobs::client::Credentials;
use gridsync_jobs::sync::MatrixSynchronizer;
use gridsync_jobs::{compute_axes, compute_combination_filter};
use std::path::Path;
use tracing::info;

/// Write a starter configuration file.
pub fn init() -> anyhow::Result<()> {
    let path = Path::new("gridsync.yaml");

    if path.exists() {
        println!("{} gridsync.yaml already exists", style("!").yellow());
        return Ok(());
    }

    let template = r#"# Declared test grid: interpreter versions mapped to the numeric-library
# versions exercised against them. "dev" means built from source by a
# downstream build step, nothing preinstalled.
matrix:
  versions:
    "2.7": ["1.6", "1.7", "dev"]
    "3.3": ["1.7"]
  # The single environment used for docs and coverage on top of testing.
  main: ["2.7", "1.7"]
  common_packages: [cython]
  main_packages: [sphinx, pytest-cov, matplotlib]

envs:
  # Environments are created under this directory.
  root: /var/lib/gridsync
  # Base interpreters live here as python<version> binaries.
  interpreter_dir: /opt/python/bin

jobs:
  server_url: "https://ci.example.org/"
  # Only jobs whose names match this pattern are rewritten.
  job_pattern: ".*multiconfig$"
  platform_label: debian6
"#;

    std::fs::write(path, template)?;
    println!("{} Created gridsync.yaml", style("✓").green());
    Ok(())
}

/// Load and validate the configuration, then print the computed grid without
/// touching anything.
pub fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = load(config_path)?;
    let matrix = &config.matrix;

    println!("{} Configuration is valid", style("✓").green());

    println!("Environments:");
    for (interp, lib) in matrix.sorted_pairs() {
        let name = VersionMatrix::env_name(interp, lib);
        if matrix.is_main(interp, lib) {
            println!("  - {name} ({MAIN_ALIAS})");
        } else {
            println!("  - {name}");
        }
    }
    println!("  - {}", config.envs.extra.name);

    println!("Axes:");
    for axis in compute_axes(matrix, &config.jobs.platform_label) {
        println!("  - {}: {}", axis.name, axis.values.join(", "));
    }
    println!("Combination filter:");
    println!("  {}", compute_combination_filter(matrix));

    Ok(())
}

/// Converge the on-disk environments to the declared matrix.
pub async fn envs(config_path: &Path) -> anyhow::Result<()> {
    let config = load(config_path)?;
    info!(root = %config.envs.root.display(), "Reconciling environments");

    let reconciler = EnvReconciler::new(&config.envs, &config.matrix, SystemToolchain);
    reconciler
        .reconcile_all()
        .await
        .context("environment reconciliation failed")?;

    println!("{} Environments are in sync", style("✓").green());
    Ok(())
}

/// Rewrite every matching remote job's build matrix.
pub async fn jobs(config_path: &Path, username: String, password: String) -> anyhow::Result<()> {
    let config = load(config_path)?;
    info!(server = %config.jobs.server_url, "Synchronizing build matrices");

    let credentials = Credentials { username, password };
    let synchronizer = MatrixSynchronizer::new(&config.jobs, &config.matrix, credentials)?;
    let summary = synchronizer
        .sync_all()
        .await
        .context("build-matrix synchronization failed")?;

    println!(
        "{} {} matched, {} updated, {} failed",
        style("✓").green(),
        summary.matched,
        summary.updated,
        summary.failed
    );
    if summary.failed > 0 {
        anyhow::bail!("{} job(s) could not be updated", summary.failed);
    }
    Ok(())
}

fn load(config_path: &Path) -> anyhow::Result<GridConfig> {
    GridConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))
}
