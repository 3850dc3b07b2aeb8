//! Declared-matrix to on-disk-environment convergence.

use crate::toolchain::Toolchain;
use gridsync_core::config::EnvsConfig;
use gridsync_core::matrix::{LIBRARY_PACKAGE, LibraryVersion, VersionMatrix};
use gridsync_core::{Error, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Name of the symlink that always points at the main environment.
pub const MAIN_ALIAS: &str = "env-main";

/// Reconciles the environments under one root directory against a declared
/// matrix. Strictly sequential: one environment at a time, each external call
/// awaited to completion before the next.
pub struct EnvReconciler<'a, T: Toolchain> {
    config: &'a EnvsConfig,
    matrix: &'a VersionMatrix,
    toolchain: T,
}

impl<'a, T: Toolchain> EnvReconciler<'a, T> {
    pub fn new(config: &'a EnvsConfig, matrix: &'a VersionMatrix, toolchain: T) -> Self {
        Self {
            config,
            matrix,
            toolchain,
        }
    }

    /// Converge every environment the matrix requires, plus the fixed extra
    /// environment, in a stable order. Any provisioning or install failure
    /// aborts the run: a silently missing environment drops a matrix cell
    /// from the CI grid, which is worse than a failed run an operator will
    /// notice and rerun.
    pub async fn reconcile_all(&self) -> Result<()> {
        for (interp, lib) in self.matrix.sorted_pairs() {
            let name = VersionMatrix::env_name(interp, lib);
            let packages = self.packages_for(interp, lib);
            self.reconcile_one(&name, interp, &packages).await?;

            // Repoint the alias right after the main environment is done, so
            // a run that fails later still leaves the alias correct.
            if self.matrix.is_main(interp, lib) {
                self.repoint_main_alias(&name).await?;
            }
        }

        let extra = &self.config.extra;
        self.reconcile_one(&extra.name, &extra.interpreter, &extra.packages)
            .await?;

        Ok(())
    }

    /// Converge a single environment: rebuild on interpreter mismatch, create
    /// when absent, then (re-)install the declared packages.
    pub async fn reconcile_one(
        &self,
        name: &str,
        interpreter_version: &str,
        packages: &[String],
    ) -> Result<()> {
        let source = self
            .config
            .interpreter_dir
            .join(format!("python{interpreter_version}"));
        let target = self.config.root.join(name);

        info!(name, interpreter = interpreter_version, "Reconciling environment");

        if target.exists() {
            // Two interpreters are the same iff their full reported version
            // strings are byte-identical. Anything else, patch level
            // included, means the environment would run tests under the
            // wrong interpreter.
            let env_binary = target.join("bin").join("python");
            let actual = self.toolchain.interpreter_version(&env_binary).await;
            let expected = self.toolchain.interpreter_version(&source).await;

            if actual != expected {
                warn!(
                    name,
                    actual = actual.as_deref().unwrap_or("<none>"),
                    expected = expected.as_deref().unwrap_or("<none>"),
                    "Interpreter mismatch, removing environment"
                );
                tokio::fs::remove_dir_all(&target).await?;
            }
        }

        if target.exists() {
            debug!(name, "Environment already current");
        } else {
            info!(name, source = %source.display(), "Creating environment");
            self.toolchain
                .create_env(&source, &target)
                .await
                .map_err(|e| Error::Provisioning {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
        }

        for spec in packages {
            debug!(name, spec, "Installing package");
            self.toolchain
                .install_package(&target, spec)
                .await
                .map_err(|e| Error::PackageInstall {
                    name: name.to_string(),
                    spec: spec.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Package specifiers for one matrix cell, in install order: the numeric
    /// library pin (concrete versions only), the common packages, and for the
    /// main pair the main packages.
    fn packages_for(&self, interpreter: &str, lib: &LibraryVersion) -> Vec<String> {
        let mut packages = Vec::new();
        if let Some(pin) = lib.pin_specifier(LIBRARY_PACKAGE) {
            packages.push(pin);
        }
        packages.extend(self.matrix.common_packages.iter().cloned());
        if self.matrix.is_main(interpreter, lib) {
            packages.extend(self.matrix.main_packages.iter().cloned());
        }
        packages
    }

    /// Replace the `env-main` symlink with one pointing at `name`. Old link
    /// first removed, then recreated; a crash in between leaves no alias,
    /// which the next run repairs.
    async fn repoint_main_alias(&self, name: &str) -> Result<()> {
        let alias = self.config.root.join(MAIN_ALIAS);
        let target: PathBuf = self.config.root.join(name);

        match tokio::fs::remove_file(&alias).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::symlink(&target, &alias).await?;

        info!(target = %target.display(), "Repointed main alias");
        Ok(())
    }
}
