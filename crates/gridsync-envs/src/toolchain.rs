//! The external toolchain port.
//!
//! Everything the reconciler asks of the host system goes through the
//! [`Toolchain`] trait: interpreter version queries, environment creation,
//! and package installs. [`SystemToolchain`] is the real implementation;
//! tests substitute their own.

use crate::command;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failure of an external toolchain call, with the tool's own diagnostics.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ToolchainError(pub String);

#[async_trait]
pub trait Toolchain: Send + Sync {
    /// The full version string the given interpreter binary reports, or
    /// `None` when the binary is missing or the query fails. A failed query
    /// is never an error: the caller treats "no version" as a stale
    /// environment and rebuilds.
    async fn interpreter_version(&self, binary: &Path) -> Option<String>;

    /// Create a fresh isolated environment at `target` from the given base
    /// interpreter.
    async fn create_env(&self, interpreter: &Path, target: &Path) -> Result<(), ToolchainError>;

    /// Install one package specifier into the environment, with upgrade
    /// semantics (re-installs pick up patch releases).
    async fn install_package(&self, env: &Path, spec: &str) -> Result<(), ToolchainError>;
}

/// Toolchain backed by the host's interpreters and their bundled tooling.
pub struct SystemToolchain;

#[async_trait]
impl Toolchain for SystemToolchain {
    async fn interpreter_version(&self, binary: &Path) -> Option<String> {
        let output = match command::run(binary, &["--version".as_ref()]).await {
            Ok(output) => output,
            Err(e) => {
                debug!(binary = %binary.display(), error = %e, "Version query failed");
                return None;
            }
        };
        if !output.success() {
            return None;
        }
        // Older interpreters print the version banner on stderr.
        let version = output.combined();
        if version.is_empty() { None } else { Some(version) }
    }

    async fn create_env(&self, interpreter: &Path, target: &Path) -> Result<(), ToolchainError> {
        let output = command::run(
            interpreter,
            &["-m".as_ref(), "venv".as_ref(), target.as_os_str()],
        )
        .await
        .map_err(|e| ToolchainError(e.to_string()))?;

        if !output.success() {
            return Err(ToolchainError(output.combined()));
        }
        Ok(())
    }

    async fn install_package(&self, env: &Path, spec: &str) -> Result<(), ToolchainError> {
        let pip = env.join("bin").join("pip");
        let output = command::run(
            &pip,
            &["install".as_ref(), "--upgrade".as_ref(), spec.as_ref()],
        )
        .await
        .map_err(|e| ToolchainError(e.to_string()))?;

        if !output.success() {
            return Err(ToolchainError(output.combined()));
        }
        Ok(())
    }
}
