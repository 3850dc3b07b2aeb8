//! Run configuration.
//!
//! A single YAML file declares the version matrix plus the host- and
//! server-side settings both tools need. The loaded value is passed
//! explicitly into the reconciler and the synchronizer; there is no
//! process-wide configuration state.

use crate::error::{Error, Result};
use crate::matrix::VersionMatrix;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a gridsync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// The declared version matrix.
    pub matrix: VersionMatrix,
    /// Environment reconciliation settings.
    pub envs: EnvsConfig,
    /// Build-matrix synchronization settings.
    pub jobs: JobsConfig,
}

/// Settings for the environment reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvsConfig {
    /// Directory under which environments are created.
    pub root: PathBuf,
    /// Directory holding the base interpreters (`python{version}` binaries).
    pub interpreter_dir: PathBuf,
    /// The fixed extra environment carrying no numeric library.
    #[serde(default)]
    pub extra: ExtraEnvConfig,
}

/// The one environment outside the matrix: a plain interpreter with the
/// numeric library but none of the build tooling the common packages bring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraEnvConfig {
    #[serde(default = "default_extra_name")]
    pub name: String,
    #[serde(default = "default_extra_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_extra_packages")]
    pub packages: Vec<String>,
}

fn default_extra_name() -> String {
    "env-nocython".to_string()
}

fn default_extra_interpreter() -> String {
    "2.7".to_string()
}

fn default_extra_packages() -> Vec<String> {
    vec!["numpy".to_string()]
}

impl Default for ExtraEnvConfig {
    fn default() -> Self {
        Self {
            name: default_extra_name(),
            interpreter: default_extra_interpreter(),
            packages: default_extra_packages(),
        }
    }
}

/// Settings for the build-matrix synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Root URL of the CI server.
    pub server_url: String,
    /// Regex selecting which jobs are multiconfig matrix jobs. Jobs whose
    /// names do not match are left completely untouched.
    #[serde(default = "default_job_pattern")]
    pub job_pattern: String,
    /// The single value of the platform label axis.
    #[serde(default = "default_platform_label")]
    pub platform_label: String,
}

fn default_job_pattern() -> String {
    ".*multiconfig$".to_string()
}

fn default_platform_label() -> String {
    "debian6".to_string()
}

impl GridConfig {
    /// Load and validate a configuration file. Matrix invariant violations
    /// fail here, before anything external is touched.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: GridConfig =
            serde_yaml::from_str(contents).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.matrix.validate()?;
        Ok(config)
    }
}
