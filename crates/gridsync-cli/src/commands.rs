//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter configuration file
    Init,

    /// Validate the configuration and print the computed grid
    Check {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gridsync.yaml")]
        config: PathBuf,
    },

    /// Reconcile the on-disk environments with the declared matrix
    Envs {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gridsync.yaml")]
        config: PathBuf,
    },

    /// Rewrite matching CI jobs to carry the declared matrix
    Jobs {
        /// Path to the configuration file
        #[arg(short, long, default_value = "gridsync.yaml")]
        config: PathBuf,

        /// Management API username
        #[arg(short, long)]
        username: String,

        /// Management API password
        #[arg(short, long, env = "GRIDSYNC_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
