//! Environment reconciliation.
//!
//! Converges the set of on-disk interpreter environments to the declared
//! version matrix: creates what is missing, destroys and recreates what runs
//! a stale interpreter, and re-installs the declared packages everywhere
//! else. External calls (environment creation, package installs, version
//! queries) go through the [`Toolchain`] port so the convergence logic can be
//! exercised without a real interpreter fleet.

pub mod command;
pub mod reconciler;
pub mod toolchain;

pub use reconciler::{EnvReconciler, MAIN_ALIAS};
pub use toolchain::{SystemToolchain, Toolchain, ToolchainError};
