//! gridsync core
//!
//! Domain types shared by the environment reconciler and the build-matrix
//! synchronizer: the declared version matrix, run configuration, and error
//! handling. This crate has minimal dependencies and defines the shared
//! vocabulary used across all other crates.

pub mod config;
pub mod error;
pub mod matrix;

pub use config::GridConfig;
pub use error::{Error, Result};
pub use matrix::{LibraryVersion, VersionMatrix};
