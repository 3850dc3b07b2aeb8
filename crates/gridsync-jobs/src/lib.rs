//! Build-matrix synchronization.
//!
//! Projects the declared version matrix onto a CI server's multiconfig job
//! definitions: computes the axis value sets and the combination-filter
//! expression, rewrites each matching job's configuration document, and
//! submits it back over the server's management API.

pub mod axes;
pub mod client;
pub mod document;
pub mod sync;

pub use axes::{Axis, AxisKind, compute_axes, compute_combination_filter};
pub use client::{Credentials, JobClient, JobRef};
pub use document::update_document;
pub use sync::{MatrixSynchronizer, SyncSummary};
