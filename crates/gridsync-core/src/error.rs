//! Error types for gridsync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors (fatal at startup, before any external call)
    #[error("Invalid version matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Environment errors (fatal to the whole reconciliation run)
    #[error("Provisioning environment {name} failed: {message}")]
    Provisioning { name: String, message: String },

    #[error("Installing {spec} into environment {name} failed: {message}")]
    PackageInstall {
        name: String,
        spec: String,
        message: String,
    },

    // Remote job errors (listing is fatal; fetch/submit are isolated per job)
    #[error("Listing remote jobs failed: {0}")]
    JobList(String),

    #[error("Invalid job document: {0}")]
    InvalidDocument(String),

    #[error("Fetching config for job {job} failed: {message}")]
    JobFetch { job: String, message: String },

    #[error("Submitting config for job {job} failed: {message}")]
    JobSubmit { job: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
