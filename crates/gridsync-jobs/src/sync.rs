//! Remote job synchronization.

use crate::client::{Credentials, JobClient, JobRef};
use crate::document::update_document;
use gridsync_core::config::JobsConfig;
use gridsync_core::matrix::VersionMatrix;
use gridsync_core::{Error, Result};
use regex::Regex;
use tracing::{error, info};

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Jobs whose names matched the selection pattern.
    pub matched: usize,
    /// Matched jobs whose documents were rewritten and submitted.
    pub updated: usize,
    /// Matched jobs skipped because fetch or submit failed.
    pub failed: usize,
}

/// Pushes the declared matrix into every matching remote job, one job at a
/// time in listing order.
pub struct MatrixSynchronizer<'a> {
    client: JobClient,
    matrix: &'a VersionMatrix,
    pattern: Regex,
    platform_label: String,
}

impl<'a> MatrixSynchronizer<'a> {
    pub fn new(
        config: &JobsConfig,
        matrix: &'a VersionMatrix,
        credentials: Credentials,
    ) -> Result<Self> {
        let pattern = Regex::new(&config.job_pattern).map_err(|e| {
            Error::InvalidConfig(format!("job pattern {:?}: {e}", config.job_pattern))
        })?;
        Ok(Self {
            client: JobClient::new(&config.server_url, credentials),
            matrix,
            pattern,
            platform_label: config.platform_label.clone(),
        })
    }

    /// Rewrite every matching job's configuration. A failure on one job is
    /// logged and does not stop the rest: jobs are independent targets, and
    /// an operator rerunning after fixing one should not need the others to
    /// have failed too. Listing failure is fatal, there is nothing to
    /// iterate.
    pub async fn sync_all(&self) -> Result<SyncSummary> {
        let jobs = self.client.list_jobs().await?;
        let mut summary = SyncSummary::default();

        for job in &jobs {
            if !self.pattern.is_match(&job.name) {
                continue;
            }
            summary.matched += 1;

            match self.sync_job(job).await {
                Ok(()) => {
                    info!(job = %job.name, "Updated build matrix");
                    summary.updated += 1;
                }
                Err(e) => {
                    error!(job = %job.name, error = %e, "Skipping job");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn sync_job(&self, job: &JobRef) -> Result<()> {
        let document = self.client.fetch_config(job).await?;
        let updated = update_document(&document, self.matrix, &self.platform_label)?;
        self.client.submit_config(job, &updated).await
    }
}
