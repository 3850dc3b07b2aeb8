//! CI server management API client.

use gridsync_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Opaque credentials for the management API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One job as reported by the server's listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct JobListing {
    jobs: Vec<JobRef>,
}

/// HTTP client for listing jobs and fetching/submitting their configuration
/// documents. One request at a time; jobs are processed strictly in listing
/// order by the synchronizer.
pub struct JobClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl JobClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// All jobs the server knows about, in the server's listing order.
    pub async fn list_jobs(&self) -> Result<Vec<JobRef>> {
        let url = format!("{}/api/json", self.base_url);
        let res = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::JobList(e.to_string()))?;

        if !res.status().is_success() {
            return Err(Error::JobList(format!("{url} returned {}", res.status())));
        }

        let listing: JobListing = res.json().await.map_err(|e| Error::JobList(e.to_string()))?;
        Ok(listing.jobs)
    }

    /// Fetch a job's configuration document.
    pub async fn fetch_config(&self, job: &JobRef) -> Result<Value> {
        let url = config_url(job);
        let res = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::JobFetch {
                job: job.name.clone(),
                message: e.to_string(),
            })?;

        if !res.status().is_success() {
            return Err(Error::JobFetch {
                job: job.name.clone(),
                message: format!("{url} returned {}", res.status()),
            });
        }

        res.json().await.map_err(|e| Error::JobFetch {
            job: job.name.clone(),
            message: e.to_string(),
        })
    }

    /// Submit a rewritten configuration document back to the same location.
    pub async fn submit_config(&self, job: &JobRef, document: &Value) -> Result<()> {
        let url = config_url(job);
        let res = self
            .authed(self.client.post(&url))
            .json(document)
            .send()
            .await
            .map_err(|e| Error::JobSubmit {
                job: job.name.clone(),
                message: e.to_string(),
            })?;

        if !res.status().is_success() {
            return Err(Error::JobSubmit {
                job: job.name.clone(),
                message: format!("{url} returned {}", res.status()),
            });
        }
        Ok(())
    }
}

fn config_url(job: &JobRef) -> String {
    format!("{}/config.json", job.url.trim_end_matches('/'))
}
