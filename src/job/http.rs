//! Job creation over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::transport::{CreateJobRequest, JobApi};
use crate::config::DocentConfig;
use crate::error::DocentError;
use crate::types::JobId;

/// Fallback diagnostic when an error body cannot be parsed.
pub const UNKNOWN_INITIATION_ERROR: &str = "Unknown error occurred during initiation.";

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    job_id: JobId,
    #[serde(default)]
    message: Option<String>,
}

/// `POST {api}/api/v1/agent/jobs`.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: reqwest::Client,
    jobs_url: String,
    request_timeout: Option<Duration>,
}

impl HttpJobApi {
    /// Build a client for the configured API.
    pub fn new(config: &DocentConfig) -> Result<Self, DocentError> {
        let client = reqwest::Client::builder()
            .default_headers(json_headers())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing reqwest client.
    pub fn with_client(client: reqwest::Client, config: &DocentConfig) -> Self {
        Self {
            client,
            jobs_url: config.jobs_url(),
            request_timeout: config.request_timeout,
        }
    }

    pub fn jobs_url(&self) -> &str {
        &self.jobs_url
    }
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn create_job(&self, request: &CreateJobRequest) -> Result<JobId, DocentError> {
        let mut builder = self.client.post(&self.jobs_url).json(request);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = extract_detail(status.as_u16(), &body);
            debug!(status = status.as_u16(), %detail, "job creation rejected");
            return Err(DocentError::api(status.as_u16(), detail));
        }

        let created: CreateJobResponse = serde_json::from_str(&body)?;
        debug!(
            job_id = %created.job_id,
            backend_message = created.message.as_deref().unwrap_or_default(),
            "job created"
        );
        Ok(created.job_id)
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Pull the diagnostic out of an error body (`{"detail": ...}`).
pub fn extract_detail(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            // Validation failures carry a list of problems.
            Some(detail @ (Value::Array(_) | Value::Object(_))) => detail.to_string(),
            _ => format!("HTTP error {status}"),
        },
        Err(_) => UNKNOWN_INITIATION_ERROR.to_string(),
    }
}
