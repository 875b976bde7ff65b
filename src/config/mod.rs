//! Configuration (layered: code > env > defaults).

use std::time::Duration;

use crate::error::DocentError;
use crate::types::JobId;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_WS_BASE_URL: &str = "ws://localhost:8000";
pub const DEFAULT_FINAL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Endpoints and timing knobs for talking to the explainer backend.
///
/// No timeout is applied to job creation or to the update stream unless
/// `request_timeout` is set explicitly; the backend is expected to finish
/// every job with a `final_result` or an `error` frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DocentConfig {
    /// Base URL for the HTTP API, e.g. `http://localhost:8000`.
    pub api_base_url: String,
    /// Base URL for the update stream, e.g. `ws://localhost:8000`.
    pub ws_base_url: String,
    /// How long the stream may keep delivering trailing frames after
    /// `final_result` before the client closes it.
    pub final_grace_period: Duration,
    /// Optional timeout for the job creation request.
    pub request_timeout: Option<Duration>,
}

impl Default for DocentConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            final_grace_period: DEFAULT_FINAL_GRACE_PERIOD,
            request_timeout: None,
        }
    }
}

impl DocentConfig {
    /// Load from environment variables (`DOCENT_API_BASE_URL`, `DOCENT_WS_BASE_URL`, ...).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DOCENT_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("DOCENT_WS_BASE_URL") {
            config.ws_base_url = url;
        }
        if let Some(ms) = env_millis("DOCENT_FINAL_GRACE_MS") {
            config.final_grace_period = ms;
        }
        if let Some(ms) = env_millis("DOCENT_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Some(ms);
        }

        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_ws_base_url(mut self, url: impl Into<String>) -> Self {
        self.ws_base_url = url.into();
        self
    }

    pub fn with_final_grace_period(mut self, grace: Duration) -> Self {
        self.final_grace_period = grace;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Reject empty base URLs before any request is attempted.
    pub fn validate(&self) -> Result<(), DocentError> {
        if self.api_base_url.trim().is_empty() {
            return Err(DocentError::Configuration(
                "API base URL cannot be empty".into(),
            ));
        }
        if self.ws_base_url.trim().is_empty() {
            return Err(DocentError::Configuration(
                "WebSocket base URL cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Job creation endpoint.
    pub fn jobs_url(&self) -> String {
        format!("{}/api/v1/agent/jobs", trim_base(&self.api_base_url))
    }

    /// Update stream endpoint for one job.
    pub fn updates_url(&self, job_id: &JobId) -> String {
        format!("{}/ws/agent_updates/{job_id}", trim_base(&self.ws_base_url))
    }
}

fn trim_base(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

fn env_millis(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(error) => {
            tracing::warn!(var, value = %raw, %error, "ignoring non-numeric duration");
            None
        }
    }
}
