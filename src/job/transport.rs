//! Transport seams between the job client and the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DocentError;
use crate::types::{CloseInfo, JobId};

/// Body of the job creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub image_data_url: String,
    pub user_prompt: String,
}

/// Issues job creation requests.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Create a job and return the backend-assigned id.
    ///
    /// Non-success responses map to [`DocentError::Api`] whose message is the
    /// diagnostic extracted from the response body.
    async fn create_job(&self, request: &CreateJobRequest) -> Result<JobId, DocentError>;
}

/// One thing that happened on an open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Text(String),
    Binary(Vec<u8>),
    /// The stream ended. Drops without a closing handshake report
    /// [`CloseInfo::abnormal`].
    Closed(CloseInfo),
    /// Transport failure; the stream is unusable afterwards.
    Error(String),
}

/// A receive-only stream of frames for one job.
#[async_trait]
pub trait FrameStream: Send {
    /// Wait for the next signal. `None` once the stream is exhausted.
    async fn next_signal(&mut self) -> Option<StreamSignal>;

    /// Close with the given code and reason. Also completes a handshake the
    /// peer started.
    async fn close(&mut self, close: CloseInfo) -> Result<(), DocentError>;
}

/// Opens update streams addressed by job id.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, job_id: &JobId) -> Result<Box<dyn FrameStream>, DocentError>;
}
