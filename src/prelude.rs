//! Convenience re-exports for common use.

pub use crate::config::DocentConfig;
pub use crate::error::{DocentError, Result};
pub use crate::gate::ScreenshotGate;
pub use crate::job::{JobClient, JobSnapshot};
pub use crate::library::{UploadForm, UploadRecord, UploadStore};
pub use crate::progress::{FinalOutcome, ProgressState};
pub use crate::render::{capture_region, CropRect, DocumentRenderer};
pub use crate::router::MessageRouter;
pub use crate::types::{
    AgentStatus, CapturedRegion, InboundMessage, JobId, ResultType, Transcript, TranscriptEntry,
};
