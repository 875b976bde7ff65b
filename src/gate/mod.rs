//! Entry guard for starting a job.

use crate::error::DocentError;
use crate::types::CapturedRegion;

pub const NO_REGION_MESSAGE: &str = "No screenshot captured to process.";
pub const EMPTY_PROMPT_MESSAGE: &str = "Enter a prompt describing what to explain.";

/// Checks the preconditions a job needs before any network action.
pub struct ScreenshotGate;

impl ScreenshotGate {
    /// Whether a region has been captured.
    pub fn can_start(region: Option<&CapturedRegion>) -> bool {
        region.is_some()
    }

    /// Validate a start request, returning the region and the trimmed prompt.
    ///
    /// Failures are user-facing validation errors, never panics.
    pub fn check<'r, 'p>(
        region: Option<&'r CapturedRegion>,
        prompt: &'p str,
    ) -> Result<(&'r CapturedRegion, &'p str), DocentError> {
        let region = region.ok_or_else(|| DocentError::Validation(NO_REGION_MESSAGE.into()))?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DocentError::Validation(EMPTY_PROMPT_MESSAGE.into()));
        }
        Ok((region, prompt))
    }
}
