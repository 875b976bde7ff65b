//! Captured screenshot regions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::DocentError;

/// A user-selected rectangle of rendered document content, encoded as an
/// image data URL (`data:image/png;base64,...`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturedRegion {
    data_url: String,
}

impl CapturedRegion {
    /// Encode raw PNG bytes as a region.
    pub fn from_png(png: &[u8]) -> Result<Self, DocentError> {
        if png.is_empty() {
            return Err(DocentError::Validation("Captured image is empty.".into()));
        }
        Ok(Self {
            data_url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
        })
    }

    /// Accept an existing base64 image data URL.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self, DocentError> {
        let data_url = data_url.into();
        let (mime, payload) = split_data_url(&data_url)
            .ok_or_else(|| DocentError::Validation("Region is not a base64 data URL.".into()))?;
        if !mime.starts_with("image/") {
            return Err(DocentError::Validation(format!(
                "Region must be an image, got `{mime}`."
            )));
        }
        if payload.is_empty() {
            return Err(DocentError::Validation("Captured image is empty.".into()));
        }
        Ok(Self { data_url })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// MIME type declared by the data URL.
    pub fn mime_type(&self) -> &str {
        split_data_url(&self.data_url)
            .map(|(mime, _)| mime)
            .unwrap_or_default()
    }

    /// Decode the image bytes back out of the data URL.
    pub fn decode(&self) -> Result<Vec<u8>, DocentError> {
        let (_, payload) = split_data_url(&self.data_url)
            .ok_or_else(|| DocentError::Validation("Region is not a base64 data URL.".into()))?;
        STANDARD
            .decode(payload)
            .map_err(|error| DocentError::Validation(format!("Region payload is not base64: {error}")))
    }
}

// Data URLs run to megabytes; only show the head.
impl std::fmt::Debug for CapturedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let head: String = self.data_url.chars().take(48).collect();
        f.debug_struct("CapturedRegion")
            .field("data_url", &format_args!("{head}..."))
            .field("len", &self.data_url.len())
            .finish()
    }
}

fn split_data_url(data_url: &str) -> Option<(&str, &str)> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, payload))
}
