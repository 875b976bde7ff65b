//! Uploaded document library: records, the upload form, and storage.

mod store;

pub use store::{FileUploadStore, MemoryUploadStore, UploadStore, UploadStoreConfig};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bon::Builder;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::DocentError;

pub const TOPIC_REQUIRED_MESSAGE: &str = "Topic is required.";

const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// One author line on the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub surname: String,
}

impl Author {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.surname.trim().is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

/// A stored upload. `uploaded_at` (epoch millis) doubles as its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub year: String,
    pub topic: String,
    pub file_name: String,
    /// The document as a `data:application/pdf;base64,` URL.
    pub pdf_data: Option<String>,
    pub uploaded_at: i64,
}

impl UploadRecord {
    /// Decoded document bytes, if any were stored.
    pub fn pdf_bytes(&self) -> Result<Option<Vec<u8>>, DocentError> {
        let Some(data) = self.pdf_data.as_deref() else {
            return Ok(None);
        };
        let payload = data.strip_prefix(PDF_DATA_URL_PREFIX).ok_or_else(|| {
            DocentError::Validation(format!(
                "Upload {} does not hold a PDF data URL",
                self.uploaded_at
            ))
        })?;
        STANDARD
            .decode(payload)
            .map(Some)
            .map_err(|e| DocentError::Validation(format!("Upload {} is corrupt: {e}", self.uploaded_at)))
    }

    /// Case-insensitive match against title, topic, and author names.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.topic.to_lowercase().contains(&needle)
            || self
                .authors
                .iter()
                .any(|author| author.full_name().to_lowercase().contains(&needle))
    }
}

/// Details entered when uploading a document.
///
/// # Example
/// ```
/// use docent::library::{Author, UploadForm};
///
/// let form = UploadForm::builder()
///     .topic("Linear algebra")
///     .authors(vec![Author::new("Gilbert", "Strang")])
///     .build();
/// let record = form.into_record("strang.pdf", b"%PDF-1.7", 1_700_000_000_000)?;
/// assert_eq!(record.title, "strang");
/// # Ok::<(), docent::error::DocentError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct UploadForm {
    #[builder(into)]
    pub title: Option<String>,
    #[builder(default)]
    pub authors: Vec<Author>,
    #[builder(into)]
    pub publisher: Option<String>,
    #[builder(into)]
    pub year: Option<String>,
    #[builder(into)]
    pub topic: String,
}

impl UploadForm {
    /// Validate the form and attach the document.
    ///
    /// The topic is required. A blank title falls back to the file name
    /// without its `.pdf` suffix; authors with neither name nor surname are
    /// dropped.
    pub fn into_record(
        self,
        file_name: &str,
        pdf: &[u8],
        uploaded_at: i64,
    ) -> Result<UploadRecord, DocentError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(DocentError::Validation(TOPIC_REQUIRED_MESSAGE.into()));
        }

        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => default_title(file_name),
        };

        Ok(UploadRecord {
            title,
            authors: self
                .authors
                .into_iter()
                .filter(|author| !author.is_blank())
                .collect(),
            publisher: self.publisher.unwrap_or_default().trim().to_string(),
            year: self.year.unwrap_or_default().trim().to_string(),
            topic: topic.to_string(),
            file_name: file_name.to_string(),
            pdf_data: Some(format!("{PDF_DATA_URL_PREFIX}{}", STANDARD.encode(pdf))),
            uploaded_at,
        })
    }

    /// [`UploadForm::into_record`] stamped with the current time.
    pub fn into_record_now(self, file_name: &str, pdf: &[u8]) -> Result<UploadRecord, DocentError> {
        self.into_record(file_name, pdf, Utc::now().timestamp_millis())
    }
}

/// Title suggested for a file: its name minus a case-insensitive `.pdf`.
pub fn default_title(file_name: &str) -> String {
    let len = file_name.len();
    if len >= 4 && file_name.is_char_boundary(len - 4) && file_name[len - 4..].eq_ignore_ascii_case(".pdf") {
        file_name[..len - 4].to_string()
    } else {
        file_name.to_string()
    }
}

/// Records matching `query`, in stored order.
pub fn search<'a>(records: &'a [UploadRecord], query: &str) -> Vec<&'a UploadRecord> {
    records.iter().filter(|record| record.matches(query)).collect()
}
