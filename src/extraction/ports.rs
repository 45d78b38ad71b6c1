//! Extraction port.

use async_trait::async_trait;
use std::string::FromUtf8Error;
use thiserror::Error;

/// A file received with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Returns the lowercase file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Reasons extraction can fail.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No extractor handles this file type.
    #[error("unsupported document type for {file_name}")]
    UnsupportedFormat {
        /// Client-supplied file name.
        file_name: String,
    },
    /// The bytes are not valid text in the expected encoding.
    #[error("{file_name} is not valid UTF-8: {source}")]
    InvalidEncoding {
        /// Client-supplied file name.
        file_name: String,
        /// Decoder error.
        #[source]
        source: FromUtf8Error,
    },
}

/// Turns an uploaded file into text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts text from `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] when the format is unsupported or the
    /// content cannot be decoded.
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}
