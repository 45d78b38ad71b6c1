//! Best-effort document text extraction.
//!
//! Extraction never blocks a submission: any failure is logged and the task
//! proceeds without document text.

mod plain_text;
mod ports;

pub use plain_text::PlainTextExtractor;
pub use ports::{DocumentExtractor, ExtractionError, UploadedDocument};

use tracing::{info, warn};

/// Runs `extractor` and maps every failure, and whitespace-only output, to
/// `None`.
pub async fn extract_best_effort(
    extractor: &dyn DocumentExtractor,
    document: &UploadedDocument,
) -> Option<String> {
    match extractor.extract(document).await {
        Ok(text) if text.trim().is_empty() => {
            warn!(file_name = %document.file_name, "extraction produced no text");
            None
        }
        Ok(text) => {
            info!(
                file_name = %document.file_name,
                chars = text.chars().count(),
                "document text extracted"
            );
            Some(text)
        }
        Err(err) => {
            warn!(file_name = %document.file_name, error = %err, "document extraction failed");
            None
        }
    }
}
