//! Extractor for UTF-8 text formats.

use super::ports::{DocumentExtractor, ExtractionError, UploadedDocument};
use async_trait::async_trait;

const TEXT_EXTENSIONS: [&str; 6] = ["txt", "md", "markdown", "csv", "json", "log"];

/// Decodes text files as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    fn handles(document: &UploadedDocument) -> bool {
        let by_type = document.content_type.as_deref().is_some_and(|content_type| {
            let essence = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            essence.starts_with("text/") || essence == "application/json"
        });
        let by_extension = document
            .extension()
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()));
        by_type || by_extension
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        if !Self::handles(document) {
            return Err(ExtractionError::UnsupportedFormat {
                file_name: document.file_name.clone(),
            });
        }
        String::from_utf8(document.bytes.clone()).map_err(|source| {
            ExtractionError::InvalidEncoding {
                file_name: document.file_name.clone(),
                source,
            }
        })
    }
}
