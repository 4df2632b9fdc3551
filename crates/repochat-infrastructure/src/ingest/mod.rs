//! File ingestion: turns uploaded bytes into a plain-text [`FileDraft`].
//!
//! Each [`MimeKind`] has one extraction strategy. Extraction failures never
//! abort an upload; they degrade to the kind's fixed placeholder text.

mod docx;
mod pdf;
mod text;

use std::path::Path;

use futures::future::join_all;
use repochat_core::repo::FileDraft;
use repochat_core::{MimeKind, Result};

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use text::{LegacyWordExtractor, RawExtractor, TextExtractor};

/// A raw uploaded file with its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk. The MIME type is guessed from the extension
    /// unless `mime_override` is given.
    pub async fn from_path(path: &Path, mime_override: Option<&str>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = match mime_override {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };
        Ok(Self::new(name, mime_type, bytes))
    }
}

/// Why a strategy could not produce text.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
    Docx(String),
    Utf8(std::str::Utf8Error),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Docx(e) => write!(f, "Word document extraction failed: {}", e),
            ExtractError::Utf8(e) => write!(f, "Content is not valid UTF-8: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// A content extraction strategy.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> std::result::Result<String, ExtractError>;
}

/// The strategy responsible for a content kind.
pub fn extractor_for(kind: MimeKind) -> &'static dyn ContentExtractor {
    match kind {
        MimeKind::Pdf => &PdfExtractor,
        MimeKind::WordDocument => &DocxExtractor,
        MimeKind::LegacyWord => &LegacyWordExtractor,
        MimeKind::Text => &TextExtractor,
        MimeKind::Other => &RawExtractor,
    }
}

/// Extracts the text of one upload.
pub fn ingest(upload: &Upload) -> FileDraft {
    let kind = MimeKind::from_mime_type(&upload.mime_type);
    let content = match extractor_for(kind).extract(&upload.bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                file = %upload.name,
                mime_type = %upload.mime_type,
                error = %e,
                "Extraction failed, storing placeholder"
            );
            kind.failure_placeholder(&upload.mime_type)
        }
    };

    FileDraft {
        name: upload.name.clone(),
        content,
        mime_type: upload.mime_type.clone(),
        size: upload.bytes.len() as u64,
    }
}

/// Extracts several uploads concurrently, each on a blocking worker.
///
/// Drafts are returned in input order; each depends only on its own bytes.
pub async fn ingest_all(uploads: Vec<Upload>) -> Vec<FileDraft> {
    let tasks = uploads.into_iter().map(|upload| async move {
        let fallback = (upload.name.clone(), upload.mime_type.clone(), upload.bytes.len());
        match tokio::task::spawn_blocking(move || ingest(&upload)).await {
            Ok(draft) => draft,
            Err(e) => {
                let (name, mime_type, size) = fallback;
                tracing::warn!(file = %name, error = %e, "Extraction worker failed");
                let content = MimeKind::from_mime_type(&mime_type).failure_placeholder(&mime_type);
                FileDraft {
                    name,
                    content,
                    mime_type,
                    size: size as u64,
                }
            }
        }
    });
    join_all(tasks).await
}
