//! Classification of declared MIME types.
//!
//! The declared type of an uploaded file decides two things: how its text is
//! extracted at upload time, and whether that text is redacted before it is
//! sent to the provider.

use std::fmt;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_WORD_MIME: &str = "application/msword";

/// Stored as the content of PDFs that could not be parsed.
pub const PDF_ERROR_PLACEHOLDER: &str = "[Error processing PDF content]";
/// Stored as the content of OOXML documents that could not be parsed.
pub const WORD_ERROR_PLACEHOLDER: &str = "[Error processing Word document content]";
/// Stored as the content of every `.doc` upload; extraction is never attempted.
pub const LEGACY_WORD_PLACEHOLDER: &str =
    "[Old Word document format (.doc) not supported. Please convert to .docx]";

/// Closed set of content kinds, keyed by declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeKind {
    /// `application/pdf`
    Pdf,
    /// OOXML word-processing document (`.docx`)
    WordDocument,
    /// Legacy binary Word format (`.doc`)
    LegacyWord,
    /// `text/*`, `application/json`, `application/javascript`, `application/xml`
    Text,
    /// Anything else
    Other,
}

impl MimeKind {
    /// Classifies a declared MIME type. Matching is exact, as declared by the uploader.
    pub fn from_mime_type(mime: &str) -> Self {
        match mime {
            PDF_MIME => Self::Pdf,
            DOCX_MIME => Self::WordDocument,
            LEGACY_WORD_MIME => Self::LegacyWord,
            "application/json" | "application/javascript" | "application/xml" => Self::Text,
            m if m.starts_with("text/") => Self::Text,
            _ => Self::Other,
        }
    }

    /// Whether extracted content of this kind goes through secret redaction.
    ///
    /// The fixed `.doc` notice and raw content of unrecognized types pass through.
    pub fn is_redacted(self) -> bool {
        matches!(self, Self::Pdf | Self::WordDocument | Self::Text)
    }

    /// Content stored when extraction for this kind fails.
    pub fn failure_placeholder(self, mime: &str) -> String {
        match self {
            Self::Pdf => PDF_ERROR_PLACEHOLDER.to_string(),
            Self::WordDocument => WORD_ERROR_PLACEHOLDER.to_string(),
            Self::LegacyWord => LEGACY_WORD_PLACEHOLDER.to_string(),
            Self::Text | Self::Other => format!("[Error processing {mime} content]"),
        }
    }
}

impl fmt::Display for MimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::WordDocument => write!(f, "word_document"),
            Self::LegacyWord => write!(f, "legacy_word"),
            Self::Text => write!(f, "text"),
            Self::Other => write!(f, "other"),
        }
    }
}
