//! Plain-text, legacy Word and fallback extraction.

use repochat_core::mime::LEGACY_WORD_PLACEHOLDER;

use super::{ContentExtractor, ExtractError};

/// Decodes text-like uploads. Invalid sequences become U+FFFD, as a browser would.
pub struct TextExtractor;

impl ContentExtractor for TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// `.doc` files are never parsed; the content is a fixed notice.
pub struct LegacyWordExtractor;

impl ContentExtractor for LegacyWordExtractor {
    fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
        Ok(LEGACY_WORD_PLACEHOLDER.to_string())
    }
}

/// Unrecognized types: kept only if the bytes are valid UTF-8.
pub struct RawExtractor;

impl ContentExtractor for RawExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(ExtractError::Utf8)
    }
}
