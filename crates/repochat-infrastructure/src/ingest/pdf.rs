//! PDF text extraction.

use lopdf::Document;

use super::{ContentExtractor, ExtractError};

/// Extracts text page by page.
///
/// Text fragments within a page are joined with single spaces; pages are
/// separated by newlines.
pub struct PdfExtractor;

impl ContentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let document = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let raw = document
                .extract_text(&[*page_number])
                .map_err(|e| ExtractError::Pdf(format!("page {page_number}: {e}")))?;
            pages.push(join_fragments(&raw));
        }
        Ok(pages.join("\n"))
    }
}

fn join_fragments(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
