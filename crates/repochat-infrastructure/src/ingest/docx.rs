//! OOXML word-processing document extraction.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::{ContentExtractor, ExtractError};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts raw paragraph text from the main document part.
///
/// Paragraphs are separated by a blank line; tabs and line breaks inside a
/// paragraph are kept.
pub struct DocxExtractor;

impl ContentExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(docx_error)?;
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .map_err(docx_error)?
            .read_to_string(&mut xml)
            .map_err(docx_error)?;

        paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n\n"))
    }
}

fn docx_error(err: impl std::fmt::Display) -> ExtractError {
    ExtractError::Docx(err.to_string())
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(docx_error)? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" | b"cr" => current.push('\n'),
                b"p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Text(text) if in_text => {
                current.push_str(&text.decode().map_err(docx_error)?);
            }
            Event::GeneralRef(reference) if in_text => {
                if let Some(ch) = reference.resolve_char_ref().map_err(docx_error)? {
                    current.push(ch);
                } else {
                    let name = reference.decode().map_err(docx_error)?;
                    if let Some(text) = resolve_predefined_entity(&name) {
                        current.push_str(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
