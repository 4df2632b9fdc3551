//! Truncation and secret redaction of file content.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::repo::RepoFile;

/// Maximum number of content characters a file contributes to the context.
pub const MAX_FRAGMENT_CHARS: usize = 1000;
/// Appended to fragments whose source content was longer than the cap.
pub const TRUNCATION_MARKER: &str = "...";

pub const API_KEY_REPLACEMENT: &str = "[API_KEY]";
pub const HASH_REPLACEMENT: &str = "[HASH]";

static API_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-[a-zA-Z0-9]+").expect("API key pattern is valid"));
static HASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9]{32,}").expect("hash pattern is valid"));

/// Replaces API-key-shaped tokens, then long alphanumeric runs.
///
/// Each pass is a single non-overlapping scan; replaced text is not rescanned.
pub fn redact(text: &str) -> String {
    let without_keys = API_KEY_PATTERN.replace_all(text, API_KEY_REPLACEMENT);
    HASH_PATTERN
        .replace_all(&without_keys, HASH_REPLACEMENT)
        .into_owned()
}

/// Character prefix of at most `max` characters. Not word-aware.
fn char_prefix(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// The context fragment contributed by one file.
///
/// The first [`MAX_FRAGMENT_CHARS`] characters of the content, redacted when the
/// file's kind calls for it, followed by [`TRUNCATION_MARKER`] if anything was cut.
pub fn file_fragment(file: &RepoFile) -> String {
    let prefix = char_prefix(&file.content, MAX_FRAGMENT_CHARS);
    let truncated = prefix.len() < file.content.len();

    let mut fragment = if file.kind().is_redacted() {
        redact(prefix)
    } else {
        prefix.to_string()
    };
    if truncated {
        fragment.push_str(TRUNCATION_MARKER);
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::LEGACY_WORD_PLACEHOLDER;

    fn file(mime_type: &str, content: &str) -> RepoFile {
        RepoFile {
            id: 1,
            name: "f".into(),
            content: content.into(),
            mime_type: mime_type.into(),
            size: content.len() as u64,
            last_modified: String::new(),
        }
    }

    #[test]
    fn test_api_key_is_redacted() {
        assert_eq!(redact("sk-ABCDEF1234567890 hello"), "[API_KEY] hello");
    }

    #[test]
    fn test_long_alphanumeric_run_is_redacted() {
        let hash = "a".repeat(32);
        assert_eq!(redact(&format!("sha {hash} end")), "sha [HASH] end");
        let short = "b".repeat(31);
        assert_eq!(redact(&short), short);
    }

    #[test]
    fn test_key_pattern_applies_before_hash_pattern() {
        let long_key = format!("sk-{}", "X".repeat(40));
        assert_eq!(redact(&long_key), "[API_KEY]");
    }

    #[test]
    fn test_bare_prefix_is_kept() {
        assert_eq!(redact("task- sk- done"), "task- sk- done");
    }

    #[test]
    fn test_short_text_fragment_has_no_marker() {
        let f = file("text/plain", "sk-ABCDEF1234567890 hello");
        assert_eq!(file_fragment(&f), "[API_KEY] hello");
    }

    #[test]
    fn test_long_content_is_cut_and_marked() {
        let content = "word ".repeat(400);
        let fragment = file_fragment(&file("text/plain", &content));

        assert!(fragment.ends_with(TRUNCATION_MARKER));
        let body = fragment.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), MAX_FRAGMENT_CHARS);
    }

    #[test]
    fn test_exactly_max_chars_is_not_marked() {
        let content = "x ".repeat(MAX_FRAGMENT_CHARS / 2);
        assert_eq!(file_fragment(&file("text/plain", &content)), content);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let content = "é".repeat(MAX_FRAGMENT_CHARS + 5);
        let fragment = file_fragment(&file("text/plain", &content));
        assert_eq!(
            fragment.chars().count(),
            MAX_FRAGMENT_CHARS + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn test_unknown_type_passes_through_unredacted() {
        let f = file("application/octet-stream", "sk-ABCDEF1234567890");
        assert_eq!(file_fragment(&f), "sk-ABCDEF1234567890");
    }

    #[test]
    fn test_legacy_word_notice_passes_through() {
        let f = file("application/msword", LEGACY_WORD_PLACEHOLDER);
        assert_eq!(file_fragment(&f), LEGACY_WORD_PLACEHOLDER);
    }

    #[test]
    fn test_pdf_and_docx_content_is_redacted() {
        let hash = "f".repeat(40);
        for mime in [
            "application/pdf",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ] {
            assert_eq!(file_fragment(&file(mime, &hash)), "[HASH]");
        }
    }

    #[test]
    fn test_fragments_never_contain_secret_patterns() {
        let content = format!(
            "{} sk-{} {}",
            "z".repeat(995),
            "k".repeat(20),
            "q".repeat(64)
        );
        let fragment = file_fragment(&file("text/plain", &content));
        assert!(!API_KEY_PATTERN.is_match(&fragment));
        assert!(!HASH_PATTERN.is_match(&fragment));
    }
}
