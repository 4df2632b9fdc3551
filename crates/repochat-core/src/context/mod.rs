//! Context assembly: turns selected repositories and chat history into the
//! outbound conversation.

pub mod assembler;
pub mod redact;

pub use assembler::{
    HISTORY_LIMIT, SYSTEM_PROMPT, assemble, build_context_block, check_pinned, recent_history,
    resolve_repositories, validate_send,
};
pub use redact::{MAX_FRAGMENT_CHARS, TRUNCATION_MARKER, file_fragment, redact};
