//! Builds the outbound conversation for a send.
//!
//! A chat is unpinned until its first message; from then on its repository
//! context is pinned to the ids recorded on that first message, and a send
//! with any other selection is rejected.

use std::collections::BTreeSet;

use super::redact::file_fragment;
use crate::chat::{Message, MessageRole};
use crate::error::{ChatError, EMPTY_MESSAGE, NO_REPOSITORY_SELECTED, Result};
use crate::gateway::ChatTurn;
use crate::id::RecordId;
use crate::mime::MimeKind;
use crate::repo::Repository;

/// Number of prior messages forwarded as history.
pub const HISTORY_LIMIT: usize = 5;

/// Fixed instruction opening every outbound conversation.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant analyzing document content. When discussing PDF files, focus on the extracted text content. If the content appears to be binary or encoded, try to interpret any readable text and provide insights based on that. If the content is completely unreadable, acknowledge this and suggest referring to the original document.";

const CONTEXT_HEADER: &str = "Context from selected repositories:\n";
const PDF_NOTE: &str = "This is a PDF document. Here is the extracted text content:\n";

/// Rejects a send whose selection differs from the chat's pinned set.
///
/// Chats without messages are unpinned and accept any selection.
pub fn check_pinned(prior: &[Message], selected: &BTreeSet<RecordId>) -> Result<()> {
    match prior.first() {
        Some(first) if first.repository_set() != *selected => Err(ChatError::ContextLocked),
        _ => Ok(()),
    }
}

/// Preconditions of a send, checked before any state is touched.
pub fn validate_send(prior: &[Message], selected: &BTreeSet<RecordId>, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ChatError::validation(EMPTY_MESSAGE));
    }
    if selected.is_empty() {
        return Err(ChatError::validation(NO_REPOSITORY_SELECTED));
    }
    check_pinned(prior, selected)
}

/// The last [`HISTORY_LIMIT`] messages, oldest first, reduced to role and content.
pub fn recent_history(prior: &[Message]) -> Vec<ChatTurn> {
    let start = prior.len().saturating_sub(HISTORY_LIMIT);
    prior[start..]
        .iter()
        .map(|message| ChatTurn::new(message.role, message.content.clone()))
        .collect()
}

/// Selected repositories in collection order. Unknown ids are skipped.
pub fn resolve_repositories<'a>(
    repositories: &'a [Repository],
    selected: &BTreeSet<RecordId>,
) -> Vec<&'a Repository> {
    repositories
        .iter()
        .filter(|repo| selected.contains(&repo.id))
        .collect()
}

/// Renders the context block prefixed to the outgoing user turn.
pub fn build_context_block(repositories: &[&Repository]) -> String {
    let sections: Vec<String> = repositories
        .iter()
        .map(|repo| {
            let files: Vec<String> = repo
                .files
                .iter()
                .map(|file| {
                    let mut section = format!("File: {} ({})\n", file.name, file.mime_type);
                    if file.kind() == MimeKind::Pdf {
                        section.push_str(PDF_NOTE);
                    }
                    section.push_str("Content:\n");
                    section.push_str(&file_fragment(file));
                    section
                })
                .collect();
            format!("Repository: {}\n{}", repo.name, files.join("\n\n"))
        })
        .collect();

    format!("{CONTEXT_HEADER}{}\n\n", sections.join("\n\n"))
}

/// Composes the full outbound conversation: system instruction, recent history,
/// then the user turn carrying the context block and the new message.
pub fn assemble(
    prior: &[Message],
    repositories: &[Repository],
    selected: &BTreeSet<RecordId>,
    content: &str,
) -> Vec<ChatTurn> {
    let history = recent_history(prior);
    let resolved = resolve_repositories(repositories, selected);
    let context_block = build_context_block(&resolved);

    tracing::debug!(
        history = history.len(),
        repositories = resolved.len(),
        context_chars = context_block.len(),
        "Assembled outbound context"
    );

    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(ChatTurn::new(MessageRole::System, SYSTEM_PROMPT));
    turns.extend(history);
    turns.push(ChatTurn::new(
        MessageRole::User,
        format!("{context_block}{content}"),
    ));
    turns
}
