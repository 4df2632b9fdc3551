//! Pure state transitions.
//!
//! Every mutating operation takes the current state by reference and returns a
//! new snapshot together with the slots it touched. Ids and timestamps are
//! supplied by the caller, so transitions are deterministic.

use super::model::{AppState, Slot};
use crate::chat::{Chat, DEFAULT_CHAT_NAME, Message};
use crate::error::{ChatError, Result};
use crate::id::RecordId;
use crate::repo::{FileDraft, RepoFile, Repository};
use crate::settings::SettingsPatch;

/// A new state snapshot and the slots that differ from the previous one.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: AppState,
    pub touched: &'static [Slot],
}

impl Transition {
    fn new(state: AppState, touched: &'static [Slot]) -> Self {
        Self { state, touched }
    }
}

pub fn create_repository(state: &AppState, id: RecordId, name: &str) -> Result<Transition> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ChatError::validation("Repository name cannot be empty"));
    }

    let mut next = state.clone();
    next.repositories.push(Repository::new(id, name));
    Ok(Transition::new(next, &[Slot::Repositories]))
}

/// Removes a repository and purges its id from the selection.
pub fn delete_repository(state: &AppState, repo_id: RecordId) -> Result<Transition> {
    if state.find_repository(repo_id).is_none() {
        return Err(ChatError::not_found("repository", repo_id));
    }

    let mut next = state.clone();
    next.repositories.retain(|repo| repo.id != repo_id);
    next.selected_repos.retain(|&id| id != repo_id);
    Ok(Transition::new(
        next,
        &[Slot::Repositories, Slot::SelectedRepos],
    ))
}

pub fn add_file(
    state: &AppState,
    repo_id: RecordId,
    file_id: RecordId,
    draft: FileDraft,
    now: &str,
) -> Result<Transition> {
    add_files(state, repo_id, vec![(file_id, draft)], now)
}

/// Appends every draft to one repository in order, or nothing if it is gone.
pub fn add_files(
    state: &AppState,
    repo_id: RecordId,
    files: Vec<(RecordId, FileDraft)>,
    now: &str,
) -> Result<Transition> {
    let mut next = state.clone();
    let repo = next
        .repositories
        .iter_mut()
        .find(|repo| repo.id == repo_id)
        .ok_or_else(|| ChatError::not_found("repository", repo_id))?;

    repo.files.extend(files.into_iter().map(|(file_id, draft)| RepoFile {
        id: file_id,
        name: draft.name,
        content: draft.content,
        mime_type: draft.mime_type,
        size: draft.size,
        last_modified: now.to_string(),
    }));
    Ok(Transition::new(next, &[Slot::Repositories]))
}

pub fn delete_file(state: &AppState, repo_id: RecordId, file_id: RecordId) -> Result<Transition> {
    let mut next = state.clone();
    let repo = next
        .repositories
        .iter_mut()
        .find(|repo| repo.id == repo_id)
        .ok_or_else(|| ChatError::not_found("repository", repo_id))?;

    let before = repo.files.len();
    repo.files.retain(|file| file.id != file_id);
    if repo.files.len() == before {
        return Err(ChatError::not_found("file", file_id));
    }
    Ok(Transition::new(next, &[Slot::Repositories]))
}

/// Adds the id to the selection if absent, removes it otherwise.
pub fn toggle_repository_selection(state: &AppState, repo_id: RecordId) -> Result<Transition> {
    let mut next = state.clone();
    if next.selected_repos.contains(&repo_id) {
        next.selected_repos.retain(|&id| id != repo_id);
    } else {
        if state.find_repository(repo_id).is_none() {
            return Err(ChatError::not_found("repository", repo_id));
        }
        next.selected_repos.push(repo_id);
    }
    Ok(Transition::new(next, &[Slot::SelectedRepos]))
}

/// Creates a chat named "New Chat" with an empty message log.
pub fn create_chat(state: &AppState, id: RecordId, now: &str) -> Transition {
    let mut next = state.clone();
    next.chats.push(Chat {
        id,
        name: DEFAULT_CHAT_NAME.to_string(),
        timestamp: now.to_string(),
    });
    next.messages.insert(id, Vec::new());
    Transition::new(next, &[Slot::Chats, Slot::Messages])
}

pub fn append_message(state: &AppState, chat_id: RecordId, message: Message) -> Transition {
    let mut next = state.clone();
    next.messages.entry(chat_id).or_default().push(message);
    Transition::new(next, &[Slot::Messages])
}

pub fn update_settings(state: &AppState, patch: SettingsPatch) -> Transition {
    let mut next = state.clone();
    next.settings = state.settings.merged(patch);
    Transition::new(next, &[Slot::Settings])
}

pub fn set_authenticated(state: &AppState, authenticated: bool) -> Transition {
    let mut next = state.clone();
    next.is_authenticated = authenticated;
    Transition::new(next, &[Slot::IsAuthenticated])
}
