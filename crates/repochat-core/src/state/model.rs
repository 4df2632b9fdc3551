use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::chat::{Chat, Message};
use crate::error::Result;
use crate::id::RecordId;
use crate::repo::Repository;
use crate::settings::Settings;

/// One independently serialized entry of the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Repositories,
    Chats,
    Messages,
    Settings,
    IsAuthenticated,
    SelectedRepos,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Repositories,
        Slot::Chats,
        Slot::Messages,
        Slot::Settings,
        Slot::IsAuthenticated,
        Slot::SelectedRepos,
    ];

    /// Storage key of the slot.
    pub fn key(self) -> &'static str {
        match self {
            Slot::Repositories => "repositories",
            Slot::Chats => "chats",
            Slot::Messages => "messages",
            Slot::Settings => "settings",
            Slot::IsAuthenticated => "isAuthenticated",
            Slot::SelectedRepos => "selectedRepos",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The whole application state, owned by a single controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub repositories: Vec<Repository>,
    pub chats: Vec<Chat>,
    /// Message log per chat id, in chronological order.
    pub messages: BTreeMap<RecordId, Vec<Message>>,
    pub settings: Settings,
    pub is_authenticated: bool,
    /// Globally selected repository ids, in selection order.
    pub selected_repos: Vec<RecordId>,
}

impl AppState {
    pub fn find_repository(&self, repo_id: RecordId) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.id == repo_id)
    }

    pub fn find_chat(&self, chat_id: RecordId) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    /// Messages of a chat; empty for chats without any message.
    pub fn chat_messages(&self, chat_id: RecordId) -> &[Message] {
        self.messages
            .get(&chat_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn selected_set(&self) -> BTreeSet<RecordId> {
        self.selected_repos.iter().copied().collect()
    }

    /// Largest id of any record in the state, used to resume id generation.
    pub fn max_record_id(&self) -> RecordId {
        let repos = self
            .repositories
            .iter()
            .flat_map(|repo| std::iter::once(repo.id).chain(repo.files.iter().map(|f| f.id)));
        let chats = self.chats.iter().map(|chat| chat.id);
        let messages = self.messages.values().flatten().map(|message| message.id);

        repos.chain(chats).chain(messages).max().unwrap_or(0)
    }

    /// Serializes one slot to its JSON text.
    pub fn slot_json(&self, slot: Slot) -> Result<String> {
        let json = match slot {
            Slot::Repositories => serde_json::to_string(&self.repositories)?,
            Slot::Chats => serde_json::to_string(&self.chats)?,
            Slot::Messages => serde_json::to_string(&self.messages)?,
            Slot::Settings => serde_json::to_string(&self.settings)?,
            Slot::IsAuthenticated => serde_json::to_string(&self.is_authenticated)?,
            Slot::SelectedRepos => serde_json::to_string(&self.selected_repos)?,
        };
        Ok(json)
    }

    /// Replaces one slot with the value parsed from `json`.
    pub fn apply_slot_json(&mut self, slot: Slot, json: &str) -> Result<()> {
        match slot {
            Slot::Repositories => self.repositories = serde_json::from_str(json)?,
            Slot::Chats => self.chats = serde_json::from_str(json)?,
            Slot::Messages => self.messages = serde_json::from_str(json)?,
            Slot::Settings => self.settings = serde_json::from_str(json)?,
            Slot::IsAuthenticated => self.is_authenticated = serde_json::from_str(json)?,
            Slot::SelectedRepos => self.selected_repos = serde_json::from_str(json)?,
        }
        Ok(())
    }
}
