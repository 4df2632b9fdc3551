//! Chat controller implementation.
//!
//! `ChatController` is the single owner of [`AppState`]. Every intent locks the
//! state, runs a pure transition, persists the slots the transition touched and
//! swaps in the new snapshot. The only await point inside an intent that holds
//! no lock is the gateway call of [`ChatController::send_message`] (and file
//! extraction in [`ChatController::upload_files`]).

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use repochat_core::chat::{Chat, Message, MessageRole};
use repochat_core::context;
use repochat_core::error::MISSING_API_KEY;
use repochat_core::gateway::{ChatGateway, CompletionRequest};
use repochat_core::repo::{FileDraft, RepoFile, Repository};
use repochat_core::settings::{self, Settings, SettingsPatch};
use repochat_core::state::{AppState, StateStore, Transition, load_state, persist_slots, transition};
use repochat_core::{ChatError, IdGenerator, RecordId, Result};
use repochat_infrastructure::{Upload, ingest_all};

/// Coordinates repositories, chats and the outbound gateway.
///
/// # Thread Safety
///
/// State lives behind a `tokio::sync::Mutex`. A send releases the lock while
/// the provider call is in flight, so other intents (including a second send)
/// interleave only at that point.
pub struct ChatController {
    store: Arc<dyn StateStore>,
    gateway: Arc<dyn ChatGateway>,
    ids: IdGenerator,
    state: Mutex<AppState>,
    /// Whether a missing settings key falls back to the provider's env var.
    env_api_key: bool,
}

impl ChatController {
    /// Loads every persisted slot and resumes id generation after the
    /// largest id found.
    pub fn load(store: Arc<dyn StateStore>, gateway: Arc<dyn ChatGateway>) -> Result<Self> {
        let state = load_state(store.as_ref())?;
        let ids = IdGenerator::resume_after(state.max_record_id());
        tracing::info!(
            repositories = state.repositories.len(),
            chats = state.chats.len(),
            "Loaded application state"
        );

        Ok(Self {
            store,
            gateway,
            ids,
            state: Mutex::new(state),
            env_api_key: true,
        })
    }

    /// Only the key stored in settings is used; environment variables are ignored.
    pub fn without_env_api_key(mut self) -> Self {
        self.env_api_key = false;
        self
    }

    /// A copy of the whole current state.
    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    // ------------------------------------------------------------------
    // Repositories and files
    // ------------------------------------------------------------------

    pub async fn create_repository(&self, name: &str) -> Result<Repository> {
        let mut state = self.state.lock().await;
        let id = self.ids.next_id();
        let transition = transition::create_repository(&state, id, name)?;
        self.commit(&mut state, transition)?;

        tracing::info!(repository_id = id, "Created repository");
        state
            .find_repository(id)
            .cloned()
            .ok_or_else(|| ChatError::internal("created repository is missing"))
    }

    /// Deletes a repository; its id is also dropped from the selection.
    pub async fn delete_repository(&self, repo_id: RecordId) -> Result<()> {
        let mut state = self.state.lock().await;
        let transition = transition::delete_repository(&state, repo_id)?;
        self.commit(&mut state, transition)?;
        tracing::info!(repository_id = repo_id, "Deleted repository");
        Ok(())
    }

    pub async fn list_repositories(&self) -> Vec<Repository> {
        self.state.lock().await.repositories.clone()
    }

    pub async fn add_file(&self, repo_id: RecordId, draft: FileDraft) -> Result<RepoFile> {
        let mut state = self.state.lock().await;
        self.add_file_locked(&mut state, repo_id, draft)
    }

    /// Extracts every upload concurrently, then adds the drafts in input order.
    ///
    /// Extraction failures are stored as placeholder content, so only an
    /// unknown repository fails the call.
    pub async fn upload_files(&self, repo_id: RecordId, uploads: Vec<Upload>) -> Result<Vec<RepoFile>> {
        if self.state.lock().await.find_repository(repo_id).is_none() {
            return Err(ChatError::not_found("repository", repo_id));
        }

        let drafts = ingest_all(uploads).await;
        self.add_drafts(repo_id, drafts).await
    }

    /// Commits extracted drafts in one transition. The repository may have been
    /// deleted while the lock was released; in that case nothing is added.
    async fn add_drafts(&self, repo_id: RecordId, drafts: Vec<FileDraft>) -> Result<Vec<RepoFile>> {
        let mut state = self.state.lock().await;
        let files: Vec<(RecordId, FileDraft)> = drafts
            .into_iter()
            .map(|draft| (self.ids.next_id(), draft))
            .collect();
        let file_ids: Vec<RecordId> = files.iter().map(|(id, _)| *id).collect();

        let transition = transition::add_files(&state, repo_id, files, &now())?;
        self.commit(&mut state, transition)?;

        let repo = state
            .find_repository(repo_id)
            .ok_or_else(|| ChatError::internal("repository vanished after commit"))?;
        let added = file_ids
            .iter()
            .map(|file_id| {
                repo.find_file(*file_id)
                    .cloned()
                    .ok_or_else(|| ChatError::internal("added file is missing"))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(repository_id = repo_id, files = added.len(), "Added uploaded files");
        Ok(added)
    }

    pub async fn delete_file(&self, repo_id: RecordId, file_id: RecordId) -> Result<()> {
        let mut state = self.state.lock().await;
        let transition = transition::delete_file(&state, repo_id, file_id)?;
        self.commit(&mut state, transition)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Flips the selection of a repository and returns whether it is now selected.
    pub async fn toggle_repository_selection(&self, repo_id: RecordId) -> Result<bool> {
        let mut state = self.state.lock().await;
        let transition = transition::toggle_repository_selection(&state, repo_id)?;
        self.commit(&mut state, transition)?;
        Ok(state.selected_repos.contains(&repo_id))
    }

    pub async fn selected_repositories(&self) -> Vec<RecordId> {
        self.state.lock().await.selected_repos.clone()
    }

    // ------------------------------------------------------------------
    // Chats
    // ------------------------------------------------------------------

    pub async fn create_chat(&self) -> Result<Chat> {
        let mut state = self.state.lock().await;
        let id = self.ids.next_id();
        let transition = transition::create_chat(&state, id, &now());
        self.commit(&mut state, transition)?;

        tracing::info!(chat_id = id, "Created chat");
        state
            .find_chat(id)
            .cloned()
            .ok_or_else(|| ChatError::internal("created chat is missing"))
    }

    pub async fn list_chats(&self) -> Vec<Chat> {
        self.state.lock().await.chats.clone()
    }

    pub async fn messages(&self, chat_id: RecordId) -> Result<Vec<Message>> {
        let state = self.state.lock().await;
        if state.find_chat(chat_id).is_none() {
            return Err(ChatError::not_found("chat", chat_id));
        }
        Ok(state.chat_messages(chat_id).to_vec())
    }

    /// Sends a user message and records the assistant's reply.
    ///
    /// Validation, the pin check and the API key lookup all happen before
    /// anything is written. Once the user message is recorded it stays, even
    /// when the provider call fails.
    pub async fn send_message(&self, chat_id: RecordId, content: &str) -> Result<Message> {
        let content = content.trim();

        let (request, repositories) = {
            let mut state = self.state.lock().await;
            if state.find_chat(chat_id).is_none() {
                return Err(ChatError::not_found("chat", chat_id));
            }

            let prior = state.chat_messages(chat_id).to_vec();
            let selected = state.selected_set();
            context::validate_send(&prior, &selected, content)?;
            let api_key = self.resolve_api_key(&state.settings)?;

            let repositories = state.selected_repos.clone();
            let user_message = Message {
                id: self.ids.next_id(),
                role: MessageRole::User,
                content: content.to_string(),
                timestamp: now(),
                repositories: repositories.clone(),
            };
            let turns = context::assemble(&prior, &state.repositories, &selected, content);

            let transition = transition::append_message(&state, chat_id, user_message);
            self.commit(&mut state, transition)?;

            let request = CompletionRequest {
                provider: state.settings.ai_provider,
                api_key,
                messages: turns,
            };
            (request, repositories)
        };

        tracing::info!(
            chat_id,
            provider = %request.provider,
            turns = request.messages.len(),
            "Sending message"
        );
        let reply = self.gateway.complete(&request).await.inspect_err(|e| {
            tracing::warn!(chat_id, error = %e, "Completion failed");
        })?;

        let mut state = self.state.lock().await;
        let assistant = Message {
            id: self.ids.next_id(),
            role: MessageRole::Assistant,
            content: reply,
            timestamp: now(),
            repositories,
        };
        let transition = transition::append_message(&state, chat_id, assistant.clone());
        self.commit(&mut state, transition)?;
        Ok(assistant)
    }

    // ------------------------------------------------------------------
    // Settings and authentication
    // ------------------------------------------------------------------

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut state = self.state.lock().await;
        let transition = transition::update_settings(&state, patch);
        self.commit(&mut state, transition)?;
        tracing::info!(provider = %state.settings.ai_provider, "Updated settings");
        Ok(state.settings.clone())
    }

    /// Advisory API key format check (`sk-` prefix, at least 20 characters).
    pub fn validate_api_key(key: &str) -> Result<()> {
        settings::validate_api_key(key)
    }

    /// Marks the session as logged in. Credentials are not checked.
    pub async fn login(&self, email: &str, _password: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let transition = transition::set_authenticated(&state, true);
        self.commit(&mut state, transition)?;
        tracing::info!(email, "Logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let transition = transition::set_authenticated(&state, false);
        self.commit(&mut state, transition)?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_authenticated
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Persists the touched slots, then replaces the in-memory snapshot.
    ///
    /// On a store failure the previous snapshot is kept.
    fn commit(&self, state: &mut AppState, transition: Transition) -> Result<()> {
        persist_slots(self.store.as_ref(), &transition.state, transition.touched)?;
        *state = transition.state;
        Ok(())
    }

    fn add_file_locked(
        &self,
        state: &mut AppState,
        repo_id: RecordId,
        draft: FileDraft,
    ) -> Result<RepoFile> {
        let file_id = self.ids.next_id();
        let transition = transition::add_file(state, repo_id, file_id, draft, &now())?;
        self.commit(state, transition)?;

        let file = state
            .find_repository(repo_id)
            .and_then(|repo| repo.find_file(file_id))
            .cloned()
            .ok_or_else(|| ChatError::internal("added file is missing"))?;
        tracing::info!(
            repository_id = repo_id,
            file_id,
            name = %file.name,
            size = file.size,
            "Added file"
        );
        Ok(file)
    }

    fn resolve_api_key(&self, settings: &Settings) -> Result<String> {
        if !settings.api_key.trim().is_empty() {
            return Ok(settings.api_key.clone());
        }
        if self.env_api_key {
            let var = settings.ai_provider.api_key_env_var();
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    tracing::debug!(var, "Using API key from environment");
                    return Ok(key);
                }
            }
        }
        Err(ChatError::validation(MISSING_API_KEY))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repochat_core::settings::AiProvider;
    use repochat_core::state::Slot;
    use repochat_infrastructure::MemoryStateStore;
    use std::sync::Mutex as StdMutex;

    struct MockGateway {
        reply: Result<String>,
        requests: StdMutex<Vec<CompletionRequest>>,
    }

    impl MockGateway {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn failing(error: ChatError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn controller(gateway: Arc<MockGateway>) -> (ChatController, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let controller = ChatController::load(store.clone(), gateway)
            .unwrap()
            .without_env_api_key();
        (controller, store)
    }

    async fn ready(controller: &ChatController) -> (Repository, Chat) {
        controller
            .update_settings(SettingsPatch {
                ai_provider: None,
                api_key: Some("sk-abcdefghijklmnopqrstuvwx".into()),
            })
            .await
            .unwrap();
        let repo = controller.create_repository("Docs").await.unwrap();
        controller
            .add_file(
                repo.id,
                FileDraft {
                    name: "a.txt".into(),
                    content: "alpha".into(),
                    mime_type: "text/plain".into(),
                    size: 5,
                },
            )
            .await
            .unwrap();
        controller.toggle_repository_selection(repo.id).await.unwrap();
        let chat = controller.create_chat().await.unwrap();
        (repo, chat)
    }

    #[tokio::test]
    async fn test_send_records_both_messages() {
        let gateway = MockGateway::replying("Hello!");
        let (controller, _) = controller(gateway.clone());
        let (repo, chat) = ready(&controller).await;

        let reply = controller.send_message(chat.id, "  hi  ").await.unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "Hello!");
        assert_eq!(reply.repositories, vec![repo.id]);

        let messages = controller.messages(chat.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[0].repositories, vec![repo.id]);
        assert!(messages[0].id < messages[1].id);

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].provider, AiProvider::OpenAI);
        assert_eq!(requests[0].api_key, "sk-abcdefghijklmnopqrstuvwx");
        let last = requests[0].messages.last().unwrap();
        assert!(last.content.starts_with("Context from selected repositories:\n"));
        assert!(last.content.ends_with("alpha\n\nhi"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_validation_error() {
        let gateway = MockGateway::replying("unused");
        let (controller, _) = controller(gateway.clone());
        let repo = controller.create_repository("Docs").await.unwrap();
        controller.toggle_repository_selection(repo.id).await.unwrap();
        let chat = controller.create_chat().await.unwrap();

        let err = controller.send_message(chat.id, "hi").await.unwrap_err();
        assert_eq!(err, ChatError::validation(MISSING_API_KEY));
        assert!(controller.messages(chat.id).await.unwrap().is_empty());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_chat_is_not_found() {
        let (controller, _) = controller(MockGateway::replying("unused"));
        let err = controller.send_message(42, "hi").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(controller.messages(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_user_message() {
        let gateway = MockGateway::failing(ChatError::provider("rate limited"));
        let (controller, _) = controller(gateway);
        let (_, chat) = ready(&controller).await;

        let err = controller.send_message(chat.id, "hi").await.unwrap_err();
        assert_eq!(err, ChatError::provider("rate limited"));

        let messages = controller.messages(chat.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let (controller, store) = controller(MockGateway::replying("ok"));
        let (repo, chat) = ready(&controller).await;
        controller.login("a@b.c", "secret").await.unwrap();

        let reloaded = ChatController::load(store.clone(), MockGateway::replying("ok")).unwrap();
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.repositories.len(), 1);
        assert_eq!(snapshot.repositories[0].files.len(), 1);
        assert_eq!(snapshot.selected_repos, vec![repo.id]);
        assert_eq!(snapshot.chats[0].id, chat.id);
        assert!(snapshot.is_authenticated);
        assert_eq!(store.len(), Slot::ALL.len());

        let next = reloaded.create_repository("More").await.unwrap();
        assert!(next.id > snapshot.max_record_id());
    }

    #[tokio::test]
    async fn test_login_logout() {
        let (controller, _) = controller(MockGateway::replying("ok"));
        assert!(!controller.is_authenticated().await);

        controller.login("anyone@example.com", "").await.unwrap();
        assert!(controller.is_authenticated().await);

        controller.logout().await.unwrap();
        assert!(!controller.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_upload_files_keeps_input_order() {
        let (controller, _) = controller(MockGateway::replying("ok"));
        let repo = controller.create_repository("Docs").await.unwrap();

        let added = controller
            .upload_files(
                repo.id,
                vec![
                    Upload::new("one.txt", "text/plain", b"1".to_vec()),
                    Upload::new("two.pdf", "application/pdf", b"not a pdf".to_vec()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].name, "one.txt");
        assert_eq!(added[1].content, "[Error processing PDF content]");

        let repos = controller.list_repositories().await;
        let names: Vec<&str> = repos[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["one.txt", "two.pdf"]);
    }

    #[tokio::test]
    async fn test_upload_to_unknown_repository() {
        let (controller, _) = controller(MockGateway::replying("ok"));
        let err = controller
            .upload_files(7, vec![Upload::new("a.txt", "text/plain", b"a".to_vec())])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_drafts_for_deleted_repository_add_nothing() {
        let (controller, store) = controller(MockGateway::replying("ok"));
        let repo = controller.create_repository("Docs").await.unwrap();
        let keep = controller.create_repository("Keep").await.unwrap();
        let drafts = ingest_all(vec![
            Upload::new("one.txt", "text/plain", b"1".to_vec()),
            Upload::new("two.txt", "text/plain", b"2".to_vec()),
        ])
        .await;

        // Deleted between extraction and commit.
        controller.delete_repository(repo.id).await.unwrap();
        let err = controller.add_drafts(repo.id, drafts).await.unwrap_err();
        assert!(err.is_not_found());

        let repos = controller.list_repositories().await;
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].id, keep.id);
        assert!(repos[0].files.is_empty());

        let reloaded = ChatController::load(store, MockGateway::replying("ok")).unwrap();
        let snapshot = reloaded.snapshot().await;
        assert!(snapshot.repositories.iter().all(|repo| repo.files.is_empty()));
    }

    #[tokio::test]
    async fn test_delete_file_and_unknown_ids() {
        let (controller, _) = controller(MockGateway::replying("ok"));
        let (repo, _) = ready(&controller).await;
        let file_id = controller.list_repositories().await[0].files[0].id;

        controller.delete_file(repo.id, file_id).await.unwrap();
        assert!(controller.list_repositories().await[0].files.is_empty());

        assert!(controller.delete_file(repo.id, file_id).await.unwrap_err().is_not_found());
        assert!(controller.delete_repository(1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_settings_merges() {
        let (controller, _) = controller(MockGateway::replying("ok"));
        controller
            .update_settings(SettingsPatch {
                ai_provider: Some(AiProvider::Anthropic),
                api_key: None,
            })
            .await
            .unwrap();
        let settings = controller
            .update_settings(SettingsPatch {
                ai_provider: None,
                api_key: Some("sk-1".into()),
            })
            .await
            .unwrap();

        assert_eq!(settings.ai_provider, AiProvider::Anthropic);
        assert_eq!(settings.api_key, "sk-1");
        assert!(ChatController::validate_api_key("sk-1").is_err());
        assert!(ChatController::validate_api_key("sk-abcdefghijklmnopqrstu").is_ok());
    }
}
