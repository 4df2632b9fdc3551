#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use repochat_application::ChatController;
use repochat_core::gateway::{ChatGateway, CompletionRequest};
use repochat_core::repo::{FileDraft, Repository};
use repochat_core::settings::SettingsPatch;
use repochat_core::{ChatError, Result};
use repochat_infrastructure::MemoryStateStore;

pub const TEST_API_KEY: &str = "sk-integration-test-key-0001";

/// Gateway double that records every request and replies with a script.
pub struct RecordingGateway {
    replies: Mutex<Vec<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Queues a reply; once the queue is empty every call answers "ok".
    pub fn push_reply(&self, reply: Result<String>) {
        self.replies.lock().unwrap().push(reply);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_user_turn(&self) -> String {
        self.requests()
            .last()
            .and_then(|request| request.messages.last())
            .map(|turn| turn.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok("ok".to_string())
        } else {
            replies.remove(0)
        }
    }
}

pub fn controller_with(gateway: Arc<dyn ChatGateway>) -> ChatController {
    ChatController::load(Arc::new(MemoryStateStore::new()), gateway)
        .unwrap()
        .without_env_api_key()
}

pub async fn with_api_key(controller: &ChatController) {
    controller
        .update_settings(SettingsPatch {
            ai_provider: None,
            api_key: Some(TEST_API_KEY.to_string()),
        })
        .await
        .unwrap();
}

/// Creates a repository holding one text file.
pub async fn repo_with_file(
    controller: &ChatController,
    name: &str,
    file_name: &str,
    content: &str,
) -> Repository {
    let repo = controller.create_repository(name).await.unwrap();
    controller
        .add_file(
            repo.id,
            FileDraft {
                name: file_name.to_string(),
                content: content.to_string(),
                mime_type: "text/plain".to_string(),
                size: content.len() as u64,
            },
        )
        .await
        .unwrap();
    repo
}

pub fn is_provider(err: &ChatError) -> bool {
    matches!(err, ChatError::Provider(_))
}
