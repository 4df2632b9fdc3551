mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{
    RecordingGateway, TEST_API_KEY, controller_with, is_provider, repo_with_file, with_api_key,
};
use repochat_core::chat::MessageRole;
use repochat_core::error::NO_REPOSITORY_SELECTED;
use repochat_core::ChatError;
use repochat_infrastructure::GatewayConfig;
use repochat_interaction::ProviderGateway;

#[tokio::test]
async fn every_message_in_a_chat_records_the_same_repositories() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;

    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    let notes = repo_with_file(&controller, "Notes", "b.txt", "beta").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    controller.toggle_repository_selection(notes.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    controller.send_message(chat.id, "first").await.unwrap();

    // Same set, different order: still accepted.
    controller.toggle_repository_selection(docs.id).await.unwrap();
    controller.toggle_repository_selection(docs.id).await.unwrap();
    assert_eq!(controller.selected_repositories().await, vec![notes.id, docs.id]);

    controller.send_message(chat.id, "second").await.unwrap();
    controller.send_message(chat.id, "third").await.unwrap();

    let messages = controller.messages(chat.id).await.unwrap();
    assert_eq!(messages.len(), 6);
    let expected: BTreeSet<_> = [docs.id, notes.id].into_iter().collect();
    for message in &messages {
        assert_eq!(message.repository_set(), expected);
    }
}

#[tokio::test]
async fn send_without_selection_is_rejected_before_any_write() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    let chat = controller.create_chat().await.unwrap();

    let err = controller.send_message(chat.id, "hello").await.unwrap_err();

    assert_eq!(err, ChatError::validation(NO_REPOSITORY_SELECTED));
    assert!(controller.messages(chat.id).await.unwrap().is_empty());
    assert!(gateway.requests().is_empty());
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    let err = controller.send_message(chat.id, "  \n\t ").await.unwrap_err();

    assert!(err.is_validation());
    assert!(controller.messages(chat.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn changing_selection_mid_chat_is_context_locked() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    let notes = repo_with_file(&controller, "Notes", "b.txt", "beta").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();
    controller.send_message(chat.id, "first").await.unwrap();
    let before = controller.messages(chat.id).await.unwrap();

    controller.toggle_repository_selection(notes.id).await.unwrap();
    let err = controller.send_message(chat.id, "second").await.unwrap_err();

    assert_eq!(err, ChatError::ContextLocked);
    assert!(err.to_string().contains("Please start a new chat"));
    assert_eq!(controller.messages(chat.id).await.unwrap(), before);
    assert_eq!(gateway.requests().len(), 1);

    // A fresh chat accepts the new selection.
    let fresh = controller.create_chat().await.unwrap();
    controller.send_message(fresh.id, "second").await.unwrap();
}

#[tokio::test]
async fn api_key_in_file_content_is_redacted() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "sk-ABCDEF1234567890 hello").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    controller.send_message(chat.id, "Summarize").await.unwrap();

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[0].messages[0].role, MessageRole::System);

    let user_turn = gateway.last_user_turn();
    assert!(user_turn.contains("[API_KEY] hello"));
    assert!(!user_turn.contains("sk-ABCDEF1234567890"));
    assert!(user_turn.ends_with("Summarize"));
}

#[tokio::test]
async fn long_content_is_capped_and_hashes_redacted() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let content = format!("{} {}", "a".repeat(40), "word ".repeat(400));
    let docs = repo_with_file(&controller, "Docs", "big.txt", &content).await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    controller.send_message(chat.id, "go").await.unwrap();

    let user_turn = gateway.last_user_turn();
    let fragment = user_turn
        .split("Content:\n")
        .nth(1)
        .and_then(|rest| rest.strip_suffix("\n\ngo"))
        .unwrap();
    assert!(fragment.starts_with("[HASH] word"));
    assert!(fragment.ends_with("..."));
    assert!(fragment.chars().count() <= 1000 + 3);
}

#[tokio::test]
async fn deleting_a_selected_repository_drops_it_from_context() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    let gone = repo_with_file(&controller, "Obsolete", "old.txt", "stale").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    controller.toggle_repository_selection(gone.id).await.unwrap();

    controller.delete_repository(gone.id).await.unwrap();
    assert_eq!(controller.selected_repositories().await, vec![docs.id]);

    let chat = controller.create_chat().await.unwrap();
    controller.send_message(chat.id, "hi").await.unwrap();

    let user_turn = gateway.last_user_turn();
    assert!(user_turn.contains("Repository: Docs"));
    assert!(!user_turn.contains("Obsolete"));
    assert!(!user_turn.contains("stale"));
}

#[tokio::test]
async fn history_is_limited_to_the_last_five_messages() {
    let gateway = RecordingGateway::new();
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    for i in 1..=3 {
        gateway.push_reply(Ok(format!("reply {i}")));
        controller.send_message(chat.id, &format!("question {i}")).await.unwrap();
    }
    controller.send_message(chat.id, "question 4").await.unwrap();

    let last = gateway.requests().pop().unwrap();
    // system + 5 history + current user turn
    assert_eq!(last.messages.len(), 7);
    let history: Vec<&str> = last.messages[1..6]
        .iter()
        .map(|turn| turn.content.as_str())
        .collect();
    assert_eq!(
        history,
        vec!["reply 1", "question 2", "reply 2", "question 3", "reply 3"]
    );
}

#[tokio::test]
async fn provider_context_length_error_keeps_the_user_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", format!("Bearer {TEST_API_KEY}").as_str())
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":"context_length_exceeded"}}"#)
        .create_async()
        .await;
    let config = GatewayConfig {
        openai_endpoint: format!("{}/v1/chat/completions", server.url()),
        ..GatewayConfig::default()
    };
    let controller = controller_with(Arc::new(ProviderGateway::new(&config)));
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    let err = controller.send_message(chat.id, "too much").await.unwrap_err();

    assert!(err.is_context_too_large());
    assert!(err.to_string().contains("Please select fewer repositories"));
    let messages = controller.messages(chat.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "too much");
    mock.assert_async().await;
}

#[tokio::test]
async fn other_provider_errors_carry_the_provider_message() {
    let gateway = RecordingGateway::new();
    gateway.push_reply(Err(ChatError::provider("The model is overloaded")));
    let controller = controller_with(gateway.clone());
    with_api_key(&controller).await;
    let docs = repo_with_file(&controller, "Docs", "a.txt", "alpha").await;
    controller.toggle_repository_selection(docs.id).await.unwrap();
    let chat = controller.create_chat().await.unwrap();

    let err = controller.send_message(chat.id, "hello").await.unwrap_err();
    assert!(is_provider(&err));
    assert_eq!(err.to_string(), "The model is overloaded");

    // Retrying on the same chat works; the selection is still the pinned one.
    let reply = controller.send_message(chat.id, "hello again").await.unwrap();
    assert_eq!(reply.content, "ok");
    assert_eq!(controller.messages(chat.id).await.unwrap().len(), 3);
}
