use anyhow::Result;
use colored::Colorize;

use repochat_application::ChatController;
use repochat_core::RecordId;
use repochat_core::chat::{Message, MessageRole};

use crate::ChatAction;

pub async fn run(controller: &ChatController, action: ChatAction) -> Result<()> {
    match action {
        ChatAction::New => {
            let chat = controller.create_chat().await?;
            println!("{}", format!("Created chat {} ({})", chat.name, chat.id).green());
        }
        ChatAction::List => {
            let chats = controller.list_chats().await;
            if chats.is_empty() {
                println!("{}", "No chats yet.".bright_black());
            }
            for chat in chats {
                println!(
                    "{} {} {}",
                    chat.id.to_string().bright_black(),
                    chat.name,
                    chat.timestamp.bright_black()
                );
            }
        }
        ChatAction::Show { chat_id } => {
            for message in controller.messages(chat_id).await? {
                print_message(&message);
            }
        }
    }
    Ok(())
}

/// Sends `message`, creating a chat first when `chat_id` is `None`.
pub async fn send(controller: &ChatController, chat_id: Option<RecordId>, message: &str) -> Result<()> {
    let chat_id = match chat_id {
        Some(id) => id,
        None => {
            let chat = controller.create_chat().await?;
            eprintln!("{}", format!("Started chat {}", chat.id).bright_black());
            chat.id
        }
    };

    let reply = controller.send_message(chat_id, message).await?;
    print_message(&reply);
    Ok(())
}

pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            for line in message.content.lines() {
                println!("{}", format!("> {line}").green());
            }
        }
        MessageRole::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
            println!();
        }
        MessageRole::System => println!("{}", message.content.bright_black()),
    }
}
