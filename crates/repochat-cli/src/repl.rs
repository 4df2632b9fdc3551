//! Interactive chat session on top of rustyline.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use repochat_application::ChatController;
use repochat_core::RecordId;

use crate::commands::chat::print_message;

const COMMANDS: [&str; 3] = ["/new", "/repos", "/quit"];

/// Completion, highlighting and hints for slash commands.
struct ReplHelper;

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ReplHelper {}

/// Runs the session until `/quit` or end of input.
///
/// Errors from a send are printed and the loop continues.
pub async fn run(controller: &ChatController, chat_id: Option<RecordId>) -> Result<()> {
    let mut chat_id = match chat_id {
        Some(id) => {
            for message in controller.messages(id).await? {
                print_message(&message);
            }
            id
        }
        None => controller.create_chat().await?.id,
    };

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper));

    println!("{}", "=== repochat ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Chat {chat_id}. Type /new for a new chat, /repos to list repositories, /quit to exit.")
            .bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/quit" | "/exit" => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    "/new" => {
                        chat_id = controller.create_chat().await?.id;
                        println!("{}", format!("Started chat {chat_id}").bright_green());
                    }
                    "/repos" => print_repositories(controller).await,
                    input if input.starts_with('/') => {
                        println!("{}", format!("Unknown command: {input}").yellow());
                    }
                    input => match controller.send_message(chat_id, input).await {
                        Ok(reply) => print_message(&reply),
                        Err(e) => eprintln!("{}", e.to_string().red()),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}

async fn print_repositories(controller: &ChatController) {
    let selected = controller.selected_repositories().await;
    let repositories = controller.list_repositories().await;
    if repositories.is_empty() {
        println!("{}", "No repositories yet.".bright_black());
    }
    for repo in repositories {
        let marker = if selected.contains(&repo.id) { "*" } else { " " };
        println!(
            "{} {} {} ({} files)",
            marker.bright_green(),
            repo.id.to_string().bright_black(),
            repo.name,
            repo.files.len()
        );
    }
}
