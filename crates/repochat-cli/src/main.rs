use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use repochat_application::ChatController;
use repochat_core::RecordId;
use repochat_core::state::StateStore;
use repochat_infrastructure::{AppConfig, JsonDirStateStore, MemoryStateStore, RepochatPaths};
use repochat_interaction::ProviderGateway;

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "repochat")]
#[command(about = "repochat - chat with an LLM over your own document repositories", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted state
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in (any credentials are accepted)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show login state, provider and current selection
    Status,
    /// Manage repositories
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
    /// Manage files inside a repository
    File {
        #[command(subcommand)]
        action: FileAction,
    },
    /// Manage chats
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Send one message and print the reply
    Send {
        /// Chat to send to; a new chat is created when omitted
        #[arg(long)]
        chat: Option<RecordId>,
        message: String,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Line-based chat session
    Interactive {
        #[arg(long)]
        chat: Option<RecordId>,
    },
}

#[derive(Subcommand)]
pub(crate) enum RepoAction {
    /// Create a repository
    Create { name: String },
    /// List repositories and their files
    List,
    /// Delete a repository
    Delete { id: RecordId },
    /// Toggle whether a repository is selected as context
    Select { id: RecordId },
}

#[derive(Subcommand)]
pub(crate) enum FileAction {
    /// Upload one or more files
    Add {
        repo_id: RecordId,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Declared MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Delete a file
    Delete { repo_id: RecordId, file_id: RecordId },
}

#[derive(Subcommand)]
pub(crate) enum ChatAction {
    /// Start a new chat
    New,
    /// List chats
    List,
    /// Print the messages of a chat
    Show { chat_id: RecordId },
}

#[derive(Subcommand)]
pub(crate) enum SettingsAction {
    /// Print the current settings
    Show,
    /// Update provider and/or API key
    Set {
        /// openai or anthropic
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => RepochatPaths::config_file()?,
    };
    let config = AppConfig::load(&config_path)?;
    init_tracing(&config.log_level);

    let controller = build_controller(&cli, &config)?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&controller, &email, &password).await?,
        Commands::Logout => commands::auth::logout(&controller).await?,
        Commands::Status => commands::auth::status(&controller).await,
        Commands::Repo { action } => commands::repo::run(&controller, action).await?,
        Commands::File { action } => commands::file::run(&controller, action).await?,
        Commands::Chat { action } => {
            commands::auth::require_login(&controller).await?;
            commands::chat::run(&controller, action).await?
        }
        Commands::Send { chat, message } => {
            commands::auth::require_login(&controller).await?;
            commands::chat::send(&controller, chat, &message).await?
        }
        Commands::Settings { action } => commands::settings::run(&controller, action).await?,
        Commands::Interactive { chat } => {
            commands::auth::require_login(&controller).await?;
            repl::run(&controller, chat).await?
        }
    }

    Ok(())
}

/// Logs go to stderr. `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_controller(cli: &Cli, config: &AppConfig) -> Result<ChatController> {
    let store: Arc<dyn StateStore> = if cli.ephemeral {
        Arc::new(MemoryStateStore::new())
    } else {
        let dir = match cli.data_dir.clone().or_else(|| config.storage.data_dir.clone()) {
            Some(dir) => dir,
            None => RepochatPaths::data_dir()?,
        };
        tracing::debug!(dir = %dir.display(), "Using data directory");
        Arc::new(JsonDirStateStore::with_dir(dir))
    };
    let gateway = Arc::new(ProviderGateway::new(&config.gateway));

    ChatController::load(store, gateway).context("Failed to load application state")
}
