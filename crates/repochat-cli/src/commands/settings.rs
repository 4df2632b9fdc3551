use anyhow::{Result, anyhow};
use colored::Colorize;

use repochat_application::ChatController;
use repochat_core::settings::{AiProvider, SettingsPatch};

use crate::SettingsAction;

pub async fn run(controller: &ChatController, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = controller.settings().await;
            println!("Provider: {}", settings.ai_provider);
            println!("API key:  {}", mask(&settings.api_key));
        }
        SettingsAction::Set { provider, api_key } => {
            let ai_provider = provider
                .map(|p| p.parse::<AiProvider>().map_err(|e| anyhow!(e)))
                .transpose()?;

            let settings = controller
                .update_settings(SettingsPatch {
                    ai_provider,
                    api_key: api_key.clone(),
                })
                .await?;

            // The key is stored either way; a malformed key only skips the confirmation.
            match api_key.as_deref().map(ChatController::validate_api_key) {
                Some(Err(e)) => println!("{}", e.to_string().yellow()),
                _ => println!(
                    "{}",
                    format!("Settings saved (provider: {})", settings.ai_provider).green()
                ),
            }
        }
    }
    Ok(())
}

fn mask(key: &str) -> String {
    if key.is_empty() {
        return "not set".to_string();
    }
    let visible: String = key.chars().take(3).collect();
    format!("{visible}{}", "*".repeat(key.chars().count().saturating_sub(3).min(16)))
}
