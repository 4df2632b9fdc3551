use anyhow::{Result, bail};
use colored::Colorize;

use repochat_application::ChatController;

pub async fn login(controller: &ChatController, email: &str, password: &str) -> Result<()> {
    controller.login(email, password).await?;
    println!("{}", format!("Logged in as {email}").green());
    Ok(())
}

pub async fn logout(controller: &ChatController) -> Result<()> {
    controller.logout().await?;
    println!("{}", "Logged out".green());
    Ok(())
}

/// Chat commands are only available after `repochat login`.
pub async fn require_login(controller: &ChatController) -> Result<()> {
    if !controller.is_authenticated().await {
        bail!("Not logged in. Run `repochat login --email <EMAIL> --password <PASSWORD>` first.");
    }
    Ok(())
}

pub async fn status(controller: &ChatController) {
    let state = controller.snapshot().await;

    let login = if state.is_authenticated {
        "logged in".green()
    } else {
        "logged out".yellow()
    };
    println!("Status:     {login}");
    println!("Provider:   {}", state.settings.ai_provider);
    println!(
        "API key:    {}",
        if state.settings.api_key.is_empty() {
            "not set".yellow()
        } else {
            "set".green()
        }
    );
    println!("Repos:      {}", state.repositories.len());
    println!("Chats:      {}", state.chats.len());

    let selected: Vec<String> = state
        .repositories
        .iter()
        .filter(|repo| state.selected_repos.contains(&repo.id))
        .map(|repo| format!("{} ({})", repo.name, repo.id))
        .collect();
    if selected.is_empty() {
        println!("Selected:   {}", "none".bright_black());
    } else {
        println!("Selected:   {}", selected.join(", "));
    }
}
