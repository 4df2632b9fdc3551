use anyhow::Result;
use colored::Colorize;

use repochat_application::ChatController;

use crate::RepoAction;

pub async fn run(controller: &ChatController, action: RepoAction) -> Result<()> {
    match action {
        RepoAction::Create { name } => {
            let repo = controller.create_repository(&name).await?;
            println!("{}", format!("Created repository {} ({})", repo.name, repo.id).green());
        }
        RepoAction::List => list(controller).await,
        RepoAction::Delete { id } => {
            controller.delete_repository(id).await?;
            println!("{}", format!("Deleted repository {id}").green());
        }
        RepoAction::Select { id } => {
            let selected = controller.toggle_repository_selection(id).await?;
            let verb = if selected { "Selected" } else { "Deselected" };
            println!("{}", format!("{verb} repository {id}").green());
        }
    }
    Ok(())
}

async fn list(controller: &ChatController) {
    let repositories = controller.list_repositories().await;
    if repositories.is_empty() {
        println!("{}", "No repositories yet.".bright_black());
        return;
    }

    let selected = controller.selected_repositories().await;
    for repo in repositories {
        let marker = if selected.contains(&repo.id) { "*" } else { " " };
        println!(
            "{} {} {}",
            marker.bright_green(),
            repo.id.to_string().bright_black(),
            repo.name.bold()
        );
        for file in &repo.files {
            println!(
                "    {} {} ({}, {} bytes)",
                file.id.to_string().bright_black(),
                file.name,
                file.mime_type,
                file.size
            );
        }
    }
}
