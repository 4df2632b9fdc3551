use anyhow::{Context, Result};
use colored::Colorize;

use repochat_application::ChatController;
use repochat_infrastructure::Upload;

use crate::FileAction;

pub async fn run(controller: &ChatController, action: FileAction) -> Result<()> {
    match action {
        FileAction::Add {
            repo_id,
            paths,
            mime,
        } => {
            let mut uploads = Vec::with_capacity(paths.len());
            for path in &paths {
                let upload = Upload::from_path(path, mime.as_deref())
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                uploads.push(upload);
            }

            for file in controller.upload_files(repo_id, uploads).await? {
                println!(
                    "{}",
                    format!(
                        "Added {} ({}, {} bytes) as {}",
                        file.name, file.mime_type, file.size, file.id
                    )
                    .green()
                );
            }
        }
        FileAction::Delete { repo_id, file_id } => {
            controller.delete_file(repo_id, file_id).await?;
            println!("{}", format!("Deleted file {file_id}").green());
        }
    }
    Ok(())
}
