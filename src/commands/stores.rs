//! Non-interactive store and upload commands

use crate::api::FileSearchApi;
use crate::cli::StoreCommand;
use crate::config::Config;
use crate::error::{RagChatError, Result};
use crate::store_manager::StoreManager;

use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// Handle `ragchat stores ...`
///
/// # Errors
///
/// Returns error when the requested store does not exist, when deletion is
/// not confirmed with `--yes`, or when the remote call fails
pub async fn handle_stores(
    api: Arc<dyn FileSearchApi>,
    config: &Config,
    command: StoreCommand,
) -> Result<()> {
    let manager = StoreManager::new(api, &config.file_search);

    match command {
        StoreCommand::List => manager.display_stores_summary().await,
        StoreCommand::Create { name } => {
            let store = manager.create_store(name.as_deref()).await?;
            println!("{}", "✓ Store created".green());
            println!("  Name: {}", store.name.cyan());
            println!("  Display Name: {}", store.display_label());
        }
        StoreCommand::Info { name } => {
            let store = manager
                .get_store(&name)
                .await
                .ok_or_else(|| RagChatError::NotFound(name.clone()))?;
            println!("{}", serde_yaml::to_string(&store)?);
        }
        StoreCommand::Delete { name, yes } => {
            if !yes {
                return Err(RagChatError::Input(format!(
                    "refusing to delete {} without --yes",
                    name
                ))
                .into());
            }
            if !manager.delete_store(&name, true).await {
                return Err(RagChatError::DeleteFailed(name).into());
            }
            println!("{}", format!("✓ Deleted store: {}", name).green());
        }
    }

    Ok(())
}

/// Handle `ragchat upload --store NAME [PATH]`
///
/// A file path uploads that file; a directory (default: the configured files
/// directory) uploads its direct-child files.
///
/// # Errors
///
/// Returns error when the store does not exist or nothing could be uploaded
pub async fn handle_upload(
    api: Arc<dyn FileSearchApi>,
    config: &Config,
    store: &str,
    path: Option<&Path>,
) -> Result<()> {
    let manager = StoreManager::new(api, &config.file_search);
    let path = path.unwrap_or(&config.file_search.files_dir);

    if !path.exists() {
        return Err(RagChatError::FileNotFound(path.display().to_string()).into());
    }
    if manager.get_store(store).await.is_none() {
        return Err(RagChatError::NotFound(store.to_string()).into());
    }

    if path.is_dir() {
        let uploaded = manager.upload_directory(path, store).await;
        if uploaded == 0 {
            return Err(RagChatError::UploadFailed(format!(
                "no files uploaded from {}",
                path.display()
            ))
            .into());
        }
    } else if !manager.upload_file(path, store, None).await {
        return Err(RagChatError::UploadFailed(path.display().to_string()).into());
    }

    Ok(())
}
