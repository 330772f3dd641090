//! File Search store management
//!
//! [`StoreManager`] wraps the store lifecycle and upload calls of
//! [`FileSearchApi`] with the degradation policy the interactive loop
//! expects: listing, lookup and deletion fall back to empty/`None`/`false`,
//! while creation propagates its error so the caller can explain it.

use crate::api::types::{FileSearchStore, UploadFile};
use crate::api::FileSearchApi;
use crate::config::FileSearchConfig;
use crate::error::{RagChatError, Result};

use colored::Colorize;
use prettytable::{format, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Store lifecycle and upload operations
pub struct StoreManager {
    api: Arc<dyn FileSearchApi>,
    store_prefix: String,
    poll_interval: Duration,
    upload_timeout: Option<Duration>,
}

impl StoreManager {
    /// Create a manager from the File Search configuration
    pub fn new(api: Arc<dyn FileSearchApi>, config: &FileSearchConfig) -> Self {
        Self {
            api,
            store_prefix: config.store_prefix.clone(),
            poll_interval: config.poll_interval(),
            upload_timeout: config.upload_timeout(),
        }
    }

    /// Override the interval between operation polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the upload timeout
    pub fn with_upload_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Display name used when the caller supplies none
    fn default_display_name(&self) -> String {
        format!("{}-{}", self.store_prefix, chrono::Utc::now().timestamp())
    }

    /// Create a new store
    ///
    /// A missing or blank display name becomes `<prefix>-<unix timestamp>`.
    ///
    /// # Errors
    ///
    /// Returns the remote error when the API rejects the request
    pub async fn create_store(&self, display_name: Option<&str>) -> Result<FileSearchStore> {
        let display_name = match display_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.default_display_name(),
        };

        let store = self.api.create_store(&display_name).await?;
        tracing::info!(store = %store.name, display_name = %display_name, "Created store");
        Ok(store)
    }

    /// List all stores; errors yield an empty list
    pub async fn list_stores(&self) -> Vec<FileSearchStore> {
        match self.api.list_stores().await {
            Ok(stores) => stores,
            Err(e) => {
                tracing::warn!("Failed to list stores: {:#}", e);
                eprintln!("{}", format!("Error listing stores: {}", e).red());
                Vec::new()
            }
        }
    }

    /// Fetch one store; any error yields `None`
    pub async fn get_store(&self, name: &str) -> Option<FileSearchStore> {
        match self.api.get_store(name).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::debug!("Store lookup for {} failed: {:#}", name, e);
                None
            }
        }
    }

    /// Delete a store
    pub async fn delete_store(&self, name: &str, force: bool) -> bool {
        match self.api.delete_store(name, force).await {
            Ok(()) => {
                tracing::info!(store = %name, "Deleted store");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete store {}: {:#}", name, e);
                eprintln!("{}", format!("Error deleting store: {}", e).red());
                false
            }
        }
    }

    /// Upload one file and wait for ingestion to finish
    ///
    /// Returns `false` without any remote call when `path` does not exist.
    pub async fn upload_file(
        &self,
        path: &Path,
        store_name: &str,
        display_name: Option<&str>,
    ) -> bool {
        if !path.exists() {
            eprintln!(
                "{}",
                RagChatError::FileNotFound(path.display().to_string())
                    .to_string()
                    .red()
            );
            return false;
        }

        let display_name = display_name
            .map(str::to_string)
            .or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| path.display().to_string());

        println!("Uploading {}...", display_name.cyan());
        match self.upload_and_wait(path, store_name, &display_name).await {
            Ok(()) => {
                println!("{}", format!("✓ Uploaded {}", display_name).green());
                true
            }
            Err(e) => {
                tracing::error!("Upload of {} failed: {:#}", path.display(), e);
                eprintln!(
                    "{}",
                    format!("✗ Error uploading {}: {}", display_name, e).red()
                );
                false
            }
        }
    }

    async fn upload_and_wait(&self, path: &Path, store_name: &str, display_name: &str) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        tracing::debug!(
            "Submitting {} ({}, {} bytes) to {}",
            display_name,
            mime_type,
            bytes.len(),
            store_name
        );

        let file = UploadFile {
            display_name: display_name.to_string(),
            mime_type,
            bytes,
        };
        let mut operation = self.api.upload_to_store(store_name, &file).await?;
        let started = Instant::now();

        while !operation.done {
            if let Some(timeout) = self.upload_timeout {
                if started.elapsed() >= timeout {
                    return Err(RagChatError::UploadTimeout {
                        operation: operation.name,
                        seconds: timeout.as_secs(),
                    }
                    .into());
                }
            }

            tokio::time::sleep(self.poll_interval).await;
            operation = self.api.get_operation(&operation.name).await?;
            tracing::debug!(operation = %operation.name, done = operation.done, "Polled upload");
        }

        if let Some(status) = operation.error {
            return Err(RagChatError::UploadFailed(format!(
                "{} (code {})",
                status.message, status.code
            ))
            .into());
        }

        Ok(())
    }

    /// Upload every direct-child file of `dir`, returning the success count
    pub async fn upload_directory(&self, dir: &Path, store_name: &str) -> usize {
        let files = match list_files(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Cannot read directory {}: {:#}", dir.display(), e);
                eprintln!("{}", format!("Directory not found: {}", dir.display()).red());
                return 0;
            }
        };

        if files.is_empty() {
            println!("{}", format!("No files found in {}", dir.display()).yellow());
            return 0;
        }

        println!("Found {} file(s) to upload", files.len());
        let mut uploaded = 0;
        for file in &files {
            if self.upload_file(file, store_name, None).await {
                uploaded += 1;
            }
        }

        println!("\nSuccessfully uploaded {}/{} file(s)", uploaded, files.len());
        uploaded
    }

    /// List the documents inside a store
    ///
    /// # Errors
    ///
    /// Always returns [`RagChatError::Unsupported`]
    pub async fn list_documents(&self, store_name: &str) -> Result<Vec<String>> {
        Err(RagChatError::Unsupported(format!("listing documents in {}", store_name)).into())
    }

    /// Print all stores as a table
    pub async fn display_stores_summary(&self) {
        let stores = self.list_stores().await;
        if stores.is_empty() {
            println!("{}", "No File Search stores found.".yellow());
            return;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(prettytable::row![
            "#".bold(),
            "Display Name".bold(),
            "Name".bold(),
            "Documents".bold(),
            "Created".bold()
        ]);

        for (i, store) in stores.iter().enumerate() {
            table.add_row(prettytable::row![
                i + 1,
                store.display_label(),
                store.name.cyan(),
                store.active_documents_count.as_deref().unwrap_or("-"),
                store.create_time.as_deref().unwrap_or("N/A")
            ]);
        }

        println!("\nFile Search Stores ({}):", stores.len());
        table.printstd();
        println!();
    }
}

/// Regular files directly inside `dir`, sorted by path
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
