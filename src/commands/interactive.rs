//! Interactive read-dispatch-print loop
//!
//! [`InteractiveSession`] owns the store manager, the chat client and the
//! currently selected store. One line is fully processed, including every
//! remote call it triggers, before the next one is read.

use crate::api::types::FileSearchStore;
use crate::api::FileSearchApi;
use crate::chat_client::{ChatClient, ChatSettings};
use crate::commands::input::{InputEvent, LineInput};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{RagChatError, Result};
use crate::export::{normalize_export_filename, render_export, write_export, ExportHeader};
use crate::render::print_response;
use crate::store_manager::StoreManager;

use chrono::Local;
use colored::Colorize;
use std::future::Future;
use std::sync::Arc;

const PROMPT: &str = "You: ";

/// State of one interactive run
pub struct InteractiveSession<I: LineInput> {
    config: Config,
    stores: StoreManager,
    chat: ChatClient,
    current_store: Option<FileSearchStore>,
    running: bool,
    input: I,
}

impl<I: LineInput> InteractiveSession<I> {
    /// Build a session over the given API and input source
    pub fn new(config: Config, api: Arc<dyn FileSearchApi>, input: I) -> Self {
        let stores = StoreManager::new(api.clone(), &config.file_search);
        let chat = ChatClient::new(api, ChatSettings::from(&config.chat));
        Self {
            config,
            stores,
            chat,
            current_store: None,
            running: true,
            input,
        }
    }

    /// Replace the store manager, e.g. to shorten polling in tests
    pub fn with_store_manager(mut self, stores: StoreManager) -> Self {
        self.stores = stores;
        self
    }

    /// The selected store
    pub fn current_store(&self) -> Option<&FileSearchStore> {
        self.current_store.as_ref()
    }

    /// The chat client
    pub fn chat(&self) -> &ChatClient {
        &self.chat
    }

    /// The input source
    pub fn input(&self) -> &I {
        &self.input
    }

    /// False once the user asked to quit
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run until `/quit`, end of input or interrupt
    ///
    /// # Errors
    ///
    /// Returns error only when the input source itself fails
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Starting interactive chat mode");
        self.print_welcome_banner();

        while self.running {
            match self.input.read_line(PROMPT)? {
                InputEvent::Line(line) => {
                    if let Err(e) = self.handle_line(&line).await {
                        tracing::error!("Command failed: {:#}", e);
                        eprintln!("{}", format!("Error: {}", e).red());
                    }
                }
                InputEvent::Interrupted => {
                    println!("\n\nInterrupted. Goodbye!");
                    self.running = false;
                }
                InputEvent::Eof => {
                    self.running = false;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Process one input line
    ///
    /// # Errors
    ///
    /// Returns error for failures the handlers do not report themselves
    pub async fn handle_line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        self.input.add_history(trimmed);

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                return Ok(());
            }
        };

        match command {
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => {
                self.running = false;
            }
            SpecialCommand::CreateStore(name) => self.create_store(name.as_deref()).await?,
            SpecialCommand::ListStores => self.stores.display_stores_summary().await,
            SpecialCommand::SelectStore(name) => {
                self.select_store(&name).await;
            }
            SpecialCommand::DeleteStore(name) => self.delete_store(&name).await?,
            SpecialCommand::UploadFiles => self.upload_files().await,
            SpecialCommand::StoreInfo => self.show_store_info().await,
            SpecialCommand::StartChat => self.start_chat()?,
            SpecialCommand::ResetChat => self.reset_chat(),
            SpecialCommand::History => self.show_history(),
            SpecialCommand::Export(filename) => self.export_chat(filename.as_deref()),
            SpecialCommand::None => self.send_chat_message(trimmed).await,
        }

        Ok(())
    }

    fn print_welcome_banner(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║        Gemini File Search Chat - Interactive Mode            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model: {}", self.config.chat.model.cyan());
        match &self.current_store {
            Some(store) => println!("Store: {}", store.name.cyan()),
            None => println!("Store: {}", "none selected".dimmed()),
        }
        println!("\nType '/help' for available commands, '/quit' to exit\n");
    }

    /// Ask a question and read the answer; end of input counts as no
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(match self.input.read_line(prompt)? {
            InputEvent::Line(answer) => Some(answer.trim().to_string()),
            InputEvent::Interrupted | InputEvent::Eof => None,
        })
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self
            .ask(prompt)?
            .map(|a| a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"))
            .unwrap_or(false))
    }

    async fn create_store(&mut self, name: Option<&str>) -> Result<()> {
        let store = match self.stores.create_store(name).await {
            Ok(store) => store,
            Err(e) => {
                eprintln!("{}", format!("Error creating store: {}", e).red());
                return Ok(());
            }
        };

        println!("{}", "✓ Store created".green());
        println!("  Name: {}", store.name.cyan());
        println!("  Display Name: {}", store.display_label());

        if self.confirm("\nSelect this store for chat? (y/n): ")? {
            self.set_current_store(store);
        }
        Ok(())
    }

    /// Select a store by resource name; unknown names leave the selection as is
    pub async fn select_store(&mut self, name: &str) -> bool {
        match self.stores.get_store(name).await {
            Some(store) => {
                self.set_current_store(store);
                true
            }
            None => {
                eprintln!("{}", format!("Store not found: {}", name).red());
                false
            }
        }
    }

    fn set_current_store(&mut self, store: FileSearchStore) {
        println!(
            "{}",
            format!("✓ Selected store: {}", store.display_label()).green()
        );
        self.chat.set_file_search_stores(vec![store.name.clone()]);
        self.current_store = Some(store);
    }

    async fn delete_store(&mut self, name: &str) -> Result<()> {
        let prompt = format!(
            "Are you sure you want to delete store '{}'? This cannot be undone. Type 'yes' to confirm: ",
            name
        );
        let confirmed = self
            .ask(&prompt)?
            .map(|a| a.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);
        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(());
        }

        if !self.stores.delete_store(name, true).await {
            return Ok(());
        }

        println!("{}", format!("✓ Deleted store: {}", name).green());
        if self.current_store.as_ref().map(|s| s.name.as_str()) == Some(name) {
            self.current_store = None;
            self.chat.set_file_search_stores(Vec::new());
            println!("{}", "Selected store cleared.".yellow());
        }
        Ok(())
    }

    async fn upload_files(&mut self) {
        let Some(store) = self.current_store.clone() else {
            eprintln!(
                "{}",
                "No store selected. Use '/create' or '/select' first.".red()
            );
            return;
        };

        let dir = self.config.file_search.files_dir.clone();
        println!(
            "Uploading files from {} to {}",
            dir.display(),
            store.display_label().cyan()
        );
        println!("{}", "(press Ctrl-C to cancel)".dimmed());

        tokio::select! {
            uploaded = self.stores.upload_directory(&dir, &store.name) => {
                tracing::info!(store = %store.name, uploaded, "Upload batch finished");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Upload batch cancelled by user");
                println!("{}", "\nUpload cancelled.".yellow());
            }
        }
    }

    async fn show_store_info(&mut self) {
        let Some(selected) = self.current_store.clone() else {
            println!("{}", "No store selected.".yellow());
            return;
        };

        let store = match self.stores.get_store(&selected.name).await {
            Some(store) => {
                self.current_store = Some(store.clone());
                store
            }
            None => selected,
        };

        println!("\nCurrent Store:");
        println!("  Name: {}", store.name.cyan());
        println!("  Display Name: {}", store.display_label());
        println!(
            "  Created: {}",
            store.create_time.as_deref().unwrap_or("N/A")
        );
        println!(
            "  Documents: {} active, {} pending, {} failed",
            store.active_documents_count.as_deref().unwrap_or("0"),
            store.pending_documents_count.as_deref().unwrap_or("0"),
            store.failed_documents_count.as_deref().unwrap_or("0")
        );
        if let Some(size) = &store.size_bytes {
            println!("  Size: {} bytes", size);
        }

        if let Err(e) = self.stores.list_documents(&store.name).await {
            println!("  {}", format!("Document listing: {}", e).dimmed());
        }
        println!();
    }

    fn start_chat(&mut self) -> Result<()> {
        if self.chat.has_session()
            && !self.confirm("Chat session already active. Reset and start new session? (y/n): ")?
        {
            println!("Keeping current session.");
            return Ok(());
        }

        self.chat.start_session();
        match &self.current_store {
            Some(store) => println!(
                "Answers will be grounded in store: {}",
                store.display_label().cyan()
            ),
            None => println!(
                "{}",
                "No store selected; answers will not use file search.".yellow()
            ),
        }
        println!();
        Ok(())
    }

    fn reset_chat(&mut self) {
        if self.chat.has_session() {
            self.chat.reset_session();
        } else {
            println!("{}", "No active chat session.".yellow());
        }
    }

    fn show_history(&self) {
        if !self.chat.has_session() {
            eprintln!("{}", RagChatError::NoActiveSession.to_string().red());
            return;
        }

        let history = self.chat.get_history();
        if history.is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        println!("\nConversation History ({} messages):", history.len());
        println!("{}", "=".repeat(60));
        for message in &history {
            println!("\n[{}]", message.role.to_string().bold());
            println!("{}", message.text());
        }
        println!("{}\n", "=".repeat(60));
    }

    fn export_chat(&self, filename: Option<&str>) {
        if !self.chat.has_session() {
            eprintln!("{}", RagChatError::NoActiveSession.to_string().red());
            return;
        }

        let history = self.chat.get_history();
        if history.is_empty() {
            println!("{}", "No messages to export.".yellow());
            return;
        }

        let now = Local::now();
        let header = ExportHeader {
            exported_at: now,
            model: self.chat.settings().model.clone(),
            store: self.current_store.as_ref().map(|s| s.name.clone()),
        };
        let filename = normalize_export_filename(filename, now);
        let contents = render_export(&header, &history);

        match write_export(&self.config.export.exports_dir, &filename, &contents) {
            Ok(path) => println!(
                "{}",
                format!("✓ Chat exported to {}", path.display()).green()
            ),
            Err(e) => {
                tracing::error!("Export failed: {:#}", e);
                eprintln!("{}", format!("Error exporting chat: {}", e).red());
            }
        }
    }

    async fn send_chat_message(&mut self, text: &str) {
        if !self.chat.has_session() {
            eprintln!("{}", RagChatError::NoActiveSession.to_string().red());
            return;
        }

        if self.current_store.is_none() {
            println!(
                "{}",
                "Warning: no store selected; this answer is not grounded in your documents."
                    .yellow()
            );
        }

        // Once an upload has listened for Ctrl-C the default SIGINT handling
        // is gone for the rest of the process, so a chat turn races it too.
        self.send_or_cancel(text, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    }

    /// Send one turn unless `cancel` resolves first
    ///
    /// A cancelled turn is dropped before the exchange is recorded.
    async fn send_or_cancel<F>(&mut self, text: &str, cancel: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::warn!("Chat turn cancelled by user");
                println!("{}", "\nRequest cancelled.".yellow());
            }
            response = self.chat.send_message(text) => {
                print_response(response.as_ref());
            }
        }
    }
}
