//! ragchat - grounded chat over Gemini File Search stores
//!
//! This library provides the pieces behind the `ragchat` CLI: a remote API
//! abstraction with an HTTP implementation, File Search store management,
//! a chat client that keeps local history and grounds turns on selected
//! stores, and the interactive command loop.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: the `FileSearchApi` trait, Gemini HTTP client, in-memory fake
//! - `store_manager`: store lifecycle and uploads with polling
//! - `chat_client`: sessions, per-turn configuration, history
//! - `grounding` / `render` / `export`: citations, terminal and Markdown output
//! - `commands`: interactive loop and headless subcommands
//! - `config`, `error`, `cli`: configuration, error types, argument parsing
//!
//! # Example
//!
//! ```no_run
//! use ragchat::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!     ragchat::commands::chat::run_chat(config, None).await
//! }
//! ```

pub mod api;
pub mod chat_client;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod grounding;
pub mod render;
pub mod store_manager;

// Re-export commonly used types
pub use api::{FileSearchApi, GeminiClient};
pub use chat_client::{ChatClient, ChatMessage, ChatResponse, ChatSettings, Role};
pub use config::Config;
pub use error::{RagChatError, Result};
pub use grounding::{CitationSource, Grounding};
pub use store_manager::StoreManager;

#[cfg(test)]
pub mod test_utils;
