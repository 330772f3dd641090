//! Command-line interface definition for ragchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat command plus headless store management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragchat - chat with Gemini, grounded on your File Search stores
///
/// Manage File Search stores, upload documents, and ask questions whose
/// answers cite the uploaded sources.
#[derive(Parser, Debug, Clone)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the chat model from config
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Command to execute (defaults to interactive chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for ragchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat loop
    Chat {
        /// Select this store (full resource name) before the first prompt
        #[arg(short, long)]
        store: Option<String>,
    },

    /// Manage File Search stores without entering the chat loop
    Stores {
        /// Store management subcommand
        #[command(subcommand)]
        command: StoreCommand,
    },

    /// Upload files into a File Search store
    Upload {
        /// Target store (full resource name, e.g. fileSearchStores/abc)
        #[arg(short, long)]
        store: String,

        /// File or directory to upload (defaults to the configured files directory)
        path: Option<PathBuf>,
    },
}

/// Store management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StoreCommand {
    /// List all File Search stores
    List,

    /// Create a new File Search store
    Create {
        /// Display name (generated from the configured prefix when omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show details about a store
    Info {
        /// Store resource name
        name: String,
    },

    /// Delete a store and all documents in it
    Delete {
        /// Store resource name
        name: String,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            model: None,
            command: None,
        }
    }
}
