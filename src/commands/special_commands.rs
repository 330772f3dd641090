//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` are commands. The command token is matched
//! case-insensitively; everything after the first whitespace is a single
//! argument kept verbatim (trimmed), so store names with spaces survive.
//! Every command has a short and a long alias that dispatch identically.
//! Any other line is a chat message.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Create a store, optionally with a display name
    CreateStore(Option<String>),

    /// List all stores
    ListStores,

    /// Select a store for grounding by resource name
    SelectStore(String),

    /// Delete a store by resource name (asks for confirmation)
    DeleteStore(String),

    /// Upload the configured files directory into the selected store
    UploadFiles,

    /// Show details of the selected store
    StoreInfo,

    /// Start a chat session
    StartChat,

    /// Drop the current chat session
    ResetChat,

    /// Print the current session history
    History,

    /// Export the current session to Markdown
    Export(Option<String>),

    /// Not a special command
    ///
    /// The input should be sent to the model as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is not
/// a valid command, and `CommandError::MissingArgument` for `/select` and
/// `/delete` without a store name.
///
/// # Examples
///
/// ```
/// use ragchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/select fileSearchStores/docs-1").unwrap();
/// assert_eq!(cmd, SpecialCommand::SelectStore("fileSearchStores/docs-1".to_string()));
///
/// let cmd = parse_special_command("/LIST-STORES").unwrap();
/// assert_eq!(cmd, SpecialCommand::ListStores);
///
/// let cmd = parse_special_command("what does the handbook say?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (token, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = (!arg.is_empty()).then(|| arg.to_string());

    match token.to_lowercase().as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/quit" | "/exit" => Ok(SpecialCommand::Exit),
        "/create" | "/create-store" => Ok(SpecialCommand::CreateStore(arg)),
        "/list" | "/list-stores" => Ok(SpecialCommand::ListStores),
        "/select" | "/select-store" => arg
            .map(SpecialCommand::SelectStore)
            .ok_or_else(|| CommandError::MissingArgument {
                command: "/select".to_string(),
                usage: "/select <store_name>".to_string(),
            }),
        "/delete" | "/delete-store" => arg
            .map(SpecialCommand::DeleteStore)
            .ok_or_else(|| CommandError::MissingArgument {
                command: "/delete".to_string(),
                usage: "/delete <store_name>".to_string(),
            }),
        "/upload" | "/upload-files" => Ok(SpecialCommand::UploadFiles),
        "/store" | "/store-info" => Ok(SpecialCommand::StoreInfo),
        "/start" | "/start-chat" => Ok(SpecialCommand::StartChat),
        "/reset" | "/reset-chat" => Ok(SpecialCommand::ResetChat),
        "/history" | "/show-history" => Ok(SpecialCommand::History),
        "/export" | "/export-chat" => Ok(SpecialCommand::Export(arg)),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Available Commands
==================

STORE MANAGEMENT:
  /create [name]      - Create a new File Search store (alias: /create-store)
  /list               - List all File Search stores (alias: /list-stores)
  /select <name>      - Select a store for chat (alias: /select-store)
  /delete <name>      - Delete a store and its documents (alias: /delete-store)
  /upload             - Upload the files directory to the selected store (alias: /upload-files)
  /store              - Show the selected store (alias: /store-info)

CHAT:
  /start              - Start a new chat session (alias: /start-chat)
  /reset              - Reset the chat session (alias: /reset-chat)
  /history            - Show the conversation so far (alias: /show-history)
  /export [filename]  - Export the conversation to Markdown (alias: /export-chat)

GENERAL:
  /help               - Show this help message (alias: /?)
  /quit               - Exit the application (alias: /exit)

Any other input is sent to the model. With a store selected, answers are
grounded in its documents and list their sources.
"#
    );
}
