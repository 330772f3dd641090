/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: interactive chat loop over File Search stores
- `stores`: headless store management
- `upload`: headless file and directory uploads

The handlers build the Gemini client from configuration and delegate to the
library components: store manager, chat client and renderers.
*/

use crate::api::{FileSearchApi, GeminiClient};
use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

// Line input sources for the interactive loop
pub mod input;

// Read-dispatch-print loop
pub mod interactive;

// Special commands parser for the interactive loop
pub mod special_commands;

// Non-interactive store and upload commands
pub mod stores;

/// Build the production API client
fn gemini_api(config: &Config) -> Result<Arc<dyn FileSearchApi>> {
    Ok(Arc::new(GeminiClient::new(&config.api)?))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates the Gemini client and a rustyline editor, optionally selects a
    //! store, and runs the interactive loop until the user quits.

    use super::*;
    use crate::commands::input::RustylineInput;
    use crate::commands::interactive::InteractiveSession;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `store` - Optional store to select before the first prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::commands::chat;
    /// use ragchat::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), None).await?;
    /// ```
    pub async fn run_chat(config: Config, store: Option<String>) -> Result<()> {
        let api = gemini_api(&config)?;
        let input = RustylineInput::new()?;
        let mut session = InteractiveSession::new(config, api, input);

        if let Some(name) = store {
            session.select_store(&name).await;
        }

        session.run().await
    }
}

/// Handle `ragchat stores ...` against the Gemini API
///
/// # Errors
///
/// Returns error if the client cannot be built or the command fails
pub async fn run_stores(config: Config, command: crate::cli::StoreCommand) -> Result<()> {
    let api = gemini_api(&config)?;
    stores::handle_stores(api, &config, command).await
}

/// Handle `ragchat upload ...` against the Gemini API
///
/// # Errors
///
/// Returns error if the client cannot be built or nothing was uploaded
pub async fn run_upload(
    config: Config,
    store: String,
    path: Option<std::path::PathBuf>,
) -> Result<()> {
    let api = gemini_api(&config)?;
    stores::handle_upload(api, &config, &store, path.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_api_requires_key() {
        assert!(gemini_api(&Config::default()).is_err());
    }

    #[test]
    fn test_gemini_api_with_key() {
        let mut config = Config::default();
        config.api.api_key = Some("test-key".to_string());
        assert!(gemini_api(&config).is_ok());
    }
}
