//! Configuration management for ragchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, RagChatError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration structure for ragchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Model and prompt settings for chat sessions
    #[serde(default)]
    pub chat: ChatConfig,
    /// File Search store and upload settings
    #[serde(default)]
    pub file_search: FileSearchConfig,
    /// Chat export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key; normally supplied through `GEMINI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model used for chat sessions
    #[serde(default = "default_model")]
    pub model: String,

    /// System instruction sent with every turn
    #[serde(default = "default_system_instruction")]
    pub system_instruction: Option<String>,

    /// Enable model thinking
    #[serde(default = "default_enable_thinking")]
    pub enable_thinking: bool,

    /// Thinking budget in tokens; unset defers to the model default
    #[serde(default)]
    pub thinking_budget: Option<i32>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_system_instruction() -> Option<String> {
    Some(
        "You are a helpful AI assistant with access to a knowledge base through file search.\n\
         When answering questions, use the information from the uploaded documents to provide \
         accurate and relevant answers.\n\
         Always cite your sources when using information from the documents."
            .to_string(),
    )
}

fn default_enable_thinking() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_instruction: default_system_instruction(),
            enable_thinking: default_enable_thinking(),
            thinking_budget: None,
        }
    }
}

/// File Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSearchConfig {
    /// Local directory scanned by `/upload`
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    /// Prefix for generated store display names
    #[serde(default = "default_store_prefix")]
    pub store_prefix: String,

    /// Interval between upload operation polls (seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Upper bound on waiting for one upload; unset waits until done
    #[serde(default)]
    pub upload_timeout_seconds: Option<u64>,
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("files")
}

fn default_store_prefix() -> String {
    "file-search-chat".to_string()
}

fn default_poll_interval() -> u64 {
    2
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            files_dir: default_files_dir(),
            store_prefix: default_store_prefix(),
            poll_interval_seconds: default_poll_interval(),
            upload_timeout_seconds: None,
        }
    }
}

impl FileSearchConfig {
    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Upload timeout as a `Duration`, if configured
    pub fn upload_timeout(&self) -> Option<Duration> {
        self.upload_timeout_seconds.map(Duration::from_secs)
    }
}

/// Chat export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving exported conversations
    #[serde(default = "default_exports_dir")]
    pub exports_dir: PathBuf,
}

fn default_exports_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            exports_dir: default_exports_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RagChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api.api_key = Some(key);
            }
        }

        if let Ok(api_base) = std::env::var("RAGCHAT_API_BASE") {
            self.api.api_base = api_base;
        }

        if let Ok(model) = std::env::var("RAGCHAT_MODEL") {
            self.chat.model = model;
        }

        if let Ok(budget) = std::env::var("RAGCHAT_THINKING_BUDGET") {
            match budget.parse::<i32>() {
                Ok(value) => {
                    self.chat.thinking_budget = Some(value);
                    tracing::debug!(thinking_budget = value, "Env override: RAGCHAT_THINKING_BUDGET");
                }
                Err(_) => {
                    tracing::warn!("Invalid RAGCHAT_THINKING_BUDGET: {}", budget);
                }
            }
        }

        if let Ok(files_dir) = std::env::var("RAGCHAT_FILES_DIR") {
            self.file_search.files_dir = PathBuf::from(files_dir);
        }

        if let Ok(prefix) = std::env::var("RAGCHAT_STORE_PREFIX") {
            self.file_search.store_prefix = prefix;
        }

        if let Ok(exports_dir) = std::env::var("RAGCHAT_EXPORTS_DIR") {
            self.export.exports_dir = PathBuf::from(exports_dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(model) = &cli.model {
            tracing::debug!("Using model override from CLI: {}", model);
            self.chat.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// Fails fast when the API key is missing, before any interactive state
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        match self.api.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(RagChatError::Config(format!(
                    "{} not found in environment variables. Please set it before starting.",
                    API_KEY_ENV
                ))
                .into());
            }
        }

        if self.api.api_base.trim().is_empty() {
            return Err(RagChatError::Config("api.api_base cannot be empty".to_string()).into());
        }

        if self.chat.model.trim().is_empty() {
            return Err(RagChatError::Config("chat.model cannot be empty".to_string()).into());
        }

        if let Some(budget) = self.chat.thinking_budget {
            if budget < -1 {
                return Err(RagChatError::Config(format!(
                    "chat.thinking_budget must be -1 (dynamic), 0 (off) or positive, got {}",
                    budget
                ))
                .into());
            }
        }

        if self.file_search.store_prefix.trim().is_empty() {
            return Err(RagChatError::Config(
                "file_search.store_prefix cannot be empty".to_string(),
            )
            .into());
        }

        if self.file_search.poll_interval_seconds == 0 {
            return Err(RagChatError::Config(
                "file_search.poll_interval_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.file_search.upload_timeout_seconds == Some(0) {
            return Err(RagChatError::Config(
                "file_search.upload_timeout_seconds must be greater than 0 when set".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Create the local files directory if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_directories(&self) -> Result<()> {
        if !self.file_search.files_dir.exists() {
            std::fs::create_dir_all(&self.file_search.files_dir)?;
            tracing::debug!(
                "Created files directory {}",
                self.file_search.files_dir.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use serial_test::serial;

    fn with_key() -> Config {
        let mut config = Config::default();
        config.api.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chat.model, "gemini-2.5-flash");
        assert!(config.chat.enable_thinking);
        assert_eq!(config.chat.thinking_budget, None);
        assert_eq!(config.file_search.store_prefix, "file-search-chat");
        assert_eq!(config.file_search.poll_interval_seconds, 2);
        assert_eq!(config.file_search.upload_timeout_seconds, None);
        assert_eq!(config.export.exports_dir, PathBuf::from("exports"));
        assert!(config.chat.system_instruction.is_some());
    }

    #[test]
    fn test_validate_missing_key_fails() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_validate_blank_key_fails() {
        let mut config = Config::default();
        config.api.api_key = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_success() {
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = with_key();
        config.chat.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_thinking_budget() {
        let mut config = with_key();
        config.chat.thinking_budget = Some(-1);
        assert!(config.validate().is_ok());
        config.chat.thinking_budget = Some(0);
        assert!(config.validate().is_ok());
        config.chat.thinking_budget = Some(-2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let mut config = with_key();
        config.file_search.poll_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_upload_timeout() {
        let mut config = with_key();
        config.file_search.upload_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
        config.file_search.upload_timeout_seconds = Some(60);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.file_search.upload_timeout(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_parse_partial_yaml_uses_defaults() {
        let yaml = r#"
chat:
  model: gemini-2.5-pro
  thinking_budget: 1024
file_search:
  store_prefix: docs
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chat.model, "gemini-2.5-pro");
        assert_eq!(config.chat.thinking_budget, Some(1024));
        assert!(config.chat.enable_thinking);
        assert_eq!(config.file_search.store_prefix, "docs");
        assert_eq!(config.file_search.poll_interval_seconds, 2);
        assert_eq!(config.api.api_base, default_api_base());
    }

    #[test]
    fn test_sample_config_parses() {
        let yaml = include_str!("../config/config.yaml");
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chat.model, "gemini-2.5-flash");
        assert!(config.api.api_key.is_none());
        assert_eq!(config.file_search.upload_timeout_seconds, None);
        assert!(config
            .chat
            .system_instruction
            .unwrap()
            .contains("cite your sources"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = with_key();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("test-key"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults_and_env() {
        std::env::set_var(API_KEY_ENV, "env-key");
        std::env::set_var("RAGCHAT_MODEL", "gemini-2.0-flash");
        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var("RAGCHAT_MODEL");

        assert_eq!(config.api.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.chat.model, "gemini-2.0-flash");
    }

    #[test]
    #[serial]
    fn test_load_from_file_with_cli_model_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "chat:\n  model: from-file\n").unwrap();

        let cli = Cli {
            model: Some("from-cli".to_string()),
            ..Cli::default()
        };
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.chat.model, "from-cli");
    }

    #[test]
    #[serial]
    fn test_invalid_thinking_budget_env_is_ignored() {
        std::env::set_var("RAGCHAT_THINKING_BUDGET", "lots");
        let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
        std::env::remove_var("RAGCHAT_THINKING_BUDGET");
        assert_eq!(config.chat.thinking_budget, None);
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "chat: [unclosed").unwrap();
        let result = Config::load(path.to_str().unwrap(), &Cli::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_directories_creates_files_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = with_key();
        config.file_search.files_dir = dir.path().join("files");
        config.ensure_directories().unwrap();
        assert!(config.file_search.files_dir.is_dir());
    }
}
