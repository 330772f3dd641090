//! Chat client for grounded conversations
//!
//! [`ChatClient`] owns at most one [`ChatSession`] and the list of File
//! Search stores used to ground the next turn. Each call to
//! [`ChatClient::send_message`] builds a fresh [`TurnConfig`] from the
//! session-wide [`ChatSettings`] and the current store selection, so
//! changing the selection never rewrites history already recorded.

use crate::api::types::{
    Content, FileSearchTool, GenerateContentRequest, GenerationConfig, Part, ThinkingConfig,
    Tool, UsageMetadata,
};
use crate::api::FileSearchApi;
use crate::config::ChatConfig;
use crate::error::RagChatError;
use crate::grounding::Grounding;

use chrono::{DateTime, Local};
use colored::Colorize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Model => write!(f, "MODEL"),
        }
    }
}

/// One recorded message in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    /// Text segments in order
    pub segments: Vec<String>,
    /// Citations, for model messages that were grounded
    pub grounding: Option<Grounding>,
}

impl ChatMessage {
    /// A user message with a single segment
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            segments: vec![text.into()],
            grounding: None,
        }
    }

    /// A model message
    pub fn model(segments: Vec<String>, grounding: Option<Grounding>) -> Self {
        Self {
            role: Role::Model,
            segments,
            grounding,
        }
    }

    /// Segments joined into one body, as printed for the answer
    pub fn text(&self) -> String {
        self.segments.concat()
    }

    fn to_content(&self) -> Content {
        Content::with_role(self.role.as_str(), &self.segments)
    }
}

/// Result of one successful turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    /// Primary answer text
    pub text: String,
    /// Grounding of the first candidate
    pub grounding: Option<Grounding>,
    /// Token accounting, when reported
    pub usage: Option<UsageMetadata>,
}

/// Thinking ("reasoning effort") setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingSetting {
    pub enabled: bool,
    /// Explicit budget; `None` defers to the model default
    pub budget: Option<i32>,
}

/// Settings fixed for the lifetime of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub model: String,
    pub system_instruction: Option<String>,
    pub thinking: ThinkingSetting,
}

impl From<&ChatConfig> for ChatSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_instruction: config
                .system_instruction
                .clone()
                .filter(|s| !s.trim().is_empty()),
            thinking: ThinkingSetting {
                enabled: config.enable_thinking,
                budget: config.thinking_budget,
            },
        }
    }
}

/// Per-call generation configuration
///
/// Built once per [`ChatClient::send_message`] call and turned into the
/// request body; fields left `None`/empty are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnConfig {
    pub system_instruction: Option<String>,
    pub thinking_budget: Option<i32>,
    pub file_search_store_names: Vec<String>,
}

impl TurnConfig {
    /// Derive the configuration for the next turn
    pub fn build(settings: &ChatSettings, store_names: &[String]) -> Self {
        let thinking_budget = if settings.thinking.enabled {
            settings.thinking.budget
        } else {
            None
        };

        Self {
            system_instruction: settings.system_instruction.clone(),
            thinking_budget,
            file_search_store_names: store_names.to_vec(),
        }
    }

    /// Assemble the request body for the given conversation contents
    pub fn into_request(self, contents: Vec<Content>) -> GenerateContentRequest {
        let tools = if self.file_search_store_names.is_empty() {
            None
        } else {
            Some(vec![Tool {
                file_search: Some(FileSearchTool {
                    file_search_store_names: self.file_search_store_names,
                }),
            }])
        };

        GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part::text(text)],
            }),
            tools,
            generation_config: self.thinking_budget.map(|budget| GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: budget,
                }),
            }),
        }
    }
}

/// A conversation with the model
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub model: String,
    pub started_at: DateTime<Local>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    fn new(model: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.to_string(),
            started_at: Local::now(),
            history: Vec::new(),
        }
    }

    /// Recorded messages, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }
}

/// Client for chat turns against the generation API
pub struct ChatClient {
    api: Arc<dyn FileSearchApi>,
    settings: ChatSettings,
    session: Option<ChatSession>,
    store_names: Vec<String>,
}

impl ChatClient {
    /// Create a client with no active session and no stores selected
    pub fn new(api: Arc<dyn FileSearchApi>, settings: ChatSettings) -> Self {
        Self {
            api,
            settings,
            session: None,
            store_names: Vec::new(),
        }
    }

    /// Session-wide settings
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// The active session, if any
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// True when a session is active
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Stores used to ground the next turn
    pub fn file_search_stores(&self) -> &[String] {
        &self.store_names
    }

    /// Replace the stores used by subsequent turns
    pub fn set_file_search_stores(&mut self, names: Vec<String>) {
        tracing::debug!("Grounding stores set to {:?}", names);
        self.store_names = names;
    }

    /// Start a new session, replacing any existing one
    pub fn start_session(&mut self) -> bool {
        let session = ChatSession::new(&self.settings.model);
        tracing::info!(session_id = %session.id, model = %session.model, "Chat session started");

        println!(
            "\nChat session started with model: {}",
            self.settings.model.cyan()
        );
        if self.settings.system_instruction.is_some() {
            println!("System instruction applied.");
        }
        if self.settings.thinking.enabled {
            match self.settings.thinking.budget {
                Some(budget) => println!("Thinking enabled (budget: {} tokens).", budget),
                None => println!("Dynamic thinking enabled."),
            }
        }

        self.session = Some(session);
        true
    }

    /// Send one user message and record the exchange on success
    ///
    /// Returns `None` without any remote call when no session is active,
    /// and `None` after reporting the error when the remote call fails.
    pub async fn send_message(&mut self, text: &str) -> Option<ChatResponse> {
        let Some(session) = self.session.as_ref() else {
            eprintln!("{}", format!("Error: {}", RagChatError::NoActiveSession).red());
            return None;
        };

        let user_message = ChatMessage::user(text);
        let mut contents: Vec<Content> = session
            .history
            .iter()
            .map(ChatMessage::to_content)
            .collect();
        contents.push(user_message.to_content());

        let request = TurnConfig::build(&self.settings, &self.store_names).into_request(contents);

        let response = match self
            .api
            .generate_content(&self.settings.model, &request)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("generateContent failed: {:#}", e);
                eprintln!("{}", format!("\nError sending message: {}", e).red());
                return None;
            }
        };

        let candidate = response.candidates.first();
        let segments = candidate
            .and_then(|c| c.content.as_ref())
            .map(|c| c.answer_texts())
            .unwrap_or_default();
        let grounding = candidate
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(Grounding::from)
            .filter(|g| !g.is_empty());

        let chat_response = ChatResponse {
            text: response.text(),
            grounding: grounding.clone(),
            usage: response.usage_metadata,
        };

        // A model turn with no parts is rejected when resent, so a blocked or
        // empty answer leaves history untouched.
        if segments.is_empty() {
            let reason = candidate
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            tracing::warn!("Model returned no text (finish reason: {})", reason);
            eprintln!(
                "{}",
                format!(
                    "\nThe model returned no answer (finish reason: {}). This exchange was not recorded.",
                    reason
                )
                .yellow()
            );
            return Some(chat_response);
        }

        if let Some(session) = self.session.as_mut() {
            session.history.push(user_message);
            session.history.push(ChatMessage::model(segments, grounding));
        }

        Some(chat_response)
    }

    /// Messages of the active session, oldest first
    pub fn get_history(&self) -> Vec<ChatMessage> {
        self.session
            .as_ref()
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Drop the active session
    pub fn reset_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.id, "Chat session reset");
        }
        println!("\nChat session reset.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Candidate, GenerateContentResponse, GroundingChunk};
    use crate::api::types::{GroundingMetadata, RetrievedContextChunk};
    use crate::api::FakeFileSearchApi;

    fn settings() -> ChatSettings {
        ChatSettings {
            model: "gemini-2.5-flash".to_string(),
            system_instruction: Some("Be helpful".to_string()),
            thinking: ThinkingSetting {
                enabled: true,
                budget: None,
            },
        }
    }

    fn client(fake: &Arc<FakeFileSearchApi>) -> ChatClient {
        ChatClient::new(fake.clone(), settings())
    }

    #[test]
    fn test_turn_config_omits_budget_when_unset() {
        let config = TurnConfig::build(&settings(), &[]);
        assert_eq!(config.thinking_budget, None);
        let request = config.into_request(vec![]);
        assert!(request.generation_config.is_none());
        assert!(request.tools.is_none());
        assert!(request.system_instruction.is_some());
    }

    #[test]
    fn test_turn_config_includes_budget_when_enabled_and_set() {
        let mut s = settings();
        s.thinking.budget = Some(1024);
        let request = TurnConfig::build(&s, &[]).into_request(vec![]);
        assert_eq!(
            request.generation_config.unwrap().thinking_config,
            Some(ThinkingConfig {
                thinking_budget: 1024
            })
        );
    }

    #[test]
    fn test_turn_config_ignores_budget_when_disabled() {
        let mut s = settings();
        s.thinking = ThinkingSetting {
            enabled: false,
            budget: Some(1024),
        };
        let config = TurnConfig::build(&s, &[]);
        assert_eq!(config.thinking_budget, None);
    }

    #[test]
    fn test_turn_config_attaches_stores() {
        let names = vec!["fileSearchStores/a".to_string()];
        let request = TurnConfig::build(&settings(), &names).into_request(vec![]);
        let tools = request.tools.unwrap();
        assert_eq!(
            tools[0].file_search.as_ref().unwrap().file_search_store_names,
            names
        );
    }

    #[test]
    fn test_system_instruction_has_no_role() {
        let request = TurnConfig::build(&settings(), &[]).into_request(vec![]);
        let instruction = request.system_instruction.unwrap();
        assert!(instruction.role.is_none());
        assert_eq!(instruction.parts[0].text.as_deref(), Some("Be helpful"));
    }

    #[test]
    fn test_settings_from_config_drops_blank_instruction() {
        let config = ChatConfig {
            system_instruction: Some("  ".to_string()),
            ..ChatConfig::default()
        };
        assert!(ChatSettings::from(&config).system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_send_without_session_makes_no_call() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        assert!(chat.send_message("hello").await.is_none());
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_send_records_history() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        assert!(chat.start_session());

        let response = chat.send_message("hello").await.unwrap();
        assert_eq!(response.text, "Echo: hello");

        let history = chat.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text(), "hello");
        assert_eq!(history[1].role, Role::Model);
        assert_eq!(history[1].text(), "Echo: hello");
    }

    #[tokio::test]
    async fn test_second_turn_sends_full_history() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        chat.start_session();
        chat.send_message("one").await.unwrap();
        chat.send_message("two").await.unwrap();

        let (model, request) = fake.last_request().unwrap();
        assert_eq!(model, "gemini-2.5-flash");
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
        assert_eq!(request.contents[2].parts[0].text.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_failure_keeps_session_usable() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        chat.start_session();

        fake.fail_generate("quota exceeded");
        assert!(chat.send_message("hello").await.is_none());
        assert!(chat.has_session());
        assert!(chat.get_history().is_empty());

        fake.clear_generate_failure();
        assert!(chat.send_message("again").await.is_some());
        assert_eq!(chat.get_history().len(), 2);
    }

    #[tokio::test]
    async fn test_store_selection_applies_to_next_turn_only() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        chat.start_session();
        chat.send_message("ungrounded").await.unwrap();
        assert!(fake.last_request().unwrap().1.tools.is_none());

        chat.set_file_search_stores(vec!["fileSearchStores/docs".to_string()]);
        chat.send_message("grounded").await.unwrap();
        assert!(fake.last_request().unwrap().1.tools.is_some());
        assert_eq!(chat.get_history().len(), 4);
    }

    #[tokio::test]
    async fn test_grounding_is_recorded_on_model_message() {
        let fake = Arc::new(FakeFileSearchApi::new());
        fake.push_response(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part::text("From the handbook.")],
                }),
                finish_reason: None,
                grounding_metadata: Some(GroundingMetadata {
                    grounding_chunks: vec![GroundingChunk {
                        web: None,
                        retrieved_context: Some(RetrievedContextChunk {
                            uri: None,
                            title: Some("handbook.pdf".to_string()),
                            text: None,
                        }),
                    }],
                    grounding_supports: vec![serde_json::json!({})],
                    search_entry_point: None,
                }),
            }],
            usage_metadata: None,
        });

        let mut chat = client(&fake);
        chat.start_session();
        let response = chat.send_message("what does it say?").await.unwrap();
        let grounding = response.grounding.unwrap();
        assert_eq!(grounding.sources.len(), 1);
        assert_eq!(grounding.grounded_segments, 1);

        let history = chat.get_history();
        assert!(history[0].grounding.is_none());
        assert_eq!(history[1].grounding.as_ref(), Some(&grounding));
    }

    #[tokio::test]
    async fn test_blocked_answer_is_not_resent() {
        let fake = Arc::new(FakeFileSearchApi::new());
        fake.push_response(GenerateContentResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("SAFETY".to_string()),
                grounding_metadata: None,
            }],
            usage_metadata: None,
        });

        let mut chat = client(&fake);
        chat.start_session();
        let blocked = chat.send_message("blocked?").await.unwrap();
        assert!(blocked.text.is_empty());
        assert!(chat.get_history().is_empty());

        let response = chat.send_message("next").await.unwrap();
        assert_eq!(response.text, "Echo: next");

        let (_, request) = fake.last_request().unwrap();
        assert_eq!(request.contents.len(), 1);
        assert!(request.contents.iter().all(|c| !c.parts.is_empty()));
        assert_eq!(chat.get_history().len(), 2);
    }

    #[tokio::test]
    async fn test_multi_part_answer_matches_history_text() {
        let fake = Arc::new(FakeFileSearchApi::new());
        fake.push_response(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part::text("Hello "), Part::text("world")],
                }),
                finish_reason: Some("STOP".to_string()),
                grounding_metadata: None,
            }],
            usage_metadata: None,
        });

        let mut chat = client(&fake);
        chat.start_session();
        let response = chat.send_message("greet").await.unwrap();
        let history = chat.get_history();
        assert_eq!(response.text, "Hello world");
        assert_eq!(history[1].text(), response.text);
    }

    #[tokio::test]
    async fn test_reset_drops_session() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        chat.start_session();
        chat.send_message("hi").await.unwrap();
        chat.reset_session();
        assert!(!chat.has_session());
        assert!(chat.get_history().is_empty());
        assert!(chat.send_message("hi").await.is_none());
    }

    #[tokio::test]
    async fn test_start_replaces_existing_session() {
        let fake = Arc::new(FakeFileSearchApi::new());
        let mut chat = client(&fake);
        chat.start_session();
        let first = chat.session().unwrap().id;
        chat.send_message("hi").await.unwrap();
        chat.start_session();
        assert_ne!(chat.session().unwrap().id, first);
        assert!(chat.get_history().is_empty());
    }
}
