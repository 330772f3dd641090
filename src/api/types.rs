//! Request and response types for the Gemini File Search and generation API
//!
//! Only the fields this client reads or writes are modelled; everything else
//! in the provider's payloads is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A File Search store as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchStore {
    /// Resource name, e.g. `fileSearchStores/my-store-123abc`
    pub name: String,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// RFC 3339 creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// RFC 3339 last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// Documents ready for retrieval (int64 encoded as string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_documents_count: Option<String>,
    /// Documents still being processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_documents_count: Option<String>,
    /// Documents that failed processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_documents_count: Option<String>,
    /// Total size of raw bytes ingested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
}

impl FileSearchStore {
    /// Create a store reference with only a name and display name
    pub fn new(name: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            display_name,
            create_time: None,
            update_time: None,
            active_documents_count: None,
            pending_documents_count: None,
            failed_documents_count: None,
            size_bytes: None,
        }
    }

    /// Display name, falling back to `N/A`
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or("N/A")
    }
}

/// One page of `fileSearchStores.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileSearchStoresResponse {
    #[serde(default)]
    pub file_search_stores: Vec<FileSearchStore>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error status attached to a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Long-running operation handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation resource name used for polling
    pub name: String,
    /// True once the operation has finished (successfully or not)
    #[serde(default)]
    pub done: bool,
    /// Present when the operation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    /// Operation result payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl Operation {
    /// A pending operation with the given name
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            error: None,
            response: None,
        }
    }
}

/// Local file prepared for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Name shown in citations
    pub display_name: String,
    /// MIME type of the content
    pub mime_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// One piece of message content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Marks thought summaries, which are not part of the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// A plain text part
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }
}

/// A turn of conversation content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Content with a role and text parts
    pub fn with_role(role: &str, texts: &[String]) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: texts.iter().map(|t| Part::text(t.clone())).collect(),
        }
    }

    /// Non-empty answer texts, skipping thought parts
    pub fn answer_texts(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.clone())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// File Search tool attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSearchTool {
    pub file_search_store_names: Vec<String>,
}

/// Tool entry in a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_search: Option<FileSearchTool>,
}

/// Thinking budget settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: i32,
}

/// Generation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Body of `models.generateContent`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Web reference inside a grounding chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Retrieved document reference inside a grounding chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContextChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A grounding source as sent on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
    #[serde(default)]
    pub retrieved_context: Option<RetrievedContextChunk>,
}

/// Search entry point rendered by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntryPoint {
    #[serde(default)]
    pub rendered_content: Option<String>,
}

/// Grounding metadata attached to a candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Answer spans backed by sources; only the count is used
    #[serde(default)]
    pub grounding_supports: Vec<serde_json::Value>,
    #[serde(default)]
    pub search_entry_point: Option<SearchEntryPoint>,
}

/// One response candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Token accounting for a generation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Response of `models.generateContent`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.answer_texts().join(""))
            .unwrap_or_default()
    }
}
