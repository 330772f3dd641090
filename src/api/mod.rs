//! Remote API abstraction for ragchat
//!
//! This module defines the [`FileSearchApi`] trait covering every remote
//! operation the client uses, along with the HTTP implementation talking to
//! the Gemini API and an in-memory fake for tests.

pub mod fake;
pub mod gemini;
pub mod types;

pub use fake::FakeFileSearchApi;
pub use gemini::GeminiClient;
pub use types::{
    Candidate, Content, FileSearchStore, FileSearchTool, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GroundingChunk, GroundingMetadata, Operation, Part,
    Status, ThinkingConfig, Tool, UploadFile, UsageMetadata,
};

use crate::error::Result;
use async_trait::async_trait;

/// Remote operations for File Search stores and content generation
///
/// Implementations return [`crate::error::RagChatError::NotFound`] when a
/// named resource does not exist and [`crate::error::RagChatError::Remote`]
/// for any other rejected request.
#[async_trait]
pub trait FileSearchApi: Send + Sync {
    /// Create a store with the given display name
    async fn create_store(&self, display_name: &str) -> Result<FileSearchStore>;

    /// List all stores, in remote order
    async fn list_stores(&self) -> Result<Vec<FileSearchStore>>;

    /// Fetch one store by resource name
    async fn get_store(&self, name: &str) -> Result<FileSearchStore>;

    /// Delete a store; `force` also deletes the documents it contains
    async fn delete_store(&self, name: &str, force: bool) -> Result<()>;

    /// Submit a file for ingestion and return the operation tracking it
    async fn upload_to_store(&self, store_name: &str, file: &UploadFile) -> Result<Operation>;

    /// Fetch the current state of an operation
    async fn get_operation(&self, name: &str) -> Result<Operation>;

    /// Run one generation call against a model
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}
