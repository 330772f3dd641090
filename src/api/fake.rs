//! In-memory fake of the remote API for unit and integration tests
//!
//! [`FakeFileSearchApi`] keeps stores, upload operations and generation
//! requests in memory so the store manager, chat client and interactive loop
//! can be driven without network access. Every trait call is counted, which
//! lets tests assert that a code path made no remote call at all.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ragchat::api::{FakeFileSearchApi, FileSearchApi};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fake = Arc::new(FakeFileSearchApi::new());
//! let store = fake.create_store("docs").await.unwrap();
//! assert!(store.name.starts_with("fileSearchStores/"));
//! assert_eq!(fake.call_count("create_store"), 1);
//! # }
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::api::types::{
    Candidate, Content, FileSearchStore, GenerateContentRequest, GenerateContentResponse,
    Operation, Part, Status, UploadFile,
};
use crate::api::FileSearchApi;
use crate::error::{Result, RagChatError};

#[derive(Debug, Default)]
struct PendingOperation {
    remaining_polls: usize,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    stores: Vec<FileSearchStore>,
    next_id: usize,
    calls: HashMap<&'static str, usize>,
    operations: HashMap<String, PendingOperation>,
    uploads: Vec<(String, String)>,
    pending_polls: usize,
    rejected_uploads: HashSet<String>,
    failed_operations: HashSet<String>,
    create_error: Option<String>,
    list_error: bool,
    delete_error: bool,
    generate_error: Option<String>,
    responses: VecDeque<GenerateContentResponse>,
    requests: Vec<(String, GenerateContentRequest)>,
}

/// In-memory implementation of [`FileSearchApi`]
#[derive(Debug, Default)]
pub struct FakeFileSearchApi {
    state: Mutex<FakeState>,
}

impl FakeFileSearchApi {
    /// Create an empty fake
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &'static str) {
        *self.state().calls.entry(method).or_insert(0) += 1;
    }

    /// Seed a store with a fixed resource name
    pub fn with_store(self, name: &str, display_name: &str) -> Self {
        let mut store = FileSearchStore::new(name, Some(display_name.to_string()));
        store.create_time = Some("2025-11-07T10:00:00Z".to_string());
        self.state().stores.push(store);
        self
    }

    /// Number of polls each new upload operation needs before it reports done
    ///
    /// With zero (the default) uploads complete immediately.
    pub fn set_pending_polls(&self, polls: usize) {
        self.state().pending_polls = polls;
    }

    /// Reject the upload request for files with this display name
    pub fn reject_upload(&self, display_name: &str) {
        self.state()
            .rejected_uploads
            .insert(display_name.to_string());
    }

    /// Accept the upload but finish its operation with an error
    pub fn fail_operation_for(&self, display_name: &str) {
        self.state()
            .failed_operations
            .insert(display_name.to_string());
    }

    /// Make `create_store` fail with a remote error
    pub fn fail_create(&self, message: &str) {
        self.state().create_error = Some(message.to_string());
    }

    /// Make `list_stores` fail
    pub fn fail_list(&self) {
        self.state().list_error = true;
    }

    /// Make `delete_store` fail
    pub fn fail_delete(&self) {
        self.state().delete_error = true;
    }

    /// Make `generate_content` fail with a remote error
    pub fn fail_generate(&self, message: &str) {
        self.state().generate_error = Some(message.to_string());
    }

    /// Let `generate_content` succeed again
    pub fn clear_generate_failure(&self) {
        self.state().generate_error = None;
    }

    /// Queue a canned generation response; without one the fake echoes the prompt
    pub fn push_response(&self, response: GenerateContentResponse) {
        self.state().responses.push_back(response);
    }

    /// How often a trait method was called
    pub fn call_count(&self, method: &str) -> usize {
        self.state().calls.get(method).copied().unwrap_or(0)
    }

    /// Total number of trait calls
    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Stores currently held by the fake
    pub fn stores(&self) -> Vec<FileSearchStore> {
        self.state().stores.clone()
    }

    /// `(store name, display name)` of every accepted upload
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.state().uploads.clone()
    }

    /// Names of upload operations that have not completed yet
    pub fn pending_operations(&self) -> Vec<String> {
        self.state()
            .operations
            .iter()
            .filter(|(_, op)| op.remaining_polls > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The most recent generation request
    pub fn last_request(&self) -> Option<(String, GenerateContentRequest)> {
        self.state().requests.last().cloned()
    }

    /// A text response with no grounding
    pub fn text_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part::text(text)],
                }),
                finish_reason: Some("STOP".to_string()),
                grounding_metadata: None,
            }],
            usage_metadata: None,
        }
    }
}

#[async_trait]
impl FileSearchApi for FakeFileSearchApi {
    async fn create_store(&self, display_name: &str) -> Result<FileSearchStore> {
        self.record("create_store");
        let mut state = self.state();
        if let Some(message) = state.create_error.clone() {
            return Err(RagChatError::Remote {
                status: 400,
                message,
            }
            .into());
        }

        state.next_id += 1;
        let slug: String = display_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let mut store = FileSearchStore::new(
            format!("fileSearchStores/{}-{}", slug, state.next_id),
            Some(display_name.to_string()),
        );
        store.create_time = Some("2025-11-07T10:00:00Z".to_string());
        state.stores.push(store.clone());
        Ok(store)
    }

    async fn list_stores(&self) -> Result<Vec<FileSearchStore>> {
        self.record("list_stores");
        let state = self.state();
        if state.list_error {
            return Err(RagChatError::Remote {
                status: 503,
                message: "service unavailable".to_string(),
            }
            .into());
        }
        Ok(state.stores.clone())
    }

    async fn get_store(&self, name: &str) -> Result<FileSearchStore> {
        self.record("get_store");
        self.state()
            .stores
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| RagChatError::NotFound(name.to_string()).into())
    }

    async fn delete_store(&self, name: &str, _force: bool) -> Result<()> {
        self.record("delete_store");
        let mut state = self.state();
        if state.delete_error {
            return Err(RagChatError::Remote {
                status: 500,
                message: "internal error".to_string(),
            }
            .into());
        }
        let before = state.stores.len();
        state.stores.retain(|s| s.name != name);
        if state.stores.len() == before {
            return Err(RagChatError::NotFound(name.to_string()).into());
        }
        Ok(())
    }

    async fn upload_to_store(&self, store_name: &str, file: &UploadFile) -> Result<Operation> {
        self.record("upload_to_store");
        let mut state = self.state();
        if state.rejected_uploads.contains(&file.display_name) {
            return Err(RagChatError::Remote {
                status: 400,
                message: format!("unsupported file: {}", file.display_name),
            }
            .into());
        }
        if !state.stores.iter().any(|s| s.name == store_name) {
            return Err(RagChatError::NotFound(store_name.to_string()).into());
        }

        state.next_id += 1;
        let name = format!("{}/upload/operations/op-{}", store_name, state.next_id);
        let error = state
            .failed_operations
            .contains(&file.display_name)
            .then(|| format!("failed to process {}", file.display_name));
        let remaining_polls = state.pending_polls;
        state.operations.insert(
            name.clone(),
            PendingOperation {
                remaining_polls,
                error: error.clone(),
            },
        );
        state
            .uploads
            .push((store_name.to_string(), file.display_name.clone()));

        if remaining_polls > 0 {
            return Ok(Operation::pending(name));
        }
        Ok(Operation {
            name,
            done: true,
            error: error.map(|message| Status { code: 13, message }),
            response: None,
        })
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        self.record("get_operation");
        let mut state = self.state();
        let op = state
            .operations
            .get_mut(name)
            .ok_or_else(|| RagChatError::NotFound(name.to_string()))?;

        if op.remaining_polls > 0 {
            op.remaining_polls -= 1;
        }
        let done = op.remaining_polls == 0;
        let error = if done {
            op.error.clone().map(|message| Status { code: 13, message })
        } else {
            None
        };

        Ok(Operation {
            name: name.to_string(),
            done,
            error,
            response: None,
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.record("generate_content");
        let mut state = self.state();
        state.requests.push((model.to_string(), request.clone()));

        if let Some(message) = state.generate_error.clone() {
            return Err(RagChatError::Remote {
                status: 429,
                message,
            }
            .into());
        }

        if let Some(response) = state.responses.pop_front() {
            return Ok(response);
        }

        let prompt = request
            .contents
            .last()
            .map(|c| c.answer_texts().join(" "))
            .unwrap_or_default();
        Ok(Self::text_response(&format!("Echo: {}", prompt)))
    }
}
