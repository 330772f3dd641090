//! Gemini API client implementation for ragchat
//!
//! This module implements [`FileSearchApi`] over HTTP against the Gemini
//! `v1beta` REST surface: File Search store management, resumable uploads,
//! operation polling and `generateContent`.

use crate::api::types::{
    FileSearchStore, GenerateContentRequest, GenerateContentResponse,
    ListFileSearchStoresResponse, Operation, UploadFile,
};
use crate::api::FileSearchApi;
use crate::config::ApiConfig;
use crate::error::{Result, RagChatError};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const LIST_PAGE_SIZE: &str = "20";

/// HTTP client for the Gemini API
///
/// # Examples
///
/// ```no_run
/// use ragchat::api::{FileSearchApi, GeminiClient};
/// use ragchat::config::ApiConfig;
///
/// # async fn example() -> ragchat::error::Result<()> {
/// let config = ApiConfig {
///     api_key: Some("my-key".to_string()),
///     ..ApiConfig::default()
/// };
/// let client = GeminiClient::new(&config)?;
/// let stores = client.list_stores().await?;
/// println!("{} stores", stores.len());
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiClient {
    /// Create a new client from API configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RagChatError::Config("API key is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("ragchat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!("Initialized Gemini client: api_base={}", config.api_base);

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Base URL this client talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn upload_endpoint(&self, path: &str) -> String {
        format!(
            "{}/upload/v1beta/{}",
            self.api_base,
            path.trim_start_matches('/')
        )
    }

    /// Turn a non-success response into a typed error
    async fn check_status(response: Response, resource: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) => format!("{} ({})", envelope.error.message, code),
                None => envelope.error.message,
            },
            Err(_) => body,
        };

        tracing::warn!("Gemini API returned {} for {}: {}", status, resource, message);

        if status.as_u16() == 404 {
            return Err(RagChatError::NotFound(resource.to_string()).into());
        }

        Err(RagChatError::Remote {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    async fn parse<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T> {
        let response = Self::check_status(response, resource).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse response for {}: {}", resource, e);
            RagChatError::Serialization(e).into()
        })
    }
}

/// Normalize a model id into its `models/...` resource path
pub fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

#[async_trait]
impl FileSearchApi for GeminiClient {
    async fn create_store(&self, display_name: &str) -> Result<FileSearchStore> {
        let url = self.endpoint("fileSearchStores");
        tracing::debug!("Creating file search store: {}", display_name);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "displayName": display_name }))
            .send()
            .await?;

        Self::parse(response, "fileSearchStores").await
    }

    async fn list_stores(&self) -> Result<Vec<FileSearchStore>> {
        let url = self.endpoint("fileSearchStores");
        let mut stores = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListFileSearchStoresResponse =
                Self::parse(request.send().await?, "fileSearchStores").await?;
            stores.extend(page.file_search_stores);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Listed {} file search stores", stores.len());
        Ok(stores)
    }

    async fn get_store(&self, name: &str) -> Result<FileSearchStore> {
        let response = self
            .client
            .get(self.endpoint(name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse(response, name).await
    }

    async fn delete_store(&self, name: &str, force: bool) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(name))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("force", if force { "true" } else { "false" })])
            .send()
            .await?;

        Self::check_status(response, name).await?;
        Ok(())
    }

    async fn upload_to_store(&self, store_name: &str, file: &UploadFile) -> Result<Operation> {
        let start_url = self.upload_endpoint(&format!("{}:uploadToFileSearchStore", store_name));
        tracing::debug!(
            "Starting resumable upload of {} ({} bytes) to {}",
            file.display_name,
            file.bytes.len(),
            store_name
        );

        let start = self
            .client
            .post(&start_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header(
                "X-Goog-Upload-Header-Content-Length",
                file.bytes.len().to_string(),
            )
            .header("X-Goog-Upload-Header-Content-Type", &file.mime_type)
            .json(&serde_json::json!({
                "displayName": file.display_name,
                "mimeType": file.mime_type,
            }))
            .send()
            .await?;
        let start = Self::check_status(start, store_name).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| RagChatError::UploadFailed("upload session URL missing".to_string()))?;
        let session_url = Url::parse(session_url).map_err(|e| {
            RagChatError::UploadFailed(format!("invalid upload session URL: {}", e))
        })?;

        let finish = self
            .client
            .post(session_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header("X-Goog-Upload-Offset", "0")
            .body(file.bytes.clone())
            .send()
            .await?;

        Self::parse(finish, store_name).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        let response = self
            .client
            .get(self.endpoint(name))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse(response, name).await
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let model = model_path(model);
        let url = self.endpoint(&format!("{}:generateContent", model));
        tracing::debug!(
            "Sending generateContent to {} with {} content turns",
            model,
            request.contents.len()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse(response, &model).await
    }
}
