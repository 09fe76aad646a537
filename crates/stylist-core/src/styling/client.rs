//! Gemini client for the `generateContent` endpoint
//!
//! Performs exactly one HTTP exchange per call, with no retry. Failures
//! surface to the caller as [`BackendError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::wire::{GenerateContentRequest, GenerateContentResponse};

/// Gemini API base URL
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default image-capable model
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Longest error body kept for logs
const MAX_ERROR_BODY: usize = 512;

/// Failure of a single exchange with the generation service
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication rejected ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("quota or rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    InvalidResponse(String),
}

/// Transport seam for the style client
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submit one request and parse the response
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError>;
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Builder for GeminiClient
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    http_client: Option<HttpClient>,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            timeout_secs: None,
            http_client: None,
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL (defaults to the public Gemini endpoint)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a client-side request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Use a preconfigured HTTP client; the timeout setting is then ignored
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the GeminiClient
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingCredential)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = HttpClient::builder();
                if let Some(secs) = self.timeout_secs {
                    builder = builder.timeout(Duration::from_secs(secs));
                }
                builder
                    .build()
                    .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?
            }
        };

        Ok(GeminiClient {
            http_client,
            api_key,
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl GeminiClient {
    /// Create a new GeminiClient with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        GeminiClientBuilder::new().api_key(api_key).build()
    }

    /// Create a new builder
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Build from configuration, resolving the key from the environment
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let mut builder = GeminiClientBuilder::new()
            .api_key(config.require_api_key()?)
            .base_url(config.base_url.clone())
            .model(config.model.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout_secs(secs);
        }
        builder.build()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError> {
        let url = self.endpoint();

        debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

fn classify_error_status(status: u16, body: String) -> BackendError {
    let body = truncate(body);
    match status {
        401 | 403 => BackendError::Unauthorized { status, body },
        429 => BackendError::RateLimited(body),
        _ => BackendError::Status { status, body },
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}
