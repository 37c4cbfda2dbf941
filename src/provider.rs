//! Model Provider Abstraction
//!
//! Interface for calling a generative model with a structured-output schema,
//! plus the Google Gemini `generateContent` client used to produce lessons.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-2.5-flash-lite";

/// Provider configuration (`[provider]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API root, without the `/v1beta` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model tried first
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Lighter model tried once when the primary is rate limited
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub default_options: CompletionOptions,
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_primary_model() -> String {
    DEFAULT_PRIMARY_MODEL.to_string()
}

fn default_fallback_model() -> String {
    DEFAULT_FALLBACK_MODEL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            default_options: CompletionOptions::default(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.primary_model.trim().is_empty() {
            return Err("Primary model cannot be empty".to_string());
        }
        if self.fallback_model.trim().is_empty() {
            return Err("Fallback model cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }
        if let Some(temp) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(format!("Temperature must be within 0.0-2.0, got {}", temp));
            }
        }
        Ok(())
    }
}

/// Completion options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,       // 0.0-2.0
    pub max_output_tokens: Option<u32>, // Maximum tokens to generate
    pub top_p: Option<f32>,             // Nucleus sampling
}

/// A single structured-output request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub prompt: String,
    /// JSON schema the response text must satisfy
    pub response_schema: Option<Value>,
    pub options: CompletionOptions,
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Run one request against `request.model`
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// List models reachable with the configured credential
    async fn list_models(&self) -> Result<Vec<String>, ApiError>;
}

// Gemini REST request/response structures
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

fn build_request_body(request: &CompletionRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: request
            .system_instruction
            .as_deref()
            .map(|s| text_content(None, s)),
        contents: vec![text_content(Some("user"), &request.prompt)],
        generation_config: GenerationConfig {
            response_mime_type: request
                .response_schema
                .as_ref()
                .map(|_| "application/json".to_string()),
            response_schema: request.response_schema.clone(),
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_output_tokens,
            top_p: request.options.top_p,
        },
    }
}

// Helper function to map transport errors to ApiError
fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        map_status_error(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Network timeout, request timed out: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Network connection error: {}", error))
    } else if error.is_request() {
        ApiError::ProviderRequestFailed(format!("Network request could not be sent: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: u16, body: &str) -> ApiError {
    match status {
        401 | 403 => ApiError::ProviderAuthFailed(format!(
            "Authentication failed ({}): {}",
            status, body
        )),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded (429): {}", body)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found (404): {}", body)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

fn build_provider_http_client(config: &ProviderConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

/// Google Gemini provider client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &ProviderConfig) -> Result<Self, ApiError> {
        let client = build_provider_http_client(config)?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ModelProviderClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ApiError> {
        let body = build_request_body(&request);
        let url = self.generate_url(&request.model);
        tracing::debug!(model = %request.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status.as_u16(), &error_text));
        }

        let completion: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let candidate = completion
            .candidates
            .first()
            .ok_or_else(|| ApiError::ProviderError("No candidates in response".to_string()))?;

        let content: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        let usage = completion
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: completion.model_version.unwrap_or(request.model),
            usage,
            finish_reason: candidate.finish_reason.clone(),
        })
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn list_models(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status.as_u16(), &error_text));
        }

        #[derive(Deserialize)]
        struct ModelsResponse {
            #[serde(default)]
            models: Vec<ModelInfo>,
        }
        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let models: ModelsResponse = response.json().await.map_err(|e| {
            ApiError::ProviderError(format!("Failed to parse models response: {}", e))
        })?;

        Ok(models
            .models
            .into_iter()
            .map(|m| {
                m.name
                    .strip_prefix("models/")
                    .map(str::to_string)
                    .unwrap_or(m.name)
            })
            .collect())
    }
}

/// Builds a provider client once a credential is known
pub trait ProviderFactory: Send + Sync {
    fn create_client(&self, api_key: &str) -> Result<Arc<dyn ModelProviderClient>, ApiError>;
}

/// Factory for [`GeminiClient`]
pub struct GeminiProviderFactory {
    config: ProviderConfig,
}

impl GeminiProviderFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for GeminiProviderFactory {
    fn create_client(&self, api_key: &str) -> Result<Arc<dyn ModelProviderClient>, ApiError> {
        Ok(Arc::new(GeminiClient::new(api_key.to_string(), &self.config)?))
    }
}

/// Request body as sent on the wire, for diagnostics and tests.
pub fn request_body_json(request: &CompletionRequest) -> Value {
    serde_json::to_value(build_request_body(request)).unwrap_or_else(|_| json!({}))
}
