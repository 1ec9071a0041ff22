use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-request generation overrides. Unset fields fall back to client defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the backend for a JSON object answer (defaults to true)
    pub json_output: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub config: GenerationConfig,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            config: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No API key configured for {0}")]
    Authentication(String),

    #[error("HTTP {status}: {body}")]
    Network { status: u16, body: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[allow(async_fn_in_trait)]
pub trait ProviderClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Model ids offered by the backend. Empty on any failure.
    async fn fetch_models(&self) -> Vec<String>;
}
