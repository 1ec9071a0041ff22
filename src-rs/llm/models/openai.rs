use serde::Deserialize;
use serde_json::{json, Value};

use crate::cons::provider_cons::ProviderCode;
use crate::llm::models::provider_base::{
    CompletionRequest, CompletionResponse, Message, ProviderClient, ProviderError,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Client for any backend speaking the OpenAI chat-completions protocol.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    pub provider: ProviderCode,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub chat_completion_path: String,
    pub models_path: String,
    http_client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(
        provider: ProviderCode,
        base_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        let descriptor = provider.descriptor();
        Self {
            provider,
            base_url,
            api_key,
            model,
            chat_completion_path: descriptor.chat_completion_path.to_string(),
            models_path: descriptor.models_path.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn chat_completion_url(&self) -> String {
        join_url(&self.base_url, &self.chat_completion_path)
    }

    pub fn models_url(&self) -> String {
        join_url(&self.base_url, &self.models_path)
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_key = self
            .api_key()
            .ok_or_else(|| ProviderError::Authentication(self.provider.descriptor().name.to_string()))?;

        let model = request
            .config
            .model
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let request_body = build_chat_completions_request_body(&model, &request);
        let url = self.chat_completion_url();
        log::debug!(
            "POST {} model={} messages={}",
            url,
            model,
            request.messages.len()
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            log::warn!("LLM API error ({}): {}", status, body);
            return Err(ProviderError::Network { status, body });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Unknown(format!("Failed to parse response JSON: {}", e)))?;

        let text = extract_completion_text(&json)
            .ok_or_else(|| ProviderError::Unknown("Response contained no completion".to_string()))?;
        Ok(CompletionResponse { text })
    }

    pub async fn fetch_models(&self) -> Vec<String> {
        let Some(api_key) = self.api_key() else {
            log::debug!("Skipping model listing for {}: no API key", self.provider);
            return Vec::new();
        };
        let url = self.models_url();

        let response = match self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Failed to list models from {}: {}", url, e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            log::warn!("Model listing at {} returned {}", url, response.status());
            return Vec::new();
        }

        match response.json::<ModelsResponse>().await {
            Ok(body) => body.data.into_iter().map(|m| m.id).collect(),
            Err(e) => {
                log::warn!("Malformed model listing from {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

impl ProviderClient for ChatCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.complete(request).await
    }

    async fn fetch_models(&self) -> Vec<String> {
        self.fetch_models().await
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn build_chat_completions_request_body(model: &str, request: &CompletionRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m: &Message| {
            json!({
                "role": m.role,
                "content": m.content,
            })
        })
        .collect();

    let mut request_body = json!({
        "model": model,
        "messages": messages,
        "max_tokens": request.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "temperature": request.config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        "stream": false,
    });
    if request.config.json_output.unwrap_or(true) {
        request_body["response_format"] = json!({ "type": "json_object" });
    }
    request_body
}

pub(crate) fn extract_completion_text(json: &Value) -> Option<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}
