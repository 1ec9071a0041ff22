use anyhow::Result;

use crate::config::Settings;
use crate::cons::provider_cons::ProviderCode;

use super::openai::ChatCompletionClient;
pub use super::provider_base::{
    CompletionRequest, CompletionResponse, GenerationConfig, Message, ProviderClient, ProviderError,
};

/// Explicit per-call overrides; these win over persisted settings.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Builds a client for `code`. Each field resolves from `options`, then
/// `settings`, then the registry default. Fixed presets keep their registry
/// base URL, model and paths; only the key is taken from options or settings.
pub fn create_client(
    code: ProviderCode,
    options: &ClientOptions,
    settings: Option<&Settings>,
) -> ChatCompletionClient {
    let descriptor = code.descriptor();

    // Persisted key and model belong to the configured provider only.
    let same_provider = settings
        .map(|s| s.provider_code().map_or(true, |p| p == code))
        .unwrap_or(false);

    let api_key = non_blank(options.api_key.as_deref()).or_else(|| {
        if same_provider {
            settings.and_then(|s| s.api_key()).map(|k| k.to_string())
        } else {
            None
        }
    });

    if code.is_fixed_preset() {
        return ChatCompletionClient::new(
            code,
            descriptor.base_url.to_string(),
            api_key,
            descriptor.default_model.to_string(),
        );
    }

    let base_url = non_blank(options.base_url.as_deref())
        .or_else(|| settings.and_then(|s| s.base_url_for(code)).map(|u| u.to_string()))
        .unwrap_or_else(|| descriptor.base_url.to_string());

    let model = non_blank(options.model.as_deref())
        .or_else(|| {
            if same_provider {
                settings.and_then(|s| s.model()).map(|m| m.to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| descriptor.default_model.to_string());

    ChatCompletionClient::new(code, base_url, api_key, model)
}

/// Same as [`create_client`] but takes the provider code as configured text.
pub fn create_client_by_code(
    code: &str,
    options: &ClientOptions,
    settings: Option<&Settings>,
) -> Result<ChatCompletionClient> {
    let provider = ProviderCode::from_code(code)
        .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", code))?;
    Ok(create_client(provider, options, settings))
}
