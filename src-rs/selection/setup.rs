use anyhow::Result;

use crate::config::{ProviderSettings, SettingsStore};
use crate::cons::provider_cons::{ProviderCode, ALL_PROVIDERS};
use crate::llm::models::provider_handle::{create_client, ClientOptions, ProviderClient};

use super::host::{EditorHost, InputRequest, PickItem};

fn provider_items() -> Vec<PickItem> {
    ALL_PROVIDERS
        .iter()
        .map(|code| {
            let d = code.descriptor();
            PickItem {
                label: d.name.to_string(),
                description: if d.base_url.is_empty() {
                    None
                } else {
                    Some(d.base_url.to_string())
                },
                value: d.code.to_string(),
            }
        })
        .collect()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

async fn ask_base_url<H: EditorHost>(host: &H, code: ProviderCode) -> Option<String> {
    let mut request = InputRequest::new(format!("Base URL for {}", code.descriptor().name));
    request.placeholder = Some("https://example.com/v1".to_string());
    let raw = non_blank(host.prompt_input(request).await)?;
    match url::Url::parse(&raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Some(raw),
        Ok(_) | Err(_) => {
            host.error(&format!("Invalid base URL: {}", raw));
            None
        }
    }
}

async fn ask_model<H: EditorHost, P: ProviderClient>(
    host: &H,
    code: ProviderCode,
    client: &P,
) -> Option<String> {
    let models = client.fetch_models().await;
    if !models.is_empty() {
        let items = models
            .into_iter()
            .map(|m| PickItem {
                label: m.clone(),
                description: None,
                value: m,
            })
            .collect();
        return host.pick("Select a model", items).await;
    }

    host.info("Could not fetch the model list, enter a model id manually");
    let default_model = code.descriptor().default_model;
    let mut request = InputRequest::new("Model id");
    if !default_model.is_empty() {
        request.value = Some(default_model.to_string());
    }
    non_blank(host.prompt_input(request).await)
}

/// Interactive provider configuration: provider, API key, base URL when the
/// provider needs one, then model. Nothing is written if the user cancels.
pub async fn run_provider_setup<H: EditorHost, S: SettingsStore>(
    host: &H,
    store: &S,
) -> Result<Option<ProviderSettings>> {
    let Some(choice) = host.pick("Select an AI provider", provider_items()).await else {
        return Ok(None);
    };
    let code = ProviderCode::from_code(&choice)
        .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", choice))?;
    let descriptor = code.descriptor();

    let mut key_request = InputRequest::new(format!("API key for {}", descriptor.name));
    key_request.password = true;
    let Some(api_key) = non_blank(host.prompt_input(key_request).await) else {
        return Ok(None);
    };

    let base_url = if descriptor.requires_base_url {
        match ask_base_url(host, code).await {
            Some(u) => Some(u),
            None => return Ok(None),
        }
    } else {
        None
    };

    let model = if code.is_fixed_preset() {
        None
    } else {
        let options = ClientOptions {
            api_key: Some(api_key.clone()),
            base_url: base_url.clone(),
            model: None,
        };
        let client = create_client(code, &options, None);
        match ask_model(host, code, &client).await {
            Some(m) => Some(m),
            None => return Ok(None),
        }
    };

    let provider = ProviderSettings {
        provider: code,
        api_key,
        model,
        base_url,
    };
    store.save_provider(&provider)?;
    host.info(&format!("{} is configured", descriptor.name));
    Ok(Some(provider))
}
