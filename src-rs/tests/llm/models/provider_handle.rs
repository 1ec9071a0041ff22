use crate::config::Settings;
use crate::cons::provider_cons::ProviderCode;
use crate::llm::models::provider_handle::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> Settings {
        let mut s = Settings {
            provider: Some(provider.to_string()),
            api_key: Some("settings-key".to_string()),
            model: Some("settings-model".to_string()),
            ..Default::default()
        };
        s.base_urls
            .insert("ollama".to_string(), "http://gpu-box:11434/v1".to_string());
        s.base_urls
            .insert("gemini".to_string(), "http://ignored.example/v1".to_string());
        s
    }

    #[test]
    fn test_registry_defaults() {
        let client = create_client(ProviderCode::DeepSeek, &ClientOptions::default(), None);
        assert_eq!(client.base_url, "https://api.deepseek.com");
        assert_eq!(client.model, "deepseek-chat");
        assert_eq!(client.api_key, None);
        assert_eq!(client.chat_completion_url(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_settings_override_registry() {
        let s = settings("ollama");
        let client = create_client(ProviderCode::Ollama, &ClientOptions::default(), Some(&s));
        assert_eq!(client.base_url, "http://gpu-box:11434/v1");
        assert_eq!(client.model, "settings-model");
        assert_eq!(client.api_key.as_deref(), Some("settings-key"));
    }

    #[test]
    fn test_options_override_settings() {
        let s = settings("ollama");
        let options = ClientOptions {
            api_key: Some("opt-key".to_string()),
            base_url: Some("http://other:1/v1".to_string()),
            model: Some("opt-model".to_string()),
        };
        let client = create_client(ProviderCode::Ollama, &options, Some(&s));
        assert_eq!(client.base_url, "http://other:1/v1");
        assert_eq!(client.model, "opt-model");
        assert_eq!(client.api_key.as_deref(), Some("opt-key"));
    }

    #[test]
    fn test_key_and_model_belong_to_configured_provider() {
        let s = settings("openai");
        let client = create_client(ProviderCode::Ollama, &ClientOptions::default(), Some(&s));
        assert_eq!(client.api_key, None);
        assert_eq!(client.model, "llama3.1");
        // base URL overrides are keyed per provider
        assert_eq!(client.base_url, "http://gpu-box:11434/v1");
    }

    #[test]
    fn test_fixed_preset_only_takes_key() {
        let s = settings("gemini");
        let options = ClientOptions {
            api_key: None,
            base_url: Some("http://also-ignored/v1".to_string()),
            model: Some("other-model".to_string()),
        };
        let client = create_client(ProviderCode::Gemini, &options, Some(&s));
        let d = ProviderCode::Gemini.descriptor();
        assert_eq!(client.base_url, d.base_url);
        assert_eq!(client.model, d.default_model);
        assert_eq!(client.api_key.as_deref(), Some("settings-key"));
    }

    #[test]
    fn test_create_client_by_code() {
        let client = create_client_by_code("grok", &ClientOptions::default(), None).unwrap();
        assert_eq!(client.provider, ProviderCode::XAI);

        let err = create_client_by_code("nope", &ClientOptions::default(), None).unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }
}
