use serde::{Deserialize, Serialize};

/// Static description of one supported chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub code: &'static str,
    pub default_model: &'static str,
    pub base_url: &'static str,
    pub chat_completion_path: &'static str,
    pub models_path: &'static str,
    /// The backend has no usable public endpoint; the user must supply one.
    pub requires_base_url: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCode {
    OpenAI,
    DeepSeek,
    OpenRouter,
    Groq,
    Mistral,
    XAI,
    Qwen,
    ZhipuAI,
    Ollama,
    Custom,
    Gemini,
}

pub const ALL_PROVIDERS: [ProviderCode; 11] = [
    ProviderCode::OpenAI,
    ProviderCode::DeepSeek,
    ProviderCode::OpenRouter,
    ProviderCode::Groq,
    ProviderCode::Mistral,
    ProviderCode::XAI,
    ProviderCode::Qwen,
    ProviderCode::ZhipuAI,
    ProviderCode::Ollama,
    ProviderCode::Custom,
    ProviderCode::Gemini,
];

const OPENAI: ProviderDescriptor = ProviderDescriptor {
    name: "OpenAI",
    code: "openai",
    default_model: "gpt-4o-mini",
    base_url: "https://api.openai.com/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const DEEPSEEK: ProviderDescriptor = ProviderDescriptor {
    name: "DeepSeek",
    code: "deepseek",
    default_model: "deepseek-chat",
    base_url: "https://api.deepseek.com",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const OPENROUTER: ProviderDescriptor = ProviderDescriptor {
    name: "OpenRouter",
    code: "openrouter",
    default_model: "openai/gpt-4o-mini",
    base_url: "https://openrouter.ai/api/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const GROQ: ProviderDescriptor = ProviderDescriptor {
    name: "Groq",
    code: "groq",
    default_model: "llama-3.3-70b-versatile",
    base_url: "https://api.groq.com/openai/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const MISTRAL: ProviderDescriptor = ProviderDescriptor {
    name: "Mistral",
    code: "mistral",
    default_model: "mistral-small-latest",
    base_url: "https://api.mistral.ai/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const XAI: ProviderDescriptor = ProviderDescriptor {
    name: "xAI",
    code: "xai",
    default_model: "grok-2-latest",
    base_url: "https://api.x.ai/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const QWEN: ProviderDescriptor = ProviderDescriptor {
    name: "Qwen",
    code: "qwen",
    default_model: "qwen-plus",
    base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const ZHIPUAI: ProviderDescriptor = ProviderDescriptor {
    name: "ZhipuAI",
    code: "zhipuai",
    default_model: "glm-4-flash",
    base_url: "https://open.bigmodel.cn/api/paas/v4",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const OLLAMA: ProviderDescriptor = ProviderDescriptor {
    name: "Ollama",
    code: "ollama",
    default_model: "llama3.1",
    base_url: "http://localhost:11434/v1",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

const CUSTOM: ProviderDescriptor = ProviderDescriptor {
    name: "OpenAI Compatible",
    code: "custom",
    default_model: "",
    base_url: "",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: true,
};

// Gemini is reached through Google's OpenAI-compatible surface. These values
// are a fixed preset: only the API key is user-configurable.
const GEMINI: ProviderDescriptor = ProviderDescriptor {
    name: "Gemini",
    code: "gemini",
    default_model: "gemini-2.0-flash",
    base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
    chat_completion_path: "/chat/completions",
    models_path: "/models",
    requires_base_url: false,
};

impl ProviderCode {
    /// Returns the unique key used in configuration (e.g., "openai", "gemini")
    pub fn code(&self) -> &'static str {
        self.descriptor().code
    }

    pub fn descriptor(&self) -> &'static ProviderDescriptor {
        match self {
            ProviderCode::OpenAI => &OPENAI,
            ProviderCode::DeepSeek => &DEEPSEEK,
            ProviderCode::OpenRouter => &OPENROUTER,
            ProviderCode::Groq => &GROQ,
            ProviderCode::Mistral => &MISTRAL,
            ProviderCode::XAI => &XAI,
            ProviderCode::Qwen => &QWEN,
            ProviderCode::ZhipuAI => &ZHIPUAI,
            ProviderCode::Ollama => &OLLAMA,
            ProviderCode::Custom => &CUSTOM,
            ProviderCode::Gemini => &GEMINI,
        }
    }

    /// Whether base URL, model and endpoint paths are pinned to the registry preset.
    pub fn is_fixed_preset(&self) -> bool {
        matches!(self, ProviderCode::Gemini)
    }

    /// Helper to parse from a string (handles aliases)
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderCode::OpenAI),
            "deepseek" => Some(ProviderCode::DeepSeek),
            "openrouter" => Some(ProviderCode::OpenRouter),
            "groq" => Some(ProviderCode::Groq),
            "mistral" => Some(ProviderCode::Mistral),
            "xai" | "grok" => Some(ProviderCode::XAI),
            "qwen" | "dashscope" => Some(ProviderCode::Qwen),
            "zhipuai" | "glm" => Some(ProviderCode::ZhipuAI),
            "ollama" => Some(ProviderCode::Ollama),
            "custom" | "openai-compatible" => Some(ProviderCode::Custom),
            "gemini" | "google" => Some(ProviderCode::Gemini),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
