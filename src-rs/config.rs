use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cons::provider_cons::ProviderCode;

const SETTINGS_DIR: &str = ".mentionkit";
const SETTINGS_FILE: &str = "settings.json";

fn default_file_count_threshold() -> usize {
    50
}

fn default_max_display_entries() -> usize {
    20
}

fn default_dedupe_mentions() -> bool {
    true
}

/// Effective settings after all layers are applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Provider code (e.g., "openai", "gemini")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, alias = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Base URL overrides keyed by provider code
    #[serde(default, alias = "baseUrls")]
    pub base_urls: HashMap<String, String>,

    /// Above this many files a bulk mention asks for confirmation
    #[serde(default = "default_file_count_threshold", alias = "fileCountThreshold")]
    pub file_count_threshold: usize,

    #[serde(default, alias = "excludedExtensions")]
    pub excluded_extensions: Vec<String>,

    #[serde(default, alias = "excludedFolderNames")]
    pub excluded_folder_names: Vec<String>,

    #[serde(default, alias = "telemetryEnabled")]
    pub telemetry_enabled: bool,

    /// Drop repeated paths from a model answer before mentioning
    #[serde(default = "default_dedupe_mentions", alias = "dedupeMentions")]
    pub dedupe_mentions: bool,

    /// Trees larger than this are rendered in simplified form
    #[serde(default = "default_max_display_entries", alias = "maxDisplayEntries")]
    pub max_display_entries: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            model: None,
            base_urls: HashMap::new(),
            file_count_threshold: default_file_count_threshold(),
            excluded_extensions: Vec::new(),
            excluded_folder_names: Vec::new(),
            telemetry_enabled: false,
            dedupe_mentions: default_dedupe_mentions(),
            max_display_entries: default_max_display_entries(),
        }
    }
}

impl Settings {
    /// Built-in defaults (embedded Config.toml)
    pub fn embedded_defaults() -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        toml::from_str(default_str).context("Failed to parse embedded Config.toml")
    }

    pub fn provider_code(&self) -> Option<ProviderCode> {
        self.provider.as_deref().and_then(ProviderCode::from_code)
    }

    pub fn base_url_for(&self, code: ProviderCode) -> Option<&str> {
        self.base_urls
            .get(code.code())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    /// Provider, key, model and (where the backend needs one) base URL are all present.
    pub fn is_provider_ready(&self) -> bool {
        let Some(code) = self.provider_code() else {
            return false;
        };
        if self.api_key().is_none() {
            return false;
        }
        if !code.is_fixed_preset() && self.model().is_none() {
            return false;
        }
        if code.descriptor().requires_base_url && self.base_url_for(code).is_none() {
            return false;
        }
        true
    }

    pub(crate) fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.provider {
            self.provider = Some(v);
        }
        if let Some(v) = patch.api_key {
            self.api_key = Some(v);
        }
        if let Some(v) = patch.model {
            self.model = Some(v);
        }
        if let Some(v) = patch.base_urls {
            for (code, url) in v {
                self.base_urls.insert(code, url);
            }
        }
        if let Some(v) = patch.file_count_threshold {
            self.file_count_threshold = v;
        }
        if let Some(v) = patch.excluded_extensions {
            self.excluded_extensions = v;
        }
        if let Some(v) = patch.excluded_folder_names {
            self.excluded_folder_names = v;
        }
        if let Some(v) = patch.telemetry_enabled {
            self.telemetry_enabled = v;
        }
        if let Some(v) = patch.dedupe_mentions {
            self.dedupe_mentions = v;
        }
        if let Some(v) = patch.max_display_entries {
            self.max_display_entries = v;
        }
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// A settings file layer; only the fields it contains override lower layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, alias = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, alias = "baseUrls", skip_serializing_if = "Option::is_none")]
    pub base_urls: Option<HashMap<String, String>>,
    #[serde(default, alias = "fileCountThreshold", skip_serializing_if = "Option::is_none")]
    pub file_count_threshold: Option<usize>,
    #[serde(default, alias = "excludedExtensions", skip_serializing_if = "Option::is_none")]
    pub excluded_extensions: Option<Vec<String>>,
    #[serde(default, alias = "excludedFolderNames", skip_serializing_if = "Option::is_none")]
    pub excluded_folder_names: Option<Vec<String>>,
    #[serde(default, alias = "telemetryEnabled", skip_serializing_if = "Option::is_none")]
    pub telemetry_enabled: Option<bool>,
    #[serde(default, alias = "dedupeMentions", skip_serializing_if = "Option::is_none")]
    pub dedupe_mentions: Option<bool>,
    #[serde(default, alias = "maxDisplayEntries", skip_serializing_if = "Option::is_none")]
    pub max_display_entries: Option<usize>,
}

/// Result of the provider setup flow, written back to persisted settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: ProviderCode,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Persisted key-value configuration scope.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;

    fn save_provider(&self, provider: &ProviderSettings) -> Result<()>;
}

/// Settings layered from files:
/// 1. Defaults (Embedded Config.toml)
/// 2. User settings (~/.mentionkit/settings.json)
/// 3. Project settings (./.mentionkit/settings.json)
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    user_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        Self {
            user_path: dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE)),
            project_path: Some(Path::new(SETTINGS_DIR).join(SETTINGS_FILE)),
        }
    }

    pub fn with_paths(user_path: Option<PathBuf>, project_path: Option<PathBuf>) -> Self {
        Self {
            user_path,
            project_path,
        }
    }

    /// `Ok(None)` when the file does not exist; a file that cannot be read or
    /// parsed is an error.
    fn load_patch(path: &Path) -> Result<Option<SettingsPatch>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings at {}", path.display()))?;
        let patch = serde_json::from_str::<SettingsPatch>(&content)
            .with_context(|| format!("Failed to parse settings at {}", path.display()))?;
        Ok(Some(patch))
    }

    fn read_patch(path: &Path) -> Option<SettingsPatch> {
        match Self::load_patch(path) {
            Ok(patch) => patch,
            Err(e) => {
                log::warn!("{:#}", e);
                None
            }
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Settings> {
        let mut settings = Settings::embedded_defaults()?;
        for path in [&self.user_path, &self.project_path].into_iter().flatten() {
            if let Some(patch) = Self::read_patch(path) {
                log::debug!("Applying settings layer {}", path.display());
                settings.apply_patch(patch);
            }
        }
        Ok(settings)
    }

    fn save_provider(&self, provider: &ProviderSettings) -> Result<()> {
        let path = self
            .user_path
            .as_ref()
            .context("failed to determine home directory")?;

        // An unparsable user file is never overwritten.
        let mut patch = Self::load_patch(path)
            .context("Refusing to overwrite user settings")?
            .unwrap_or_default();
        patch.provider = Some(provider.provider.code().to_string());
        patch.api_key = Some(provider.api_key.clone());
        if let Some(model) = &provider.model {
            patch.model = Some(model.clone());
        }
        if let Some(base_url) = &provider.base_url {
            patch
                .base_urls
                .get_or_insert_with(HashMap::new)
                .insert(provider.provider.code().to_string(), base_url.clone());
        }

        let content = serde_json::to_string_pretty(&patch).context("failed to serialize settings")?;
        atomic_write(path, &content)?;
        log::info!("Saved provider settings for {}", provider.provider);
        Ok(())
    }
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .context("missing parent directory for atomic write")?;
    if !parent.exists() {
        fs::create_dir_all(parent).context("failed to create settings directory")?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let tmp_path = parent.join(format!("{file_name}.tmp.{}", now_ms()));

    fs::write(&tmp_path, content).context("failed to write tmp file")?;
    fs::rename(&tmp_path, path).context("failed to rename tmp file")?;
    Ok(())
}
