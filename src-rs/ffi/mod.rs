// Node bindings for the editor extension host

use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::path::Path;

use crate::config::{FileSettingsStore, SettingsStore};
use crate::cons::provider_cons::{ProviderCode, ALL_PROVIDERS};
use crate::llm::models::provider_handle::{create_client, ClientOptions};
use crate::llm::prompts::file_selection::build_messages;
use crate::llm::utils::file_list;
use crate::workspace::exclusion::ExclusionRules;
use crate::workspace::ignore_cache::IgnoreCache;
use crate::workspace::scanner::{scan, EntryKind, FileEntry};
use crate::workspace::tree_format::format_tree;

fn to_napi_error(e: anyhow::Error) -> Error {
    Error::from_reason(format!("{:#}", e))
}

#[napi(object)]
pub struct CoreFileEntry {
    pub path: String,
    #[napi(js_name = "type")]
    pub kind: String,
    pub name: String,
}

impl From<FileEntry> for CoreFileEntry {
    fn from(e: FileEntry) -> Self {
        let kind = match e.kind {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        };
        Self {
            path: e.path,
            kind: kind.to_string(),
            name: e.name,
        }
    }
}

impl From<CoreFileEntry> for FileEntry {
    fn from(e: CoreFileEntry) -> Self {
        let kind = if e.kind == "directory" {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            path: e.path,
            kind,
            name: e.name,
        }
    }
}

#[napi(object)]
pub struct CoreProvider {
    pub name: String,
    pub code: String,
    #[napi(js_name = "defaultModel")]
    pub default_model: String,
    #[napi(js_name = "baseURL")]
    pub base_url: String,
    #[napi(js_name = "requiresBaseUrl")]
    pub requires_base_url: bool,
}

#[napi(object)]
pub struct CoreMessage {
    pub role: String,
    pub content: String,
}

#[napi]
pub fn scan_workspace(
    root: String,
    excluded_extensions: Vec<String>,
    excluded_folder_names: Vec<String>,
) -> Result<Vec<CoreFileEntry>> {
    crate::init_logger();
    let rules = ExclusionRules::new(excluded_extensions, excluded_folder_names);
    let mut cache = IgnoreCache::new();
    let entries = scan(Path::new(&root), &rules, &mut cache).map_err(to_napi_error)?;
    Ok(entries.into_iter().map(CoreFileEntry::from).collect())
}

#[napi]
pub fn format_file_tree(
    root_label: String,
    entries: Vec<CoreFileEntry>,
    selected_paths: Option<Vec<String>>,
    max_display_entries: Option<u32>,
) -> String {
    let entries: Vec<FileEntry> = entries.into_iter().map(FileEntry::from).collect();
    format_tree(
        &root_label,
        &entries,
        selected_paths.as_deref(),
        max_display_entries.map(|n| n as usize),
    )
}

#[napi]
pub fn parse_file_list(response_text: String) -> Vec<String> {
    file_list::parse_file_list(&response_text)
}

#[napi]
pub fn list_providers() -> Vec<CoreProvider> {
    ALL_PROVIDERS
        .iter()
        .map(|code| {
            let d = code.descriptor();
            CoreProvider {
                name: d.name.to_string(),
                code: d.code.to_string(),
                default_model: d.default_model.to_string(),
                base_url: d.base_url.to_string(),
                requires_base_url: d.requires_base_url,
            }
        })
        .collect()
}

#[napi]
pub async fn fetch_provider_models(
    code: String,
    api_key: Option<String>,
    base_url: Option<String>,
) -> Result<Vec<String>> {
    crate::init_logger();
    let provider = ProviderCode::from_code(&code)
        .ok_or_else(|| Error::from_reason(format!("Unknown provider: {}", code)))?;
    let settings = FileSettingsStore::new().load().ok();
    let options = ClientOptions {
        api_key,
        base_url,
        model: None,
    };
    let client = create_client(provider, &options, settings.as_ref());
    Ok(client.fetch_models().await)
}

#[napi]
pub fn build_selection_messages(user_prompt: String, root: String) -> Result<Vec<CoreMessage>> {
    crate::init_logger();
    let settings = FileSettingsStore::new().load().map_err(to_napi_error)?;
    let rules = ExclusionRules::from_settings(&settings);
    let mut cache = IgnoreCache::new();
    let messages =
        build_messages(&user_prompt, Path::new(&root), &rules, &mut cache).map_err(to_napi_error)?;
    Ok(messages
        .into_iter()
        .map(|m| CoreMessage {
            role: m.role,
            content: m.content,
        })
        .collect())
}
