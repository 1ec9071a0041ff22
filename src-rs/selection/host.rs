use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct InputRequest {
    pub prompt: String,
    pub placeholder: Option<String>,
    /// Pre-filled value
    pub value: Option<String>,
    /// Mask the typed text (API keys)
    pub password: bool,
}

impl InputRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
    pub value: String,
}

/// The editor surface this crate drives: dialogs, notifications, workspace
/// folders and the downstream assistant's "mention file" command.
#[allow(async_fn_in_trait)]
pub trait EditorHost {
    /// `None` when the user dismissed the input box.
    async fn prompt_input(&self, request: InputRequest) -> Option<String>;

    /// Returns the `value` of the chosen item.
    async fn pick(&self, title: &str, items: Vec<PickItem>) -> Option<String>;

    async fn confirm(&self, message: &str) -> bool;

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Non-cancellable progress text.
    fn progress(&self, message: &str);

    fn workspace_roots(&self) -> Vec<PathBuf>;

    async fn mention(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStats {
    pub file_count: usize,
    pub folder_count: usize,
}

impl SelectionStats {
    pub fn from_files(files: &[PathBuf]) -> Self {
        let folders: HashSet<&Path> = files.iter().filter_map(|f| f.parent()).collect();
        Self {
            file_count: files.len(),
            folder_count: folders.len(),
        }
    }
}

pub trait Telemetry {
    fn record(&self, event: &str, stats: SelectionStats);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&self, _event: &str, _stats: SelectionStats) {}
}

/// Writes usage events to the log when the user opted in.
#[derive(Debug, Clone, Copy)]
pub struct LogTelemetry {
    pub enabled: bool,
}

impl Telemetry for LogTelemetry {
    fn record(&self, event: &str, stats: SelectionStats) {
        if !self.enabled {
            return;
        }
        let payload = serde_json::to_string(&stats).unwrap_or_default();
        log::info!(target: "telemetry", "{} {}", event, payload);
    }
}
