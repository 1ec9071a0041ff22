use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::config::{Settings, SettingsStore};
use crate::llm::models::provider_handle::{
    create_client, ClientOptions, CompletionRequest,
};
use crate::llm::prompts::file_selection::build_messages_for_tree;
use crate::llm::utils::file_list::try_parse_file_list;
use crate::workspace::exclusion::ExclusionRules;
use crate::workspace::ignore_cache::IgnoreCache;
use crate::workspace::scanner::{scan, to_slash_path, FileEntry};
use crate::workspace::tree_format::format_tree;

use super::host::{EditorHost, InputRequest, SelectionStats, Telemetry};
use super::setup::run_provider_setup;

pub const SMART_ADD_FAILED: &str = "Smart add failed";
pub const SMART_ADD_EVENT: &str = "smartAdd";

#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub root: PathBuf,
    /// Paths as returned by the model
    pub candidates: Vec<String>,
    pub added: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// Model paths that are not files of the scanned tree
    pub rejected: Vec<String>,
    pub stats: SelectionStats,
    /// Number of entries in the scanned tree
    pub total_entries: usize,
    pub summary_tree: String,
}

/// Uses the single input when it is a directory, else the first workspace folder.
pub fn resolve_root(inputs: &[PathBuf], workspace_roots: &[PathBuf]) -> Result<PathBuf> {
    if let [single] = inputs {
        if single.is_dir() {
            return Ok(single.clone());
        }
    }
    workspace_roots
        .first()
        .cloned()
        .context("No workspace folder is open")
}

/// Drops `.` and folds `..` without touching the file system. `None` when
/// `..` would climb above the first component.
fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() || out.as_os_str().is_empty() {
                    return None;
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    Some(out)
}

/// Absolute location for a model-returned path. Relative paths are taken
/// from `root`. Returns `None` unless the location is a file of the scanned
/// tree, given as root-relative `/` paths in `known_files`.
pub fn resolve_candidate(
    root: &Path,
    candidate: &str,
    known_files: &HashSet<String>,
) -> Option<PathBuf> {
    let raw = Path::new(candidate.trim());
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        root.join(raw)
    };
    let path = normalize_lexically(&joined)?;
    let root = normalize_lexically(root)?;
    let rel = path.strip_prefix(&root).ok()?;
    if known_files.contains(&to_slash_path(rel)) {
        Some(path)
    } else {
        None
    }
}

/// Candidates that resolve to scanned files, in answer order, plus the ones
/// that were dropped.
fn resolve_candidates(
    root: &Path,
    candidates: &[String],
    entries: &[FileEntry],
    dedupe: bool,
) -> (Vec<PathBuf>, Vec<String>) {
    let known_files: HashSet<String> = entries
        .iter()
        .filter(|e| e.is_file())
        .map(|e| e.path.clone())
        .collect();

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();
    for c in candidates {
        if c.trim().is_empty() {
            continue;
        }
        let Some(path) = resolve_candidate(root, c, &known_files) else {
            log::warn!("Dropping candidate outside the scanned tree: {}", c);
            rejected.push(c.clone());
            continue;
        };
        if dedupe && !seen.insert(path.clone()) {
            log::debug!("Skipping duplicate candidate {}", path.display());
            continue;
        }
        out.push(path);
    }
    (out, rejected)
}

/// Smart add: asks the configured model which workspace files match a
/// free-text request and mentions each of them.
pub struct SmartSelector<'a, H, S, T> {
    host: &'a H,
    store: &'a S,
    telemetry: &'a T,
}

impl<'a, H, S, T> SmartSelector<'a, H, S, T>
where
    H: EditorHost,
    S: SettingsStore,
    T: Telemetry,
{
    pub fn new(host: &'a H, store: &'a S, telemetry: &'a T) -> Self {
        Self {
            host,
            store,
            telemetry,
        }
    }

    /// Runs one invocation. `Ok(None)` means the user cancelled. Errors have
    /// already been shown to the user when this returns.
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<Option<SelectionOutcome>> {
        match self.run_inner(inputs).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                log::error!("{}: {:#}", SMART_ADD_FAILED, e);
                self.host.error(&format!("{}: {}", SMART_ADD_FAILED, e));
                Err(e)
            }
        }
    }

    async fn acquire_query(&self) -> Option<String> {
        let mut request = InputRequest::new("Which files should be added?");
        request.placeholder = Some("e.g. all test files for the auth module".to_string());
        self.host
            .prompt_input(request)
            .await
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
    }

    async fn acquire_settings(&self) -> Result<Option<Settings>> {
        let settings = self.store.load()?;
        if settings.is_provider_ready() {
            return Ok(Some(settings));
        }

        self.host
            .warn("No AI provider is configured. Complete the setup to use smart add.");
        if run_provider_setup(self.host, self.store).await?.is_none() {
            self.host.warn("Provider setup was not completed, smart add cancelled.");
            return Ok(None);
        }

        let settings = self.store.load()?;
        if !settings.is_provider_ready() {
            self.host.warn("Provider configuration is incomplete, smart add cancelled.");
            return Ok(None);
        }
        Ok(Some(settings))
    }

    async fn run_inner(&self, inputs: &[PathBuf]) -> Result<Option<SelectionOutcome>> {
        let Some(query) = self.acquire_query().await else {
            log::debug!("Smart add cancelled at query prompt");
            return Ok(None);
        };

        let Some(settings) = self.acquire_settings().await? else {
            return Ok(None);
        };
        let code = settings
            .provider_code()
            .context("Configured provider is not supported")?;

        let root = resolve_root(inputs, &self.host.workspace_roots())?;
        let root_label = root.to_string_lossy().to_string();
        log::info!("Smart add in {} with provider {}: {}", root_label, code, query);

        self.host.progress("Analyzing files...");
        let rules = ExclusionRules::from_settings(&settings);
        let mut cache = IgnoreCache::new();
        let entries = scan(&root, &rules, &mut cache)?;
        let tree = format_tree(&root_label, &entries, None, None);
        let messages = build_messages_for_tree(&query, &root_label, &tree);

        self.host.progress("Waiting for model...");
        let client = create_client(code, &ClientOptions::default(), Some(&settings));
        let response = client.complete(CompletionRequest::new(messages)).await?;
        log::debug!("Model answered with {} chars", response.text.len());

        let candidates = match try_parse_file_list(&response.text) {
            Ok(files) => files,
            Err(e) => {
                self.host
                    .error(&format!("Could not read the model response: {}", e));
                Vec::new()
            }
        };

        if candidates.is_empty() {
            let stats = SelectionStats::default();
            let summary_tree = format_tree(
                &root_label,
                &entries,
                Some(candidates.as_slice()),
                Some(settings.max_display_entries),
            );
            self.host
                .info(&format!("0/{} files successfully added", entries.len()));
            self.telemetry.record(SMART_ADD_EVENT, stats);
            return Ok(Some(SelectionOutcome {
                root,
                candidates,
                added: Vec::new(),
                failed: Vec::new(),
                rejected: Vec::new(),
                stats,
                total_entries: entries.len(),
                summary_tree,
            }));
        }

        let (targets, rejected) =
            resolve_candidates(&root, &candidates, &entries, settings.dedupe_mentions);
        if !rejected.is_empty() {
            self.host.warn(&format!(
                "Skipped {} path(s) not found in {}",
                rejected.len(),
                root_label
            ));
        }
        let mut added = Vec::new();
        let mut failed = Vec::new();
        for path in targets {
            match self.host.mention(&path).await {
                Ok(()) => added.push(path),
                Err(e) => {
                    log::warn!("Failed to mention {}: {:#}", path.display(), e);
                    self.host
                        .error(&format!("Failed to add {}: {}", path.display(), e));
                    failed.push(path);
                }
            }
        }

        let stats = SelectionStats::from_files(&added);
        self.host.info(&format!(
            "{}/{} files successfully added from {} folder(s)",
            stats.file_count,
            candidates.len(),
            stats.folder_count
        ));
        self.telemetry.record(SMART_ADD_EVENT, stats);

        let summary_tree = format_tree(
            &root_label,
            &entries,
            Some(candidates.as_slice()),
            Some(settings.max_display_entries),
        );
        log::debug!("Smart add selection:\n{}", summary_tree);

        Ok(Some(SelectionOutcome {
            root,
            candidates,
            added,
            failed,
            rejected,
            stats,
            total_entries: entries.len(),
            summary_tree,
        }))
    }
}
