use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{Settings, SettingsStore};
use crate::workspace::exclusion::ExclusionRules;
use crate::workspace::ignore_cache::IgnoreCache;
use crate::workspace::scanner::{count_matching_files, scan_matching_files, ScanScope};

use super::host::{EditorHost, SelectionStats, Telemetry};

pub const ADD_FOLDER_EVENT: &str = "addFolder";
pub const ADD_SELECTION_EVENT: &str = "addSelection";

#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    pub added: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    /// The user declined the large-batch confirmation
    pub cancelled: bool,
    pub stats: SelectionStats,
}

/// Plain "add folder" / "add selection" commands: every matching file is
/// mentioned, one at a time.
pub struct BulkMention<'a, H, S, T> {
    host: &'a H,
    store: &'a S,
    telemetry: &'a T,
}

impl<'a, H, S, T> BulkMention<'a, H, S, T>
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

    fn workspace_root_for(&self, path: &Path) -> Option<PathBuf> {
        self.host
            .workspace_roots()
            .into_iter()
            .find(|root| path.starts_with(root))
    }

    pub async fn add_folder(&self, folder: &Path, recursive: bool) -> Result<BulkOutcome> {
        let settings = self.store.load()?;
        let rules = ExclusionRules::from_settings(&settings);
        let mut cache = IgnoreCache::new();
        let ignore_root = self.workspace_root_for(folder);
        let scope = ScanScope::within(folder, ignore_root.as_deref(), recursive);

        let count = count_matching_files(&scope, &rules, &mut cache)
            .map_err(|e| self.scan_failed(folder, e))?;
        if count == 0 {
            self.host.info("No matching files found");
            return Ok(BulkOutcome::default());
        }
        if !self.confirm_large_batch(count, &settings).await {
            return Ok(BulkOutcome {
                cancelled: true,
                ..Default::default()
            });
        }

        let mut files = Vec::with_capacity(count);
        scan_matching_files(&scope, &rules, &mut cache, |path| {
            files.push(path.to_path_buf());
            Ok(())
        })
        .map_err(|e| self.scan_failed(folder, e))?;

        Ok(self.mention_all(files, ADD_FOLDER_EVENT).await)
    }

    pub async fn add_selection(&self, paths: &[PathBuf]) -> Result<BulkOutcome> {
        let settings = self.store.load()?;
        let rules = ExclusionRules::from_settings(&settings);
        let mut cache = IgnoreCache::new();

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files: Vec<PathBuf> = Vec::new();
        for path in paths {
            let ignore_root = self.workspace_root_for(path);
            if path.is_dir() {
                let scope = ScanScope::within(path, ignore_root.as_deref(), true);
                scan_matching_files(&scope, &rules, &mut cache, |file| {
                    if seen.insert(file.to_path_buf()) {
                        files.push(file.to_path_buf());
                    }
                    Ok(())
                })
                .map_err(|e| self.scan_failed(path, e))?;
                continue;
            }
            if !self.file_passes(path, ignore_root.as_deref(), &rules, &mut cache) {
                log::debug!("Skipping excluded file {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path.clone());
            }
        }

        if files.is_empty() {
            self.host.info("No matching files found");
            return Ok(BulkOutcome::default());
        }
        if !self.confirm_large_batch(files.len(), &settings).await {
            return Ok(BulkOutcome {
                cancelled: true,
                ..Default::default()
            });
        }

        Ok(self.mention_all(files, ADD_SELECTION_EVENT).await)
    }

    fn scan_failed(&self, folder: &Path, e: anyhow::Error) -> anyhow::Error {
        log::error!("Failed to read {}: {:#}", folder.display(), e);
        self.host.error(&format!("Failed to read {}: {}", folder.display(), e));
        e
    }

    fn file_passes(
        &self,
        path: &Path,
        ignore_root: Option<&Path>,
        rules: &ExclusionRules,
        cache: &mut IgnoreCache,
    ) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if rules.excludes_file(&name) {
            return false;
        }
        let Some(root) = ignore_root else {
            return true;
        };
        let Ok(rel) = path.strip_prefix(root) else {
            return true;
        };
        !cache.matcher_for(root).ignores(rel, false)
    }

    async fn confirm_large_batch(&self, count: usize, settings: &Settings) -> bool {
        if count <= settings.file_count_threshold {
            return true;
        }
        self.host
            .confirm(&format!("You are about to add {} files. Continue?", count))
            .await
    }

    async fn mention_all(&self, files: Vec<PathBuf>, event: &str) -> BulkOutcome {
        let total = files.len();
        let mut added = Vec::new();
        let mut failed = Vec::new();
        for path in files {
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
            stats.file_count, total, stats.folder_count
        ));
        self.telemetry.record(event, stats);

        BulkOutcome {
            added,
            failed,
            cancelled: false,
            stats,
        }
    }
}
