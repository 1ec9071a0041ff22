use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::exclusion::ExclusionRules;
use super::ignore_cache::{IgnoreCache, IgnoreMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One scanned workspace entry. `path` is relative to the scan root and uses `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
}

impl FileEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Joins the normal components of `path` with `/`.
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Where a walk starts and which root its ignore rules belong to.
#[derive(Debug, Clone)]
pub struct ScanScope {
    pub start: PathBuf,
    pub ignore_root: PathBuf,
    pub recursive: bool,
}

impl ScanScope {
    pub fn recursive(root: &Path) -> Self {
        Self {
            start: root.to_path_buf(),
            ignore_root: root.to_path_buf(),
            recursive: true,
        }
    }

    /// `ignore_root` is used when `start` lies inside it, else `start` itself.
    pub fn within(start: &Path, ignore_root: Option<&Path>, recursive: bool) -> Self {
        let ignore_root = match ignore_root {
            Some(r) if start.starts_with(r) => r.to_path_buf(),
            _ => start.to_path_buf(),
        };
        Self {
            start: start.to_path_buf(),
            ignore_root,
            recursive,
        }
    }
}

fn passes_gates(
    entry: &DirEntry,
    scope: &ScanScope,
    matcher: &IgnoreMatcher,
    rules: &ExclusionRules,
) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let is_dir = entry.file_type().is_dir();
    let rel = entry
        .path()
        .strip_prefix(&scope.ignore_root)
        .unwrap_or_else(|_| entry.path());
    if matcher.ignores(rel, is_dir) {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if is_dir {
        !rules.excludes_folder(&name)
    } else {
        !rules.excludes_file(&name)
    }
}

/// Walks `scope` and calls `visit` for every entry that passes the ignore-file
/// and exclusion gates. Rejected directories are not descended into. A failed
/// directory listing aborts the walk.
fn walk<F>(
    scope: &ScanScope,
    rules: &ExclusionRules,
    cache: &mut IgnoreCache,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(&DirEntry) -> Result<()>,
{
    let matcher = cache.matcher_for(&scope.ignore_root);
    let max_depth = if scope.recursive { usize::MAX } else { 1 };

    let walker = WalkDir::new(&scope.start)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| passes_gates(e, scope, &matcher, rules));

    for entry in walker {
        let entry = entry
            .with_context(|| format!("Failed to read directory under {}", scope.start.display()))?;
        visit(&entry)?;
    }
    Ok(())
}

/// Lists every non-excluded file and directory under `root`.
pub fn scan(root: &Path, rules: &ExclusionRules, cache: &mut IgnoreCache) -> Result<Vec<FileEntry>> {
    let scope = ScanScope::recursive(root);
    let mut entries = Vec::new();
    walk(&scope, rules, cache, |entry| {
        let rel = entry.path().strip_prefix(root).unwrap_or_else(|_| entry.path());
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(FileEntry {
            path: to_slash_path(rel),
            kind,
            name: entry.file_name().to_string_lossy().to_string(),
        });
        Ok(())
    })?;
    log::debug!("Scanned {} entries under {}", entries.len(), root.display());
    Ok(entries)
}

/// Calls `on_file` with the absolute path of every matching file, without
/// materializing the tree. Returns the number of files visited.
pub fn scan_matching_files<F>(
    scope: &ScanScope,
    rules: &ExclusionRules,
    cache: &mut IgnoreCache,
    mut on_file: F,
) -> Result<usize>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut count = 0usize;
    walk(scope, rules, cache, |entry| {
        if entry.file_type().is_dir() {
            return Ok(());
        }
        count += 1;
        on_file(entry.path())
    })?;
    Ok(count)
}

pub fn count_matching_files(
    scope: &ScanScope,
    rules: &ExclusionRules,
    cache: &mut IgnoreCache,
) -> Result<usize> {
    scan_matching_files(scope, rules, cache, |_| Ok(()))
}
