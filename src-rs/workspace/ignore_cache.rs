use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const IGNORE_FILE_NAME: &str = ".gitignore";

/// Compiled `.gitignore` rules for one workspace root.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    gitignore: Gitignore,
}

impl IgnoreMatcher {
    pub fn empty() -> Self {
        Self {
            gitignore: Gitignore::empty(),
        }
    }

    /// Reads `<root>/.gitignore`. Any read or compile failure yields an empty ruleset.
    pub fn load(root: &Path) -> Self {
        let path = root.join(IGNORE_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_content(root, &content),
            Err(e) => {
                log::debug!("No ignore rules loaded from {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn from_content(root: &Path, content: &str) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for line in content.lines() {
            if let Err(e) = builder.add_line(None, line) {
                log::warn!("Skipping invalid ignore pattern {:?}: {}", line, e);
            }
        }
        match builder.build() {
            Ok(gitignore) => Self { gitignore },
            Err(e) => {
                log::warn!("Failed to compile ignore rules for {}: {}", root.display(), e);
                Self::empty()
            }
        }
    }

    /// `relative_path` is relative to the root this matcher was built for.
    pub fn ignores(&self, relative_path: &Path, is_dir: bool) -> bool {
        if relative_path.as_os_str().is_empty() || relative_path.has_root() {
            return false;
        }
        self.gitignore
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }

    pub fn rule_count(&self) -> u64 {
        self.gitignore.num_ignores() + self.gitignore.num_whitelists()
    }
}

/// Matchers keyed by absolute root path. Owned by one command invocation, so
/// edits to `.gitignore` between invocations are picked up.
#[derive(Debug, Default)]
pub struct IgnoreCache {
    matchers: HashMap<PathBuf, Arc<IgnoreMatcher>>,
}

impl IgnoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matcher_for(&mut self, root: &Path) -> Arc<IgnoreMatcher> {
        let key = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        if let Some(existing) = self.matchers.get(&key) {
            return Arc::clone(existing);
        }
        let matcher = Arc::new(IgnoreMatcher::load(root));
        log::debug!(
            "Loaded {} ignore rules for {}",
            matcher.rule_count(),
            key.display()
        );
        self.matchers.insert(key, Arc::clone(&matcher));
        matcher
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
