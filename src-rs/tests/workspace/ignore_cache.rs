use crate::workspace::ignore_cache::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_patterns() {
        let root = Path::new("/work/proj");
        let matcher = IgnoreMatcher::from_content(root, "# build output\n*.log\n/dist\ncache/\n!keep.log\n");

        assert!(matcher.ignores(Path::new("debug.log"), false));
        assert!(matcher.ignores(Path::new("nested/deep/debug.log"), false));
        assert!(!matcher.ignores(Path::new("keep.log"), false));
        assert!(matcher.ignores(Path::new("dist"), true));
        assert!(!matcher.ignores(Path::new("src/dist"), true));
        assert!(matcher.ignores(Path::new("cache"), true));
        assert!(matcher.ignores(Path::new("cache/data.bin"), false));
        assert!(!matcher.ignores(Path::new("src/main.rs"), false));
    }

    #[test]
    fn test_empty_and_rooted_paths_are_not_ignored() {
        let matcher = IgnoreMatcher::from_content(Path::new("/work"), "*\n");
        assert!(!matcher.ignores(Path::new(""), true));
        assert!(!matcher.ignores(Path::new("/etc/passwd"), false));
        assert!(matcher.ignores(Path::new("anything"), false));
    }

    #[test]
    fn test_missing_file_gives_empty_rules() {
        let dir = TempDir::new().unwrap();
        let matcher = IgnoreMatcher::load(dir.path());
        assert_eq!(matcher.rule_count(), 0);
        assert!(!matcher.ignores(Path::new("a.log"), false));
    }

    #[test]
    fn test_cache_reuses_matcher_per_root() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::write(a.path().join(".gitignore"), "*.log\n").unwrap();

        let mut cache = IgnoreCache::new();
        assert!(cache.is_empty());
        let first = cache.matcher_for(a.path());
        // file edits after the first load are not seen by this cache
        fs::write(a.path().join(".gitignore"), "").unwrap();
        let second = cache.matcher_for(a.path());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.ignores(Path::new("x.log"), false));

        let other = cache.matcher_for(b.path());
        assert!(!other.ignores(Path::new("x.log"), false));
        assert_eq!(cache.len(), 2);

        // a fresh cache picks up the edit
        let mut fresh = IgnoreCache::new();
        assert!(!fresh.matcher_for(a.path()).ignores(Path::new("x.log"), false));
    }
}
