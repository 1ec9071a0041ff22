use crate::workspace::exclusion::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("main.rs"), ".rs");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension(".env"), ".env");
    }

    #[test]
    fn test_file_type_excluded() {
        let excluded = list(&[".exe", ".dll"]);
        assert!(is_file_type_excluded("app.exe", &excluded));
        assert!(!is_file_type_excluded("file.js", &excluded));
        assert!(!is_file_type_excluded("Makefile", &excluded));
        // case-sensitive
        assert!(!is_file_type_excluded("APP.EXE", &excluded));
        assert!(!is_file_type_excluded("app.exe", &[]));
    }

    #[test]
    fn test_folder_name_exact_match() {
        let excluded = list(&["node_modules", ".git"]);
        assert!(is_folder_name_excluded("node_modules", &excluded));
        assert!(is_folder_name_excluded(".git", &excluded));
        assert!(!is_folder_name_excluded("node_modules_old", &excluded));
        assert!(!is_folder_name_excluded("src", &excluded));
    }

    #[test]
    fn test_rules_from_settings() {
        let settings = crate::config::Settings {
            excluded_extensions: list(&[".lock"]),
            excluded_folder_names: list(&["target"]),
            ..Default::default()
        };
        let rules = ExclusionRules::from_settings(&settings);
        assert!(rules.excludes_file("Cargo.lock"));
        assert!(!rules.excludes_file("Cargo.toml"));
        assert!(rules.excludes_folder("target"));
        assert!(!rules.excludes_folder("src"));
    }
}
