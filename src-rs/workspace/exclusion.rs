use crate::config::Settings;

/// Substring from the last `.` onward, including the dot; empty if there is none.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) => &file_name[pos..],
        None => "",
    }
}

pub fn is_file_type_excluded(file_name: &str, excluded_extensions: &[String]) -> bool {
    if excluded_extensions.is_empty() {
        return false;
    }
    let ext = file_extension(file_name);
    excluded_extensions.iter().any(|e| e == ext)
}

/// Exact name equality only: a rule for `node_modules` does not cover `node_modules_old`.
pub fn is_folder_name_excluded(folder_name: &str, excluded_names: &[String]) -> bool {
    excluded_names.iter().any(|n| n == folder_name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    pub excluded_extensions: Vec<String>,
    pub excluded_folder_names: Vec<String>,
}

impl ExclusionRules {
    pub fn new(excluded_extensions: Vec<String>, excluded_folder_names: Vec<String>) -> Self {
        Self {
            excluded_extensions,
            excluded_folder_names,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.excluded_extensions.clone(),
            settings.excluded_folder_names.clone(),
        )
    }

    pub fn excludes_file(&self, file_name: &str) -> bool {
        is_file_type_excluded(file_name, &self.excluded_extensions)
    }

    pub fn excludes_folder(&self, folder_name: &str) -> bool {
        is_folder_name_excluded(folder_name, &self.excluded_folder_names)
    }
}
