use std::collections::{BTreeMap, HashSet};

use super::scanner::FileEntry;

pub const DEFAULT_MAX_DISPLAY_ENTRIES: usize = 20;
pub const SELECTED_MARK: &str = "✓";
pub const UNSELECTED_MARK: &str = "✗";

#[derive(Debug, Default)]
struct TreeNode {
    is_dir: bool,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Inserts `path` and its ancestor chain; ancestors become directories.
    fn insert(&mut self, path: &str, is_dir: bool) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let mut node = self;
        for (i, part) in parts.iter().enumerate() {
            let last = i + 1 == parts.len();
            node = node.children.entry((*part).to_string()).or_default();
            if !last || is_dir {
                node.is_dir = true;
            }
        }
    }
}

fn build_tree(entries: &[FileEntry]) -> TreeNode {
    let mut sorted: Vec<&FileEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut root = TreeNode {
        is_dir: true,
        children: BTreeMap::new(),
    };
    for entry in sorted {
        root.insert(&entry.path, entry.is_dir());
    }
    root
}

/// Selected paths may be absolute (prefixed with the root label) or root-relative.
fn normalize_selected(root_label: &str, selected: &[String]) -> HashSet<String> {
    let root = root_label.replace('\\', "/");
    let root = root.trim_end_matches('/');
    selected
        .iter()
        .map(|p| {
            let p = p.replace('\\', "/");
            let stripped = match p.strip_prefix(root) {
                Some(rest) if !root.is_empty() && rest.starts_with('/') => Some(rest.to_string()),
                _ => None,
            };
            let rel = stripped.unwrap_or(p);
            rel.trim_start_matches("./").trim_start_matches('/').to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

fn render_node(
    node: &TreeNode,
    parent_path: &str,
    prefix: &str,
    selected: Option<&HashSet<String>>,
    output: &mut String,
) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let path = if parent_path.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", parent_path, name)
        };

        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(name);
        if let (false, Some(sel)) = (child.is_dir, selected) {
            let mark = if sel.contains(&path) {
                SELECTED_MARK
            } else {
                UNSELECTED_MARK
            };
            output.push(' ');
            output.push_str(mark);
        }
        output.push('\n');

        if child.is_dir && !child.children.is_empty() {
            let child_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            render_node(child, &path, &child_prefix, selected, output);
        }
    }
}

fn render_simplified(root_label: &str, entries: &[FileEntry], selected: &HashSet<String>) -> String {
    let mut shown: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_file() && selected.contains(&e.path))
        .map(|e| e.path.as_str())
        .collect();
    shown.sort_unstable();
    shown.dedup();

    let mut output = String::new();
    output.push_str(root_label);
    output.push('\n');
    for path in shown {
        output.push_str(&format!("├── {} {}\n", path, SELECTED_MARK));
    }
    output.push_str("└── ...\n");
    output
}

/// Renders `entries` as an ASCII tree under `root_label`.
///
/// With `selected`, file lines carry a selected/unselected mark and trees
/// larger than `max_display_entries` collapse to the selected files plus an
/// ellipsis line. Without `selected` the full tree is always rendered.
pub fn format_tree(
    root_label: &str,
    entries: &[FileEntry],
    selected: Option<&[String]>,
    max_display_entries: Option<usize>,
) -> String {
    let selected = selected.map(|s| normalize_selected(root_label, s));
    let limit = max_display_entries.unwrap_or(DEFAULT_MAX_DISPLAY_ENTRIES);

    if let Some(sel) = &selected {
        if entries.len() > limit {
            return render_simplified(root_label, entries, sel);
        }
    }

    let tree = build_tree(entries);
    let mut output = String::new();
    output.push_str(root_label);
    output.push('\n');
    render_node(&tree, "", "", selected.as_ref(), &mut output);
    output
}
