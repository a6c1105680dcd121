//! Display tree construction.

use std::collections::HashMap;

use humansize::{BINARY, format_size};

use projectlens_core::{DirectoryEntry, FileEntry, TreeEntry, TreeNode, natural_cmp};

const INDENT: &str = "│   ";

/// Build the pre-order display tree from the flat lists.
///
/// At every level subdirectories come first, each expanded before its next
/// sibling, followed by the files. Both groups use natural ordering.
pub fn build_tree(files: &[FileEntry], directories: &[DirectoryEntry]) -> Vec<TreeNode> {
    let mut dirs_by_parent: HashMap<&str, Vec<&DirectoryEntry>> = HashMap::new();
    for dir in directories {
        dirs_by_parent.entry(dir.parent()).or_default().push(dir);
    }
    for children in dirs_by_parent.values_mut() {
        children.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    }

    let mut files_by_parent: HashMap<&str, Vec<&FileEntry>> = HashMap::new();
    for file in files {
        files_by_parent.entry(file.parent()).or_default().push(file);
    }
    for children in files_by_parent.values_mut() {
        children.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    }

    let mut nodes = Vec::with_capacity(files.len() + directories.len());
    render_level("", 0, &dirs_by_parent, &files_by_parent, &mut nodes);

    debug_assert_eq!(nodes.len(), files.len() + directories.len());
    nodes
}

fn render_level(
    parent: &str,
    depth: u32,
    dirs_by_parent: &HashMap<&str, Vec<&DirectoryEntry>>,
    files_by_parent: &HashMap<&str, Vec<&FileEntry>>,
    nodes: &mut Vec<TreeNode>,
) {
    if let Some(dirs) = dirs_by_parent.get(parent) {
        for dir in dirs {
            nodes.push(TreeNode {
                entry: TreeEntry::Directory((*dir).clone()),
                depth,
                label: directory_label(&dir.name, depth),
            });
            render_level(&dir.path, depth + 1, dirs_by_parent, files_by_parent, nodes);
        }
    }

    if let Some(files) = files_by_parent.get(parent) {
        for file in files {
            nodes.push(TreeNode {
                entry: TreeEntry::File((*file).clone()),
                depth,
                label: file_label(&file.name, file.size, depth),
            });
        }
    }
}

/// Label for a directory node.
pub fn directory_label(name: &str, depth: u32) -> String {
    format!("{}📁 {name}/", INDENT.repeat(depth as usize))
}

/// Label for a file node; the size is omitted for empty files.
pub fn file_label(name: &str, size: u64, depth: u32) -> String {
    let indent = INDENT.repeat(depth as usize);
    if size > 0 {
        format!("{indent}📄 {name} ({})", format_size(size, BINARY))
    } else {
        format!("{indent}📄 {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(path: &str, size: u64) -> FileEntry {
        FileEntry::new(path, size, Utc::now(), None)
    }

    #[test]
    fn test_directories_before_files() {
        let files = vec![file("z.php", 0), file("src/a.php", 10)];
        let dirs = vec![DirectoryEntry::new("src")];
        let tree = build_tree(&files, &dirs);

        let paths: Vec<&str> = tree.iter().map(TreeNode::path).collect();
        assert_eq!(paths, vec!["src", "src/a.php", "z.php"]);
        assert_eq!(tree[1].depth, 1);
        assert_eq!(tree[2].depth, 0);
    }

    #[test]
    fn test_natural_order_within_level() {
        let files = vec![file("file10.php", 1), file("file2.php", 1), file("File1.php", 1)];
        let tree = build_tree(&files, &[]);
        let names: Vec<&str> = tree.iter().map(|n| n.entry.name()).collect();
        assert_eq!(names, vec!["File1.php", "file2.php", "file10.php"]);
    }

    #[test]
    fn test_nested_directories_expand_in_place() {
        let dirs = vec![
            DirectoryEntry::new("b"),
            DirectoryEntry::new("a"),
            DirectoryEntry::new("a/inner"),
        ];
        let files = vec![file("a/inner/x.txt", 3), file("b/y.txt", 3)];
        let tree = build_tree(&files, &dirs);

        let paths: Vec<&str> = tree.iter().map(TreeNode::path).collect();
        assert_eq!(paths, vec!["a", "a/inner", "a/inner/x.txt", "b", "b/y.txt"]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(directory_label("src", 0), "📁 src/");
        assert_eq!(directory_label("Auth", 2), "│   │   📁 Auth/");
        assert_eq!(file_label("empty.txt", 0, 1), "│   📄 empty.txt");
        assert_eq!(file_label("a.php", 2048, 0), "📄 a.php (2 KiB)");
    }
}
