//! File, directory and tree node types.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A regular file recorded during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the scan root, slash-separated. Unique within a scan.
    pub path: CompactString,

    /// File name (last path component).
    pub name: CompactString,

    /// Size in bytes.
    pub size: u64,

    /// Lower-cased extension without the leading dot, empty if none.
    pub extension: CompactString,

    /// Last modification time.
    pub modified: DateTime<Utc>,

    /// Line count, only for countable extensions.
    pub line_count: Option<u64>,
}

impl FileEntry {
    /// Create a new file entry.
    pub fn new(
        path: impl Into<CompactString>,
        size: u64,
        modified: DateTime<Utc>,
        line_count: Option<u64>,
    ) -> Self {
        let path = path.into();
        let name = CompactString::new(base_name(&path));
        let extension = extension_of(&name);
        Self {
            path,
            name,
            size,
            extension,
            modified,
            line_count,
        }
    }

    /// Relative path of the parent directory, `""` for the root.
    pub fn parent(&self) -> &str {
        parent_of(&self.path)
    }
}

/// A directory recorded during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Path relative to the scan root, slash-separated.
    pub path: CompactString,

    /// Directory name (last path component).
    pub name: CompactString,
}

impl DirectoryEntry {
    /// Create a new directory entry.
    pub fn new(path: impl Into<CompactString>) -> Self {
        let path = path.into();
        let name = CompactString::new(base_name(&path));
        Self { path, name }
    }

    /// Relative path of the parent directory, `""` for the root.
    pub fn parent(&self) -> &str {
        parent_of(&self.path)
    }
}

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// The entry a tree node displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeEntry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl TreeEntry {
    /// Relative path of the entry.
    pub fn path(&self) -> &str {
        match self {
            Self::File(file) => &file.path,
            Self::Directory(dir) => &dir.path,
        }
    }

    /// Name of the entry.
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Directory(dir) => &dir.name,
        }
    }

    /// Kind of the entry.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Directory(_) => NodeKind::Directory,
        }
    }
}

/// One line of the display tree.
///
/// A scan produces these as a pre-order sequence; `depth` only drives
/// indentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Entry shown by this node.
    pub entry: TreeEntry,

    /// Nesting level, 0 for children of the root.
    pub depth: u32,

    /// Pre-rendered display label including indentation.
    pub label: String,
}

impl TreeNode {
    /// Kind of this node.
    pub fn kind(&self) -> NodeKind {
        self.entry.kind()
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    /// Relative path of the node.
    pub fn path(&self) -> &str {
        self.entry.path()
    }
}

/// Last component of a slash-separated path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parent of a slash-separated relative path, `""` for top-level entries.
pub fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Lower-cased extension of a file name, without the dot.
///
/// Dotfiles such as `.htaccess` have no extension.
pub fn extension_of(name: &str) -> CompactString {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => CompactString::new(ext.to_lowercase()),
        _ => CompactString::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_derives_name_and_extension() {
        let file = FileEntry::new("src/Services/Mailer.PHP", 120, Utc::now(), Some(4));
        assert_eq!(file.name, "Mailer.PHP");
        assert_eq!(file.extension, "php");
        assert_eq!(file.parent(), "src/Services");
    }

    #[test]
    fn test_top_level_parent_is_root() {
        let file = FileEntry::new("index.php", 0, Utc::now(), None);
        assert_eq!(file.parent(), "");

        let dir = DirectoryEntry::new("src");
        assert_eq!(dir.parent(), "");
        assert_eq!(dir.name, "src");
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(extension_of(".htaccess"), "");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("notes."), "");
    }

    #[test]
    fn test_tree_node_kind() {
        let node = TreeNode {
            entry: TreeEntry::Directory(DirectoryEntry::new("src")),
            depth: 0,
            label: "📁 src/".to_string(),
        };
        assert!(node.is_dir());
        assert!(!node.is_file());
        assert_eq!(node.path(), "src");
    }
}
