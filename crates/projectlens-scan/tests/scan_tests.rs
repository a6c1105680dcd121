use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use projectlens_scan::{
    ScanConfig, ScanError, TreeScanner, WarningKind, check_important_files, list_projects,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.php", "<?php\n");
    write(root, "src/Services/Mailer.php", "<?php\nnamespace App;\n");
    write(root, "src/Controllers/HomeController.php", "<?php\n");
    write(root, "src/file10.php", "");
    write(root, "src/file2.php", "");
    write(root, "src/File1.php", "");
    write(root, "src/old.php~", "backup");
    write(root, "vendor/composer/installed.json", "{}");
    write(root, "vendor/autoload.php", "<?php\n");
    write(root, "public/css/site.css", "body {}");
    temp
}

fn config(root: &Path, ignore: &[&str]) -> ScanConfig {
    ScanConfig::builder()
        .root(root)
        .ignore_patterns(ignore.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .build()
        .unwrap()
}

#[test]
fn test_tree_and_flat_lists_agree() {
    let temp = project();
    let result = TreeScanner::new().scan(&config(temp.path(), &[])).unwrap();

    let flat_files: BTreeSet<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    let tree_files: BTreeSet<&str> = result.tree_files().map(|f| f.path.as_str()).collect();
    assert_eq!(flat_files, tree_files);

    let flat_dirs: BTreeSet<&str> = result.directories.iter().map(|d| d.path.as_str()).collect();
    let tree_dirs: BTreeSet<&str> = result.tree_directories().map(|d| d.path.as_str()).collect();
    assert_eq!(flat_dirs, tree_dirs);

    assert_eq!(result.tree.len(), result.files.len() + result.directories.len());
}

#[test]
fn test_vendor_prefix_and_backup_suffix_are_ignored() {
    let temp = project();
    let result = TreeScanner::new()
        .scan(&config(temp.path(), &["vendor/", "~"]))
        .unwrap();

    assert!(result.files.iter().all(|f| !f.path.starts_with("vendor")));
    assert!(result.directories.iter().all(|d| !d.path.starts_with("vendor")));
    assert!(result.files.iter().all(|f| !f.name.ends_with('~')));
    assert!(result.file("src/Services/Mailer.php").is_some());
}

#[test]
fn test_ignored_directory_prefix_scenario() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a/x.txt", "x");
    write(temp.path(), "b/y.txt", "y");

    let result = TreeScanner::new().scan(&config(temp.path(), &["b/"])).unwrap();

    let files: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(files, vec!["a/x.txt"]);
    let dirs: Vec<&str> = result.directories.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(dirs, vec!["a"]);
}

#[test]
fn test_exact_relative_path_is_ignored() {
    let temp = project();
    let result = TreeScanner::new()
        .scan(&config(temp.path(), &["public/css"]))
        .unwrap();

    assert!(result.directories.iter().any(|d| d.path == "public"));
    assert!(result.directories.iter().all(|d| d.path != "public/css"));
    assert!(result.file("public/css/site.css").is_none());
}

#[test]
fn test_tree_natural_order_and_labels() {
    let temp = project();
    let result = TreeScanner::new()
        .scan(&config(temp.path(), &["vendor/", "~", "public"]))
        .unwrap();

    assert_eq!(
        result.display_lines(),
        vec![
            "📁 src/",
            "│   📁 Controllers/",
            "│   │   📄 HomeController.php (6 B)",
            "│   📁 Services/",
            "│   │   📄 Mailer.php (21 B)",
            "│   📄 File1.php",
            "│   📄 file2.php",
            "│   📄 file10.php",
            "📄 index.php (6 B)",
        ]
    );
}

#[test]
fn test_line_counts_for_countable_extensions() {
    let temp = project();
    let result = TreeScanner::new().scan(&config(temp.path(), &[])).unwrap();

    assert_eq!(result.file("index.php").unwrap().line_count, Some(2));
    assert_eq!(result.file("src/file2.php").unwrap().line_count, Some(1));
    assert_eq!(result.file("public/css/site.css").unwrap().line_count, None);
    assert_eq!(result.file("src/Services/Mailer.php").unwrap().extension, "php");
}

#[test]
fn test_missing_root_is_not_readable() {
    let temp = TempDir::new().unwrap();
    let err = TreeScanner::new()
        .scan(&ScanConfig::new(temp.path().join("missing")))
        .unwrap_err();
    assert!(matches!(err, ScanError::NotReadable { .. }));
}

#[test]
fn test_file_root_is_rejected() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "single.php", "<?php");
    let err = TreeScanner::new()
        .scan(&ScanConfig::new(temp.path().join("single.php")))
        .unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory { .. }));
}

#[test]
fn test_cancelled_scan_returns_no_result() {
    let temp = project();
    let token = CancellationToken::new();
    token.cancel();

    let err = TreeScanner::new()
        .scan_with_cancel(&config(temp.path(), &[]), &token)
        .unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn test_progress_is_published() {
    let temp = project();
    let scanner = TreeScanner::new();
    let mut rx = scanner.subscribe();

    let result = scanner.scan(&config(temp.path(), &[])).unwrap();

    let progress = rx.try_recv().unwrap();
    assert_eq!(progress.files_scanned, result.total_files());
    assert_eq!(progress.dirs_scanned, result.total_dirs());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped() {
    let temp = project();
    std::os::unix::fs::symlink(temp.path().join("index.php"), temp.path().join("link.php"))
        .unwrap();

    let result = TreeScanner::new().scan(&config(temp.path(), &[])).unwrap();
    assert!(result.file("link.php").is_none());
    assert!(result.file("index.php").is_some());
}

/// Removes all permissions from a directory until dropped.
#[cfg(unix)]
struct Locked(std::path::PathBuf);

#[cfg(unix)]
impl Locked {
    fn new(path: std::path::PathBuf) -> Self {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        Self(path)
    }

    /// Permission bits are not enforced for privileged users.
    fn is_enforced(&self) -> bool {
        fs::read_dir(&self.0).is_err()
    }
}

#[cfg(unix)]
impl Drop for Locked {
    fn drop(&mut self) {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&self.0, fs::Permissions::from_mode(0o755));
    }
}

#[cfg(unix)]
fn locked_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a/x.txt", "x");
    write(temp.path(), "locked/secret.txt", "s");
    temp
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_becomes_warning() {
    let temp = locked_project();
    let locked = Locked::new(temp.path().join("locked"));
    if !locked.is_enforced() {
        return;
    }

    let result = TreeScanner::new().scan(&config(temp.path(), &[])).unwrap();

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].path, "locked");
    assert_eq!(result.warnings[0].kind, WarningKind::NotReadable);

    let dirs: Vec<&str> = result.directories.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(dirs, vec!["a", "locked"]);
    let tree: Vec<&str> = result.tree.iter().map(|node| node.path()).collect();
    assert_eq!(tree, vec!["a", "a/x.txt", "locked"]);
    assert!(result.file("a/x.txt").is_some());
}

#[cfg(unix)]
#[test]
fn test_ignored_unreadable_subdirectory_is_silent() {
    let temp = locked_project();
    let locked = Locked::new(temp.path().join("locked"));
    if !locked.is_enforced() {
        return;
    }

    let result = TreeScanner::new()
        .scan(&config(temp.path(), &["locked/"]))
        .unwrap();

    assert!(result.warnings.is_empty());
    let dirs: Vec<&str> = result.directories.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(dirs, vec!["a"]);
    assert_eq!(result.total_files(), 1);
}

#[test]
fn test_important_files_scenario() {
    let temp = project();
    let checks = check_important_files(
        temp.path(),
        &["README.md".to_string(), "index.php".to_string()],
    );
    assert!(!checks[0].present);
    assert!(checks[1].present);
}

#[test]
fn test_list_projects_natural_order() {
    let temp = TempDir::new().unwrap();
    for name in ["app10", "app2", "App1"] {
        fs::create_dir(temp.path().join(name)).unwrap();
    }
    assert_eq!(list_projects(temp.path()).unwrap(), vec!["App1", "app2", "app10"]);
}
