//! File system scanning engine for projectlens.
//!
//! This crate walks a project directory with jwalk and produces the two
//! synchronized views of its contents: the flat file and directory lists,
//! and the naturally sorted display tree.
//!
//! # Overview
//!
//! - **Ignore filtering** with a hard cut: ignored directories are never read
//! - **Line counts** for configured extensions
//! - **Progress updates** via broadcast channels
//! - **Cancellation** through a `CancellationToken`
//!
//! # Example
//!
//! ```rust,no_run
//! use projectlens_scan::{ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::builder()
//!     .root("/path/to/project")
//!     .ignore_patterns(vec!["vendor/".to_string(), "~".to_string()])
//!     .build()
//!     .unwrap();
//! let result = TreeScanner::new().scan(&config).unwrap();
//!
//! for line in result.display_lines() {
//!     println!("{line}");
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use projectlens_scan::TreeScanner;
//!
//! let scanner = TreeScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Scanned {} files", progress.files_scanned);
//!     }
//! });
//! ```

mod progress;
mod project;
mod scanner;
mod tree;

pub use progress::{PROGRESS_INTERVAL, ScanProgress};
pub use project::{check_important_files, list_projects};
pub use scanner::TreeScanner;
pub use tree::{build_tree, directory_label, file_label};

// Re-export core types for convenience
pub use projectlens_core::{
    DirectoryEntry, FileEntry, ImportantFile, ScanConfig, ScanError, ScanResult, ScanWarning,
    TreeNode, WarningKind,
};
