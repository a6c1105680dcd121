//! JWalk-based directory scanner.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use projectlens_core::{
    DirectoryEntry, FileEntry, IgnoreMatcher, ScanConfig, ScanError, ScanResult, ScanWarning,
};

use crate::progress::{ProgressTracker, ScanProgress};
use crate::tree::build_tree;

/// Directory scanner producing the flat lists and the display tree.
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan the configured root.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        self.scan_with_cancel(config, &CancellationToken::new())
    }

    /// Scan the configured root, stopping with [`ScanError::Cancelled`] once
    /// `cancel` fires.
    pub fn scan_with_cancel(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        if config.root.as_os_str().is_empty() {
            return Err(ScanError::InvalidConfig {
                message: "Root path cannot be empty".to_string(),
            });
        }

        let root = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::not_readable(&config.root, e))?;

        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }

        // jwalk reports an unlistable root as a warning; it is fatal here.
        fs::read_dir(&root).map_err(|e| ScanError::not_readable(&root, e))?;

        let matcher = Arc::new(config.ignore_matcher());
        let mut collected = Collected::default();
        let mut tracker = ProgressTracker::new();

        self.walk(config, &root, matcher, cancel, &mut collected, &mut tracker)?;

        let tree = build_tree(&collected.files, &collected.directories);
        let duration = tracker.elapsed();
        let _ = self.progress_tx.send(tracker.snapshot());

        tracing::info!(
            root = %root.display(),
            files = collected.files.len(),
            dirs = collected.directories.len(),
            warnings = collected.warnings.len(),
            elapsed_ms = duration.as_millis() as u64,
            "scan finished"
        );

        Ok(ScanResult::new(
            root,
            collected.files,
            collected.directories,
            tree,
            collected.warnings,
            duration,
        ))
    }

    fn walk(
        &self,
        config: &ScanConfig,
        root: &Path,
        matcher: Arc<IgnoreMatcher>,
        cancel: &CancellationToken,
        collected: &mut Collected,
        tracker: &mut ProgressTracker,
    ) -> Result<(), ScanError> {
        let filter_root = root.to_path_buf();
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .process_read_dir(move |depth, _dir, _state, children| {
                // The root itself arrives here with no depth.
                if depth.is_none() {
                    return;
                }
                // Ignored directories are removed here so they are never read.
                children.retain(|child| {
                    let Ok(entry) = child else { return true };
                    let Some(relative) = relative_path(&filter_root, &entry.path())
                        .filter(|relative| !relative.is_empty())
                    else {
                        return true;
                    };
                    let name = entry.file_name.to_string_lossy();
                    match matcher.matching_pattern(&relative, &name) {
                        Some(pattern) => {
                            tracing::debug!(path = %relative, %pattern, "ignored");
                            false
                        }
                        None => true,
                    }
                });
            });

        for item in walker {
            if cancel.is_cancelled() {
                tracing::info!(root = %root.display(), "scan cancelled");
                return Err(ScanError::Cancelled);
            }

            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| display_path(root, p))
                        .unwrap_or_default();
                    collected.warn_unreadable(path, &err, tracker);
                    continue;
                }
            };

            if entry.depth == 0 {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(root, &path) else {
                continue;
            };
            let file_type = entry.file_type();

            if file_type.is_symlink() {
                tracing::debug!(path = %relative, "skipping symlink");
                continue;
            }

            if file_type.is_dir() {
                if let Some(err) = &entry.read_children_error {
                    collected.warn_unreadable(relative.clone(), err, tracker);
                }
                tracker.record_dir(&relative);
                collected.directories.push(DirectoryEntry::new(relative));
            } else if file_type.is_file() {
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        tracing::warn!(path = %relative, error = %err, "cannot read metadata");
                        tracker.record_warning();
                        collected
                            .warnings
                            .push(ScanWarning::metadata_error(relative, err));
                        continue;
                    }
                };

                let size = metadata.len();
                let modified = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                let file = FileEntry::new(relative, size, modified, None);
                let line_count = if config.is_countable(&file.extension) {
                    count_lines(&path)
                } else {
                    None
                };

                if tracker.record_file(&file.path, size) {
                    let _ = self.progress_tx.send(tracker.snapshot());
                }
                collected.files.push(FileEntry { line_count, ..file });
            }
        }

        Ok(())
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Entries gathered during one walk.
#[derive(Default)]
struct Collected {
    files: Vec<FileEntry>,
    directories: Vec<DirectoryEntry>,
    warnings: Vec<ScanWarning>,
    unreadable: HashSet<CompactString>,
}

impl Collected {
    fn warn_unreadable(
        &mut self,
        path: CompactString,
        error: &impl std::fmt::Display,
        tracker: &mut ProgressTracker,
    ) {
        // jwalk can surface the same failure on the entry and as an item.
        if !self.unreadable.insert(path.clone()) {
            return;
        }
        tracing::warn!(%path, %error, "cannot list directory");
        tracker.record_warning();
        self.warnings.push(ScanWarning::not_readable(path, error));
    }
}

/// Slash-separated path of `path` relative to `root`.
pub(crate) fn relative_path(root: &Path, path: &Path) -> Option<CompactString> {
    let relative = path.strip_prefix(root).ok()?;
    let mut out = CompactString::default();
    for component in relative.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(out)
}

fn display_path(root: &Path, path: &Path) -> CompactString {
    relative_path(root, path)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}

/// Number of newlines plus one; `None` when the file cannot be read.
fn count_lines(path: &Path) -> Option<u64> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes.iter().filter(|&&b| b == b'\n').count() as u64 + 1),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "cannot count lines");
            None
        }
    }
}
