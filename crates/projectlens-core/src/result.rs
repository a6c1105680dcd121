//! Scan result container and derived statistics.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::entry::{DirectoryEntry, FileEntry, TreeEntry, TreeNode};
use crate::error::{AnalysisFailure, RuleWarning, ScanWarning};
use crate::issue::Issue;
use crate::rule::Severity;

/// Presence check for a file the project is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantFile {
    /// Path relative to the project root.
    pub path: String,
    /// Whether the path exists.
    pub present: bool,
}

/// Per-project results of the boolean quality predicates.
///
/// Paths are relative and kept in file-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Files the predicates were evaluated on.
    pub files_checked: u64,
    /// Lines across the checked files.
    pub total_lines: u64,
    /// Files without a documentation block.
    pub missing_docs: Vec<CompactString>,
    /// Files expected to log that never reference a logger.
    pub missing_logger: Vec<CompactString>,
    /// Files without a namespace declaration.
    pub missing_namespace: Vec<CompactString>,
    /// Files without a strict-types declaration.
    pub missing_strict_types: Vec<CompactString>,
}

/// Output of one analysis pass over a file list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    /// Issues in reporting order.
    pub issues: Vec<Issue>,
    /// Files that could not be read.
    pub failures: Vec<AnalysisFailure>,
    /// Number of files whose content was evaluated.
    pub files_analyzed: u64,
    /// Quality predicate results.
    pub quality: QualitySummary,
}

/// Summary statistics derived from a [`ScanResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories.
    pub total_dirs: u64,
    /// Total size of all files in bytes.
    pub total_size: u64,
    /// Lines across files that were line-counted.
    pub total_lines: u64,
    /// Number of files whose content was analyzed.
    pub files_analyzed: u64,
    /// Total number of issues.
    pub total_issues: u64,
    /// Issue count per severity; every severity is present.
    pub by_severity: BTreeMap<Severity, u64>,
    /// Issue count per file, in first-seen order.
    pub by_file: IndexMap<CompactString, u64>,
}

impl ScanStats {
    /// Sum of the per-severity counts. Always equals `total_issues`.
    pub fn severity_total(&self) -> u64 {
        self.by_severity.values().sum()
    }

    /// Count for one severity.
    pub fn count(&self, severity: Severity) -> u64 {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Complete result of scanning (and optionally analyzing) a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned.
    pub root: PathBuf,

    /// Files in traversal order.
    pub files: Vec<FileEntry>,

    /// Directories in traversal order.
    pub directories: Vec<DirectoryEntry>,

    /// Display tree in pre-order.
    pub tree: Vec<TreeNode>,

    /// Issues found by the analyzer.
    pub issues: Vec<Issue>,

    /// Files the analyzer could not read.
    pub failures: Vec<AnalysisFailure>,

    /// Non-fatal scan warnings.
    pub warnings: Vec<ScanWarning>,

    /// Rules excluded while compiling the rule set.
    pub rule_warnings: Vec<RuleWarning>,

    /// Quality predicate results.
    pub quality: QualitySummary,

    /// Number of files whose content was analyzed.
    pub files_analyzed: u64,

    /// When this scan was performed.
    pub scanned_at: DateTime<Utc>,

    /// Duration of the scan.
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Create a result from a finished scan, with no analysis attached yet.
    pub fn new(
        root: PathBuf,
        files: Vec<FileEntry>,
        directories: Vec<DirectoryEntry>,
        tree: Vec<TreeNode>,
        warnings: Vec<ScanWarning>,
        scan_duration: Duration,
    ) -> Self {
        Self {
            root,
            files,
            directories,
            tree,
            issues: Vec::new(),
            failures: Vec::new(),
            warnings,
            rule_warnings: Vec::new(),
            quality: QualitySummary::default(),
            files_analyzed: 0,
            scanned_at: Utc::now(),
            scan_duration,
        }
    }

    /// Attach the output of an analysis pass.
    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.issues = analysis.issues;
        self.failures = analysis.failures;
        self.files_analyzed = analysis.files_analyzed;
        self.quality = analysis.quality;
        self
    }

    /// Attach the warnings produced while compiling the rule set.
    pub fn with_rule_warnings(mut self, warnings: Vec<RuleWarning>) -> Self {
        self.rule_warnings = warnings;
        self
    }

    /// Derive summary statistics.
    pub fn stats(&self) -> ScanStats {
        let mut by_severity: BTreeMap<Severity, u64> =
            Severity::iter().map(|severity| (severity, 0)).collect();
        let mut by_file: IndexMap<CompactString, u64> = IndexMap::new();

        for issue in &self.issues {
            *by_severity.entry(issue.severity).or_default() += 1;
            *by_file.entry(issue.file_path.clone()).or_default() += 1;
        }

        ScanStats {
            total_files: self.files.len() as u64,
            total_dirs: self.directories.len() as u64,
            total_size: self.files.iter().map(|f| f.size).sum(),
            total_lines: self.files.iter().filter_map(|f| f.line_count).sum(),
            files_analyzed: self.files_analyzed,
            total_issues: self.issues.len() as u64,
            by_severity,
            by_file,
        }
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.files.len() as u64
    }

    /// Get the total number of directories.
    pub fn total_dirs(&self) -> u64 {
        self.directories.len() as u64
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Tree labels in display order.
    pub fn display_lines(&self) -> Vec<&str> {
        self.tree.iter().map(|node| node.label.as_str()).collect()
    }

    /// Files referenced by the tree, in tree order.
    pub fn tree_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.tree.iter().filter_map(|node| match &node.entry {
            TreeEntry::File(file) => Some(file),
            TreeEntry::Directory(_) => None,
        })
    }

    /// Directories referenced by the tree, in tree order.
    pub fn tree_directories(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.tree.iter().filter_map(|node| match &node.entry {
            TreeEntry::Directory(dir) => Some(dir),
            TreeEntry::File(_) => None,
        })
    }

    /// Look up a file by relative path.
    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.path == path)
    }
}
