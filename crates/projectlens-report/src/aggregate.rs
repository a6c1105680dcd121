//! Combine a scan result and important-file checks into a report.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use projectlens_core::{
    AnalysisFailure, ImportantFile, Issue, QualitySummary, RuleWarning, ScanResult, ScanWarning,
    Severity, TreeNode,
};

/// Headline numbers of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_files: u64,
    pub total_dirs: u64,
    pub total_size: u64,
    pub total_lines: u64,
    pub files_analyzed: u64,
    pub files_checked: u64,
    pub total_issues: u64,
    /// Every severity is present; the counts sum to `total_issues`.
    pub by_severity: BTreeMap<Severity, u64>,
    pub missing_docs: u64,
    pub missing_logger: u64,
    pub missing_namespace: u64,
    pub missing_strict_types: u64,
    pub scan_duration_ms: u64,
}

/// Everything a renderer needs, detached from the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Display name of the project.
    pub project: String,
    pub root: PathBuf,
    /// Taken from the scan so renders are reproducible.
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub tree: Vec<TreeNode>,
    pub important_files: Vec<ImportantFile>,
    /// Issues grouped by file, in the order files were analyzed.
    pub issues_by_file: IndexMap<CompactString, Vec<Issue>>,
    pub quality: QualitySummary,
    pub failures: Vec<AnalysisFailure>,
    pub warnings: Vec<ScanWarning>,
    pub rule_warnings: Vec<RuleWarning>,
}

impl Report {
    /// All issues in reporting order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues_by_file.values().flatten()
    }

    /// Issues of one severity in reporting order.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues().filter(move |issue| issue.severity == severity)
    }

    /// Check if any important file is missing.
    pub fn has_missing_files(&self) -> bool {
        self.important_files.iter().any(|f| !f.present)
    }
}

/// Builds [`Report`]s.
#[derive(Debug, Clone, Default)]
pub struct ReportAggregator {
    project_name: Option<String>,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the project name, which otherwise comes from the root.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Aggregate a finished scan.
    pub fn aggregate(&self, result: ScanResult, important_files: Vec<ImportantFile>) -> Report {
        let stats = result.stats();
        let quality = result.quality;

        let summary = ReportSummary {
            total_files: stats.total_files,
            total_dirs: stats.total_dirs,
            total_size: stats.total_size,
            total_lines: stats.total_lines,
            files_analyzed: stats.files_analyzed,
            files_checked: quality.files_checked,
            total_issues: stats.total_issues,
            by_severity: stats.by_severity,
            missing_docs: quality.missing_docs.len() as u64,
            missing_logger: quality.missing_logger.len() as u64,
            missing_namespace: quality.missing_namespace.len() as u64,
            missing_strict_types: quality.missing_strict_types.len() as u64,
            scan_duration_ms: result.scan_duration.as_millis() as u64,
        };

        let mut issues_by_file: IndexMap<CompactString, Vec<Issue>> = IndexMap::new();
        for issue in result.issues {
            issues_by_file
                .entry(issue.file_path.clone())
                .or_default()
                .push(issue);
        }

        let project = self.project_name.clone().unwrap_or_else(|| {
            result
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| result.root.display().to_string())
        });

        tracing::debug!(
            %project,
            issues = summary.total_issues,
            files_with_issues = issues_by_file.len(),
            "aggregated report"
        );

        Report {
            project,
            root: result.root,
            generated_at: result.scanned_at,
            summary,
            tree: result.tree,
            important_files,
            issues_by_file,
            quality,
            failures: result.failures,
            warnings: result.warnings,
            rule_warnings: result.rule_warnings,
        }
    }
}

/// Aggregate with the default project name.
pub fn aggregate(result: ScanResult, important_files: Vec<ImportantFile>) -> Report {
    ReportAggregator::new().aggregate(result, important_files)
}
