//! Error and warning types for scanning and analysis.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan or analysis call.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root path does not exist or cannot be listed.
    #[error("Cannot read {path}: {source}")]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create a not-readable error with path context.
    pub fn not_readable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::NotReadable {
            path: path.into(),
            source,
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A subdirectory could not be listed.
    NotReadable,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal warning encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Relative path where the warning occurred.
    pub path: CompactString,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a warning for a directory that could not be listed.
    pub fn not_readable(path: impl Into<CompactString>, error: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot list directory {path}: {error}"),
            path,
            kind: WarningKind::NotReadable,
        }
    }

    /// Create a metadata error warning.
    pub fn metadata_error(path: impl Into<CompactString>, error: impl std::fmt::Display) -> Self {
        let path = path.into();
        Self {
            message: format!("Metadata error: {error}"),
            path,
            kind: WarningKind::MetadataError,
        }
    }
}

/// Kind of per-file analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// File vanished or lost permissions between listing and reading.
    FileUnreadable,
}

/// A file that could not be analyzed. Recorded as data, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFailure {
    /// Relative path of the file.
    pub path: CompactString,
    /// Failure kind.
    pub kind: FailureKind,
    /// Underlying error message.
    pub message: String,
}

impl AnalysisFailure {
    /// Create a failure for a file whose content could not be read.
    pub fn unreadable(path: impl Into<CompactString>, error: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            kind: FailureKind::FileUnreadable,
            message: error.to_string(),
        }
    }
}

/// Problem found while compiling a rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
    /// The rule's pattern failed to compile; the rule is excluded.
    #[error("Rule '{rule_id}' has an invalid pattern: {error}")]
    InvalidRulePattern { rule_id: String, error: String },

    /// The rule's severity is unknown; the rule is excluded.
    #[error("Rule '{rule_id}' has an unknown severity '{severity}'")]
    UnknownSeverity { rule_id: String, severity: String },
}

impl RuleWarning {
    /// Id of the rule this warning is about.
    pub fn rule_id(&self) -> &str {
        match self {
            Self::InvalidRulePattern { rule_id, .. } | Self::UnknownSeverity { rule_id, .. } => {
                rule_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_readable_display() {
        let err = ScanError::not_readable(
            "/missing/root",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        assert!(matches!(err, ScanError::NotReadable { .. }));
        assert!(err.to_string().contains("/missing/root"));
    }

    #[test]
    fn test_scan_warning_creation() {
        let warning = ScanWarning::not_readable("private", "permission denied");
        assert_eq!(warning.kind, WarningKind::NotReadable);
        assert!(warning.message.contains("private"));
    }

    #[test]
    fn test_analysis_failure_from_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let failure = AnalysisFailure::unreadable("src/a.php", &err);
        assert_eq!(failure.kind, FailureKind::FileUnreadable);
        assert_eq!(failure.path, "src/a.php");
    }

    #[test]
    fn test_rule_warning_id() {
        let warning = RuleWarning::InvalidRulePattern {
            rule_id: "broken".to_string(),
            error: "unclosed group".to_string(),
        };
        assert_eq!(warning.rule_id(), "broken");
        assert!(warning.to_string().contains("broken"));
    }
}
