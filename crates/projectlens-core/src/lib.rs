//! Core types and traits for projectlens.
//!
//! This crate provides the fundamental data structures shared by the
//! scanner, analyzer and report crates: file and directory entries, the
//! display tree, rules and issues, and scan configuration.

mod config;
mod entry;
mod error;
mod ignore;
mod issue;
mod natural;
mod result;
mod rule;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use entry::{
    DirectoryEntry, FileEntry, NodeKind, TreeEntry, TreeNode, base_name, extension_of, parent_of,
};
pub use error::{AnalysisFailure, FailureKind, RuleWarning, ScanError, ScanWarning, WarningKind};
pub use ignore::IgnoreMatcher;
pub use issue::Issue;
pub use natural::natural_cmp;
pub use result::{Analysis, ImportantFile, QualitySummary, ScanResult, ScanStats};
pub use rule::{Rule, RuleDefinition, RuleSet, Severity};
