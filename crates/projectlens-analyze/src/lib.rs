//! Rule-based content analysis for projectlens.
//!
//! This crate evaluates a compiled [`RuleSet`] against the files found by a
//! scan and produces typed issues, plus a separate set of boolean quality
//! predicates per source file.
//!
//! - **Rules** - regex patterns restricted by extension; every match is an issue
//! - **Quality checks** - documentation, namespace, strict types and logging
//!
//! File analysis runs on rayon. Results are merged once, in file-list order,
//! so the output does not depend on scheduling.
//!
//! ```rust,ignore
//! use projectlens_analyze::{FsSource, RuleAnalyzer};
//! use projectlens_core::{RuleSet, ScanConfig};
//! use projectlens_scan::TreeScanner;
//!
//! let result = TreeScanner::new().scan(&ScanConfig::new("/path/to/project")).unwrap();
//! let rules = RuleSet::empty();
//! let source = FsSource::new(&result.root);
//!
//! let analysis = RuleAnalyzer::new().analyze(&result.files, &rules, &source).unwrap();
//! println!("{} issues", analysis.issues.len());
//! ```

mod analyzer;
pub mod quality;

pub use analyzer::{
    AnalyzerConfig, AnalyzerConfigBuilder, ContentSource, FsSource, RuleAnalyzer,
    SNIPPET_MAX_CHARS,
};
pub use quality::{QualityChecker, QualityConfig, QualityConfigBuilder, QualityReport};

// Re-export core types
pub use projectlens_core::{Analysis, AnalysisFailure, Issue, QualitySummary, RuleSet};
