//! Rule evaluation over file contents.

use std::fs;
use std::io;
use std::path::PathBuf;

use derive_builder::Builder;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use projectlens_core::{
    Analysis, AnalysisFailure, FileEntry, Issue, QualitySummary, Rule, RuleSet, ScanError,
};

use crate::quality::{QualityChecker, QualityConfig, QualityReport};

/// Longest snippet kept for an issue, in characters.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Characters kept before the match when a long line is windowed.
const SNIPPET_LEAD_CHARS: usize = 40;

/// Where file contents come from.
pub trait ContentSource: Sync {
    /// Read the file at a relative path.
    fn read(&self, path: &str) -> io::Result<String>;
}

impl<F> ContentSource for F
where
    F: Fn(&str) -> io::Result<String> + Sync,
{
    fn read(&self, path: &str) -> io::Result<String> {
        self(path)
    }
}

/// Reads files below a root directory, decoding invalid UTF-8 lossily.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsSource {
    fn read(&self, path: &str) -> io::Result<String> {
        let bytes = fs::read(self.root.join(path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Configuration for the analyzer.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into))]
pub struct AnalyzerConfig {
    /// Worker threads; 0 uses the global rayon pool.
    #[builder(default = "0")]
    pub threads: usize,

    /// Quality predicate settings.
    #[builder(default)]
    pub quality: QualityConfig,
}

impl AnalyzerConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }
}

/// Per-file outcome, merged in file order.
enum FileOutcome {
    Skipped,
    Analyzed {
        issues: Vec<Issue>,
        quality: Option<QualityReport>,
        lines: u64,
    },
    Failed(AnalysisFailure),
}

/// Applies a rule set and the quality predicates to a file list.
pub struct RuleAnalyzer {
    config: AnalyzerConfig,
    quality: QualityChecker,
}

impl RuleAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let quality = QualityChecker::new(&config.quality);
        Self { config, quality }
    }

    /// Analyze every file in `files`.
    pub fn analyze(
        &self,
        files: &[FileEntry],
        rules: &RuleSet,
        source: &dyn ContentSource,
    ) -> Result<Analysis, ScanError> {
        self.analyze_with_cancel(files, rules, source, &CancellationToken::new())
    }

    /// Analyze every file, returning [`ScanError::Cancelled`] once `cancel`
    /// fires.
    pub fn analyze_with_cancel(
        &self,
        files: &[FileEntry],
        rules: &RuleSet,
        source: &dyn ContentSource,
        cancel: &CancellationToken,
    ) -> Result<Analysis, ScanError> {
        let run = || -> Vec<FileOutcome> {
            files
                .par_iter()
                .map(|file| self.analyze_file(file, rules, source, cancel))
                .collect()
        };

        let outcomes = match self.config.threads {
            0 => run(),
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(run),
                Err(err) => {
                    tracing::warn!(threads = n, error = %err, "falling back to global pool");
                    run()
                }
            },
        };

        if cancel.is_cancelled() {
            tracing::info!("analysis cancelled");
            return Err(ScanError::Cancelled);
        }

        let analysis = merge(files, outcomes);
        tracing::info!(
            files = analysis.files_analyzed,
            issues = analysis.issues.len(),
            failures = analysis.failures.len(),
            "analysis finished"
        );
        Ok(analysis)
    }

    fn analyze_file(
        &self,
        file: &FileEntry,
        rules: &RuleSet,
        source: &dyn ContentSource,
        cancel: &CancellationToken,
    ) -> FileOutcome {
        if cancel.is_cancelled() {
            return FileOutcome::Skipped;
        }

        let applicable: Vec<&Rule> = rules.applicable(&file.extension).collect();
        let check_quality = self.quality.applies_to(&file.extension);
        if applicable.is_empty() && !check_quality {
            return FileOutcome::Skipped;
        }

        let content = match source.read(&file.path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %file.path, error = %err, "cannot read file");
                return FileOutcome::Failed(AnalysisFailure::unreadable(file.path.clone(), &err));
            }
        };

        let index = LineIndex::new(&content);
        let mut issues = Vec::new();
        for rule in applicable {
            // Empty matches carry no text to report.
            for m in rule.pattern.find_iter(&content).filter(|m| !m.is_empty()) {
                let line = index.line_of(m.start());
                let snippet = index.snippet(&content, m.start());
                issues.push(Issue::from_rule(rule, file.path.clone(), Some(line), snippet));
            }
        }
        issues.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        if !issues.is_empty() {
            tracing::debug!(path = %file.path, issues = issues.len(), "rules matched");
        }

        FileOutcome::Analyzed {
            issues,
            quality: check_quality.then(|| self.quality.evaluate(&file.path, &content)),
            lines: index.line_count(),
        }
    }
}

impl Default for RuleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(files: &[FileEntry], outcomes: Vec<FileOutcome>) -> Analysis {
    let mut analysis = Analysis::default();
    let quality: &mut QualitySummary = &mut analysis.quality;

    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            FileOutcome::Skipped => {}
            FileOutcome::Failed(failure) => analysis.failures.push(failure),
            FileOutcome::Analyzed {
                issues,
                quality: report,
                lines,
            } => {
                analysis.files_analyzed += 1;
                analysis.issues.extend(issues);

                let Some(report) = report else { continue };
                quality.files_checked += 1;
                quality.total_lines += lines;
                if !report.has_docs {
                    quality.missing_docs.push(file.path.clone());
                }
                if report.missing_logger() {
                    quality.missing_logger.push(file.path.clone());
                }
                if !report.has_namespace {
                    quality.missing_namespace.push(file.path.clone());
                }
                if !report.has_strict_types {
                    quality.missing_strict_types.push(file.path.clone());
                }
            }
        }
    }

    analysis
}

/// Byte offsets of every newline in a text.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        Self {
            newlines: content
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| (b == b'\n').then_some(i))
                .collect(),
        }
    }

    /// Number of newlines plus one.
    fn line_count(&self) -> u64 {
        self.newlines.len() as u64 + 1
    }

    /// 1-indexed line containing `offset`.
    fn line_of(&self, offset: usize) -> u64 {
        self.newlines.partition_point(|&nl| nl < offset) as u64 + 1
    }

    /// Trimmed text of the line containing `offset`, capped in length.
    ///
    /// Long lines are cut to a window that still holds the text at `offset`.
    fn snippet(&self, content: &str, offset: usize) -> Option<String> {
        let idx = self.newlines.partition_point(|&nl| nl < offset);
        let start = if idx == 0 { 0 } else { self.newlines[idx - 1] + 1 };
        let end = self.newlines.get(idx).copied().unwrap_or(content.len());
        let raw = &content[start..end];
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        let line_start = start + (raw.len() - raw.trim_start().len());
        let rel = offset.saturating_sub(line_start).min(line.len());
        let column = line[..rel].chars().count();
        if column + SNIPPET_LEAD_CHARS < SNIPPET_MAX_CHARS {
            return Some(truncate_chars(line, SNIPPET_MAX_CHARS));
        }

        let from = column - SNIPPET_LEAD_CHARS;
        let begin = line.char_indices().nth(from).map_or(line.len(), |(i, _)| i);
        Some(format!("…{}", truncate_chars(&line[begin..], SNIPPET_MAX_CHARS)))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_offsets() {
        let content = "a\nbb\n\nccc";
        let index = LineIndex::new(content);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_snippet_is_trimmed_line() {
        let content = "<?php\n    echo $x;  \n";
        let index = LineIndex::new(content);
        let offset = content.find("echo").unwrap();
        assert_eq!(index.snippet(content, offset).as_deref(), Some("echo $x;"));
    }

    #[test]
    fn test_snippet_truncation_is_char_safe() {
        let long = "é".repeat(250);
        let index = LineIndex::new(&long);
        let snippet = index.snippet(&long, 0).unwrap();
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(snippet.ends_with('…'));
    }

    #[test]
    fn test_snippet_window_follows_late_match() {
        let content = format!("{}console.log(x);{}", "a".repeat(500), "b".repeat(500));
        let index = LineIndex::new(&content);
        let offset = content.find("console.log(").unwrap();
        let snippet = index.snippet(&content, offset).unwrap();

        assert!(snippet.contains("console.log("));
        assert!(snippet.starts_with('…'));
        assert!(snippet.ends_with('…'));
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 2);
    }

    #[test]
    fn test_snippet_window_is_char_safe() {
        let content = format!("{}dd(1)", "é".repeat(300));
        let index = LineIndex::new(&content);
        let offset = content.find("dd(").unwrap();
        let snippet = index.snippet(&content, offset).unwrap();
        assert_eq!(snippet, format!("…{}dd(1)", "é".repeat(SNIPPET_LEAD_CHARS)));
    }

    #[test]
    fn test_empty_file_has_one_line() {
        assert_eq!(LineIndex::new("").line_count(), 1);
    }
}
