//! Boolean quality predicates evaluated per source file.
//!
//! These are independent of rules: a file either has a documentation block,
//! a namespace, a strict-types declaration and a logger reference, or it
//! does not. The results feed the quality summary, never the issue list.

use compact_str::CompactString;
use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Configuration for the quality predicates.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct QualityConfig {
    /// Extensions the predicates run on.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns for paths that are expected to reference a logger.
    #[builder(default = "default_logger_expected()")]
    #[serde(default = "default_logger_expected")]
    pub logger_expected: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

/// Default locations where missing logging is reported.
pub fn default_logger_expected() -> Vec<String> {
    [
        "**/Services/**",
        "**/Controllers/**",
        "**/Auth/**",
        "**/*Controller.php",
        "**/*Service.php",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            logger_expected: default_logger_expected(),
        }
    }
}

impl QualityConfig {
    /// Create a new config builder.
    pub fn builder() -> QualityConfigBuilder {
        QualityConfigBuilder::default()
    }
}

/// Predicate results for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub has_docs: bool,
    pub has_namespace: bool,
    pub has_strict_types: bool,
    pub has_logger: bool,
    /// Whether the path is one where a logger is expected.
    pub logger_expected: bool,
}

impl QualityReport {
    /// Logger absence only counts where a logger is expected.
    pub fn missing_logger(&self) -> bool {
        self.logger_expected && !self.has_logger
    }
}

/// Evaluates the quality predicates.
#[derive(Debug, Clone)]
pub struct QualityChecker {
    extensions: Vec<CompactString>,
    logger_globs: GlobSet,
}

impl QualityChecker {
    /// Create a checker. Invalid glob patterns are skipped with a warning.
    pub fn new(config: &QualityConfig) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.logger_expected {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => tracing::warn!(%pattern, error = %err, "skipping logger glob"),
            }
        }
        let logger_globs = builder.build().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "cannot build logger globs");
            GlobSet::empty()
        });

        Self {
            extensions: config
                .extensions
                .iter()
                .map(|ext| CompactString::new(ext.trim_start_matches('.').to_lowercase()))
                .collect(),
            logger_globs,
        }
    }

    /// Check if the predicates run on files with this extension.
    pub fn applies_to(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Check if a logger is expected at this relative path.
    pub fn expects_logger(&self, path: &str) -> bool {
        self.logger_globs.is_match(path)
    }

    /// Evaluate every predicate on one file.
    pub fn evaluate(&self, path: &str, content: &str) -> QualityReport {
        QualityReport {
            has_docs: has_doc_block(content),
            has_namespace: has_namespace(content),
            has_strict_types: has_strict_types(content),
            has_logger: has_logger(content),
            logger_expected: self.expects_logger(path),
        }
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new(&QualityConfig::default())
    }
}

fn has_doc_block(content: &str) -> bool {
    content
        .find("/**")
        .is_some_and(|start| content[start + 3..].contains("*/"))
}

fn has_namespace(content: &str) -> bool {
    content.lines().any(|line| {
        line.trim_start()
            .strip_prefix("namespace")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })
}

fn has_strict_types(content: &str) -> bool {
    content.lines().any(|line| {
        let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        compact.contains("declare(strict_types=1)")
    })
}

fn has_logger(content: &str) -> bool {
    content.contains("Logger::")
        || content.contains("\\Logger")
        || content.lines().any(|line| {
            line.trim_start()
                .strip_prefix("use ")
                .is_some_and(|rest| rest.contains("Logger"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "<?php\ndeclare(strict_types=1);\n\nnamespace App\\Services;\n\nuse App\\Log\\Logger;\n\n/**\n * Sends mail.\n */\nclass Mailer {}\n";

    #[test]
    fn test_all_predicates_hold() {
        let checker = QualityChecker::default();
        let report = checker.evaluate("app/Services/Mailer.php", GOOD);
        assert!(report.has_docs);
        assert!(report.has_namespace);
        assert!(report.has_strict_types);
        assert!(report.has_logger);
        assert!(report.logger_expected);
        assert!(!report.missing_logger());
    }

    #[test]
    fn test_bare_file() {
        let checker = QualityChecker::default();
        let report = checker.evaluate("app/Services/Mailer.php", "<?php\n/* plain */\necho 1;\n");
        assert!(!report.has_docs);
        assert!(!report.has_namespace);
        assert!(!report.has_strict_types);
        assert!(report.missing_logger());
    }

    #[test]
    fn test_logger_only_expected_in_matching_paths() {
        let checker = QualityChecker::default();
        assert!(checker.expects_logger("src/Controllers/Home.php"));
        assert!(checker.expects_logger("UserController.php"));
        assert!(checker.expects_logger("lib/PaymentService.php"));
        assert!(checker.expects_logger("Auth/Login.php"));
        assert!(!checker.expects_logger("public/index.php"));

        let report = checker.evaluate("public/index.php", "<?php\n");
        assert!(!report.missing_logger());
    }

    #[test]
    fn test_logger_references() {
        assert!(has_logger("Logger::info('x');"));
        assert!(has_logger("$log = new \\Logger();"));
        assert!(has_logger("use Monolog\\Logger;"));
        assert!(!has_logger("$logger->info('x');"));
    }

    #[test]
    fn test_strict_types_tolerates_spacing() {
        assert!(has_strict_types("declare( strict_types = 1 );"));
        assert!(!has_strict_types("declare(strict_types=0);"));
    }

    #[test]
    fn test_namespace_needs_keyword_boundary() {
        assert!(has_namespace("  namespace Foo;"));
        assert!(!has_namespace("$namespaced = 1;"));
        assert!(!has_namespace("namespaces();"));
    }

    #[test]
    fn test_invalid_glob_is_skipped() {
        let config = QualityConfig::builder()
            .logger_expected(vec!["[".to_string(), "**/Jobs/**".to_string()])
            .build()
            .unwrap();
        let checker = QualityChecker::new(&config);
        assert!(checker.expects_logger("app/Jobs/Send.php"));
    }

    #[test]
    fn test_extension_filter() {
        let checker = QualityChecker::default();
        assert!(checker.applies_to("php"));
        assert!(checker.applies_to("PHP"));
        assert!(!checker.applies_to("js"));
    }
}
