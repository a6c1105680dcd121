//! Application configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use projectlens_analyze::quality::default_logger_expected;
use projectlens_analyze::{AnalyzerConfig, QualityConfig};
use projectlens_core::ScanConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::fs::{read_optional, write_atomic};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "projectlens.toml";

/// Top-level configuration.
///
/// Every field has a default, so a partial or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Files whose presence is reported, relative to the project root.
    pub important_files: Vec<String>,

    /// Rule file; relative paths resolve against the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    pub scan: ScanSection,

    pub analysis: AnalysisSection,
}

/// `[scan]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Ignore patterns, see [`projectlens_core::IgnoreMatcher`].
    pub ignore_patterns: Vec<String>,

    /// Extensions whose files get a line count.
    pub countable_extensions: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            countable_extensions: vec!["php".to_string()],
        }
    }
}

/// `[analysis]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Worker threads (0 = rayon default).
    pub threads: usize,

    /// Extensions the quality predicates run on.
    pub quality_extensions: Vec<String>,

    /// Globs for paths expected to reference a logger.
    pub logger_expected: Vec<String>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let quality = QualityConfig::default();
        Self {
            threads: 0,
            quality_extensions: quality.extensions,
            logger_expected: quality.logger_expected,
        }
    }
}

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// `None` when the built-in defaults are in use.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Resolved path of the rule file, if one is configured.
    pub fn rules_path(&self) -> Option<PathBuf> {
        let rules = self.config.rules_file.as_ref()?;
        if rules.is_absolute() {
            return Some(rules.clone());
        }
        let base = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        Some(base.join(rules))
    }
}

impl AppConfig {
    /// Per-user config file location.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("projectlens").join("config.toml"))
    }

    /// Candidate files in lookup order.
    pub fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
        match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
                .chain(Self::user_config_path())
                .collect(),
        }
    }

    /// Load the first existing candidate, or the defaults when none exists.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
        for path in Self::candidates(explicit) {
            if let Some(config) = Self::load_optional(&path)? {
                tracing::info!(path = %path.display(), "loaded configuration");
                return Ok(LoadedConfig {
                    config,
                    source: Some(path),
                });
            }
            if explicit.is_some() {
                tracing::warn!(path = %path.display(), "configuration file not found, using defaults");
            }
        }

        tracing::info!("no configuration file found, using defaults");
        Ok(LoadedConfig::default())
    }

    /// Load a config file; a missing file yields `None`.
    pub fn load_optional(path: &Path) -> ConfigResult<Option<Self>> {
        read_optional(path)?
            .map(|content| Self::parse(&content, path))
            .transpose()
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config atomically.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        write_atomic(path, &self.to_toml()?)
    }

    /// Starter configuration for a typical PHP project.
    pub fn recommended() -> Self {
        Self {
            important_files: ["README.md", "composer.json", ".env.example", "index.php"]
                .into_iter()
                .map(String::from)
                .collect(),
            rules_file: Some(PathBuf::from(crate::rules::DEFAULT_RULES_FILE)),
            scan: ScanSection {
                ignore_patterns: [
                    ".git", ".idea", ".vscode", "vendor/", "node_modules/", "cache/", "logs/",
                    "~",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
                ..ScanSection::default()
            },
            analysis: AnalysisSection {
                logger_expected: default_logger_expected(),
                ..AnalysisSection::default()
            },
        }
    }

    /// Scanner configuration for a project root.
    pub fn scan_config(&self, root: impl Into<PathBuf>) -> ScanConfig {
        ScanConfig {
            root: root.into(),
            ignore_patterns: self.scan.ignore_patterns.clone(),
            countable_extensions: self.scan.countable_extensions.clone(),
        }
    }

    /// Analyzer configuration.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            threads: self.analysis.threads,
            quality: QualityConfig {
                extensions: self.analysis.quality_extensions.clone(),
                logger_expected: self.analysis.logger_expected.clone(),
            },
        }
    }
}
