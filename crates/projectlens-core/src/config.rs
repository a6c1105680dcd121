//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::ignore::IgnoreMatcher;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Patterns to ignore (see [`IgnoreMatcher`] for the matching rules).
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Extensions whose files get a line count during the scan.
    #[builder(default = "default_countable_extensions()")]
    #[serde(default = "default_countable_extensions")]
    pub countable_extensions: Vec<String>,
}

fn default_countable_extensions() -> Vec<String> {
    vec!["php".to_string()]
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: Vec::new(),
            countable_extensions: default_countable_extensions(),
        }
    }

    /// Build the matcher for this config's ignore patterns.
    pub fn ignore_matcher(&self) -> IgnoreMatcher {
        IgnoreMatcher::new(self.ignore_patterns.iter().cloned())
    }

    /// Check if files with this extension should get a line count.
    pub fn is_countable(&self, extension: &str) -> bool {
        self.countable_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user/project")
            .ignore_patterns(vec!["vendor/".to_string()])
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/project"));
        assert_eq!(config.ignore_patterns, vec!["vendor/"]);
        assert_eq!(config.countable_extensions, vec!["php"]);
    }

    #[test]
    fn test_builder_rejects_empty_root() {
        let result = ScanConfig::builder().root("").build();
        assert!(result.is_err());

        let result = ScanConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_is_countable_ignores_case() {
        let config = ScanConfig::new("/test");
        assert!(config.is_countable("php"));
        assert!(config.is_countable("PHP"));
        assert!(!config.is_countable("js"));
    }

    #[test]
    fn test_ignore_matcher_from_config() {
        let config = ScanConfig::builder()
            .root("/test")
            .ignore_patterns(vec!["node_modules".to_string(), "~".to_string()])
            .build()
            .unwrap();

        let matcher = config.ignore_matcher();
        assert!(matcher.is_ignored("node_modules", "node_modules"));
        assert!(matcher.is_ignored("src/index.php~", "index.php~"));
        assert!(!matcher.is_ignored("src", "src"));
    }
}
