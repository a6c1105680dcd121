//! Rule file storage and the built-in starter rules.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use projectlens_core::{RuleDefinition, RuleSet, RuleWarning, Severity};

use crate::error::{ConfigError, ConfigResult};
use crate::fs::{read_optional, write_atomic};

/// Default rule file name, next to the config file.
pub const DEFAULT_RULES_FILE: &str = "rules.toml";

/// On-disk layout: one `[rules.<id>]` table per rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: IndexMap<String, RuleDefinition>,
}

/// Loads and saves rule definitions in a TOML file.
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
}

impl RuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the definitions. A missing file yields an empty map.
    pub fn load(&self) -> ConfigResult<IndexMap<String, RuleDefinition>> {
        let Some(content) = read_optional(&self.path)? else {
            tracing::warn!(path = %self.path.display(), "rule file not found, no rules loaded");
            return Ok(IndexMap::new());
        };

        let file: RuleFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), rules = file.rules.len(), "loaded rules");
        Ok(file.rules)
    }

    /// Load and compile, returning the usable rules and one warning per
    /// excluded rule.
    pub fn compile(&self) -> ConfigResult<(RuleSet, Vec<RuleWarning>)> {
        Ok(RuleSet::compile(&self.load()?))
    }

    /// Replace the file with these definitions. Concurrent writers never
    /// interleave; the last one wins.
    pub fn save(&self, rules: &IndexMap<String, RuleDefinition>) -> ConfigResult<()> {
        let content = to_toml(rules)?;
        write_atomic(&self.path, &content)?;
        tracing::info!(path = %self.path.display(), rules = rules.len(), "saved rules");
        Ok(())
    }
}

/// Serialize definitions in the rule file layout.
pub fn to_toml(rules: &IndexMap<String, RuleDefinition>) -> ConfigResult<String> {
    let file = RuleFile {
        rules: rules.clone(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

/// Built-in starter rules for PHP and JavaScript projects.
pub fn default_rules() -> IndexMap<String, RuleDefinition> {
    let mut rules = IndexMap::new();

    rules.insert(
        "no_debug_code".to_string(),
        RuleDefinition::new(
            r"\b(?:var_dump|print_r|dd|console\.log)\s*\(",
            "Debug code found",
            Severity::Warning,
        )
        .with_extensions(["php", "js"])
        .with_suggestion("Remove debug output before committing"),
    );
    rules.insert(
        "no_sql_injection".to_string(),
        RuleDefinition::new(
            r#"\$\w+\s*\.?\s*["']\s*SELECT.*["']"#,
            "Possible SQL injection, use prepared statements",
            Severity::Critical,
        )
        .with_extensions(["php"])
        .with_suggestion("Bind values with PDO::prepare() instead of concatenating")
        .case_insensitive(),
    );
    rules.insert(
        "no_php_short_tags".to_string(),
        RuleDefinition::new(
            r"<\?(?:$|[^p]|p(?:$|[^h])|ph(?:$|[^p]))",
            "Use <?php instead of <?",
            Severity::Warning,
        )
        .with_extensions(["php"])
        .multiline(),
    );
    rules.insert(
        "no_echo_without_escape".to_string(),
        RuleDefinition::new(
            r"echo\s+\$[a-zA-Z_]",
            "Variable echoed without escaping",
            Severity::Warning,
        )
        .with_extensions(["php"])
        .with_suggestion("Wrap the value in htmlspecialchars()"),
    );

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let (rules, warnings) = RuleSet::compile(&default_rules());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_default_rules_match_intended_code() {
        let (rules, _) = RuleSet::compile(&default_rules());
        let matches = |id: &str, text: &str| rules.get(id).unwrap().pattern.is_match(text);

        assert!(matches("no_debug_code", "var_dump($x);"));
        assert!(matches("no_debug_code", "console.log(value)"));
        assert!(!matches("no_debug_code", "$this->add($x);"));

        assert!(matches("no_sql_injection", r#"$sql = $id . "select * from t""#));
        assert!(matches("no_php_short_tags", "<? echo 1; ?>"));
        assert!(!matches("no_php_short_tags", "<?php echo 1;"));
        assert!(matches("no_php_short_tags", "<?= $title ?>"));
        assert!(matches("no_php_short_tags", "<?\necho 1;"));
        assert!(matches("no_php_short_tags", "<?ph"));
        assert!(matches("no_echo_without_escape", "echo $name;"));
    }

    #[test]
    fn test_rule_file_layout() {
        let text = to_toml(&default_rules()).unwrap();
        assert!(text.contains("[rules.no_debug_code]"));
        let parsed: RuleFile = toml::from_str(&text).unwrap();
        assert_eq!(parsed.rules, default_rules());
    }
}
