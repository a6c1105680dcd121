//! Issues produced by rule evaluation.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::rule::{Rule, Severity};

/// One occurrence of a rule matching in one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    /// Id of the rule that matched.
    pub rule_id: CompactString,
    /// Rule message.
    pub message: String,
    /// Rule severity.
    pub severity: Severity,
    /// Relative path of the file.
    pub file_path: CompactString,
    /// 1-indexed line of the match start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    /// Bounded excerpt of the matching line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Suggested fix from the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Create an issue for a rule match.
    pub fn from_rule(
        rule: &Rule,
        file_path: impl Into<CompactString>,
        line: Option<u64>,
        snippet: Option<String>,
    ) -> Self {
        Self {
            rule_id: rule.id.clone(),
            message: rule.message.clone(),
            severity: rule.severity,
            file_path: file_path.into(),
            line,
            snippet,
            suggestion: rule.suggestion.clone(),
        }
    }

    /// File name part of the path.
    pub fn file_name(&self) -> &str {
        crate::entry::base_name(&self.file_path)
    }
}
