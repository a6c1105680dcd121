//! Pattern rules, severities and compiled rule sets.

use compact_str::CompactString;
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::RuleWarning;

/// Severity of a rule match, ordered from least to most serious.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Icon used in text reports.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Critical => "🛑",
            Self::Error => "❌",
            Self::Warning => "⚠️",
            Self::Info => "ℹ️",
        }
    }
}

/// A rule as written in configuration, before its pattern is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Regular expression (Rust `regex` syntax, no look-around).
    pub pattern: String,

    /// Message attached to every issue.
    pub message: String,

    /// Severity name: info, warning, error or critical.
    #[serde(default = "default_severity")]
    pub severity: String,

    /// Extensions this rule applies to; empty means every file.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Suggested fix shown next to each issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Match case-insensitively.
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_insensitive: bool,

    /// Let `^` and `$` match at line boundaries.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiline: bool,
}

fn default_severity() -> String {
    Severity::Warning.to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RuleDefinition {
    /// Create a definition with the given pattern, message and severity.
    pub fn new(pattern: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
            severity: severity.to_string(),
            extensions: Vec::new(),
            suggestion: None,
            case_insensitive: false,
            multiline: false,
        }
    }

    /// Restrict the rule to these extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a suggested fix.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Match case-insensitively.
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Enable multi-line anchors.
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

/// A compiled, immutable rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique id within its rule set.
    pub id: CompactString,
    /// Compiled pattern.
    pub pattern: Regex,
    /// Message for issues.
    pub message: String,
    /// Severity for issues.
    pub severity: Severity,
    /// Lower-cased extensions, empty for all files.
    pub extensions: Vec<CompactString>,
    /// Suggested fix.
    pub suggestion: Option<String>,
    case_insensitive: bool,
    multiline: bool,
}

impl Rule {
    /// Compile a definition into a rule.
    pub fn compile(id: &str, definition: &RuleDefinition) -> Result<Self, RuleWarning> {
        let severity: Severity =
            definition
                .severity
                .parse()
                .map_err(|_| RuleWarning::UnknownSeverity {
                    rule_id: id.to_string(),
                    severity: definition.severity.clone(),
                })?;

        let pattern = RegexBuilder::new(&definition.pattern)
            .case_insensitive(definition.case_insensitive)
            .multi_line(definition.multiline)
            .build()
            .map_err(|e| RuleWarning::InvalidRulePattern {
                rule_id: id.to_string(),
                error: e.to_string(),
            })?;

        let mut extensions: Vec<CompactString> = definition
            .extensions
            .iter()
            .map(|ext| CompactString::new(ext.trim_start_matches('.').to_lowercase()))
            .filter(|ext| !ext.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();

        Ok(Self {
            id: CompactString::new(id),
            pattern,
            message: definition.message.clone(),
            severity,
            extensions,
            suggestion: definition.suggestion.clone(),
            case_insensitive: definition.case_insensitive,
            multiline: definition.multiline,
        })
    }

    /// Check if this rule should run on a file with the given extension.
    pub fn applies_to(&self, extension: &str) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Convert back to a configuration definition.
    pub fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            pattern: self.pattern.as_str().to_string(),
            message: self.message.clone(),
            severity: self.severity.to_string(),
            extensions: self.extensions.iter().map(ToString::to_string).collect(),
            suggestion: self.suggestion.clone(),
            case_insensitive: self.case_insensitive,
            multiline: self.multiline,
        }
    }
}

/// An immutable collection of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every definition, excluding the ones that fail.
    ///
    /// Returns the usable rules together with one warning per excluded rule.
    pub fn compile(definitions: &IndexMap<String, RuleDefinition>) -> (Self, Vec<RuleWarning>) {
        let mut rules = Vec::with_capacity(definitions.len());
        let mut warnings = Vec::new();

        for (id, definition) in definitions {
            match Rule::compile(id, definition) {
                Ok(rule) => rules.push(rule),
                Err(warning) => {
                    tracing::warn!(rule_id = %id, %warning, "excluding rule");
                    warnings.push(warning);
                }
            }
        }

        tracing::debug!(
            compiled = rules.len(),
            excluded = warnings.len(),
            "compiled rule set"
        );

        (Self { rules }, warnings)
    }

    /// All rules in definition order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules that apply to files with the given extension.
    pub fn applicable<'a>(&'a self, extension: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.applies_to(extension))
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Convert back to configuration definitions, keyed by id.
    pub fn definitions(&self) -> IndexMap<String, RuleDefinition> {
        self.rules
            .iter()
            .map(|rule| (rule.id.to_string(), rule.definition()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions(entries: Vec<(&str, RuleDefinition)>) -> IndexMap<String, RuleDefinition> {
        entries
            .into_iter()
            .map(|(id, def)| (id.to_string(), def))
            .collect()
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_parse_and_display() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(Severity::Info.to_string(), "info");
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_compile_excludes_invalid_pattern() {
        let defs = definitions(vec![
            ("good", RuleDefinition::new(r"var_dump\(", "debug", Severity::Warning)),
            ("bad", RuleDefinition::new(r"(unclosed", "broken", Severity::Error)),
        ]);

        let (rules, warnings) = RuleSet::compile(&defs);
        assert_eq!(rules.len(), 1);
        assert!(rules.get("good").is_some());
        assert!(rules.get("bad").is_none());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], RuleWarning::InvalidRulePattern { .. }));
        assert_eq!(warnings[0].rule_id(), "bad");
    }

    #[test]
    fn test_look_around_is_rejected() {
        let defs = definitions(vec![(
            "short_tags",
            RuleDefinition::new(r"<\?(?!php)", "short tag", Severity::Warning),
        )]);
        let (rules, warnings) = RuleSet::compile(&defs);
        assert!(rules.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_compile_excludes_unknown_severity() {
        let mut def = RuleDefinition::new("x", "msg", Severity::Info);
        def.severity = "fatal".to_string();
        let (rules, warnings) = RuleSet::compile(&definitions(vec![("odd", def)]));
        assert!(rules.is_empty());
        assert!(matches!(warnings[0], RuleWarning::UnknownSeverity { .. }));
    }

    #[test]
    fn test_applies_to_extensions() {
        let def = RuleDefinition::new("x", "msg", Severity::Info).with_extensions([".PHP", "js"]);
        let rule = Rule::compile("r", &def).unwrap();
        assert_eq!(rule.extensions, vec!["js", "php"]);
        assert!(rule.applies_to("php"));
        assert!(rule.applies_to("PHP"));
        assert!(rule.applies_to("js"));
        assert!(!rule.applies_to("css"));
    }

    #[test]
    fn test_unrestricted_rule_applies_everywhere() {
        let rule = Rule::compile("r", &RuleDefinition::new("x", "msg", Severity::Info)).unwrap();
        assert!(rule.applies_to("php"));
        assert!(rule.applies_to(""));
    }

    #[test]
    fn test_flags_are_applied() {
        let def = RuleDefinition::new("^select", "sql", Severity::Error)
            .case_insensitive()
            .multiline();
        let rule = Rule::compile("sql", &def).unwrap();
        assert!(rule.pattern.is_match("x\nSELECT 1"));
        assert_eq!(rule.definition(), def);
    }
}
