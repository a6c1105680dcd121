//! Ignore-pattern matching for scan candidates.

/// Decides whether a relative path is excluded from a scan.
///
/// A candidate is ignored when any pattern matches it by one of these rules:
///
/// 1. the pattern equals the full relative path;
/// 2. the pattern ends with `/` and the relative path with a trailing `/`
///    appended starts with it (directory prefix);
/// 3. the pattern is a single character and the entry name ends with it
///    (backup suffixes such as `~`);
/// 4. the pattern equals the entry's base name.
///
/// Relative paths are slash-separated and never start with `/`.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<String>,
}

impl IgnoreMatcher {
    /// Create a matcher from an ordered list of patterns.
    ///
    /// Empty patterns are dropped; they would otherwise match nothing useful.
    pub fn new(patterns: impl IntoIterator<Item = String>) -> Self {
        Self {
            patterns: patterns.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Patterns this matcher was built from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check whether the candidate should be skipped.
    pub fn is_ignored(&self, relative_path: &str, name: &str) -> bool {
        self.matching_pattern(relative_path, name).is_some()
    }

    /// Return the first pattern that excludes the candidate.
    pub fn matching_pattern(&self, relative_path: &str, name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| matches(pattern, relative_path, name))
            .map(String::as_str)
    }
}

fn matches(pattern: &str, relative_path: &str, name: &str) -> bool {
    if pattern == relative_path || pattern == name {
        return true;
    }

    if pattern.ends_with('/') {
        let mut with_separator = String::with_capacity(relative_path.len() + 1);
        with_separator.push_str(relative_path);
        with_separator.push('/');
        if with_separator.starts_with(pattern) {
            return true;
        }
    }

    let mut chars = pattern.chars();
    if let (Some(only), None) = (chars.next(), chars.next()) {
        if name.ends_with(only) {
            return true;
        }
    }

    false
}
