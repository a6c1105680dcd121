//! Text, JSON and context renderings of a [`Report`].

use std::fmt::Write;

use humansize::{BINARY, format_size};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use projectlens_core::{Issue, Severity, base_name};

use crate::aggregate::Report;

/// Entries shown per legacy list.
const LEGACY_LIST_LIMIT: usize = 10;

/// Issues shown per severity in the context summary.
const CONTEXT_ISSUE_LIMIT: usize = 5;

const RULE: &str = "========================================";

/// Output format of [`render`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Context,
}

/// Errors from rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting failed: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Render a report. The same report always renders to the same output.
pub fn render(report: &Report, format: ReportFormat) -> Result<String, RenderError> {
    match format {
        ReportFormat::Text => render_text(report),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Context => render_context(report),
    }
}

fn timestamp(report: &Report) -> String {
    report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn severity_title(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Info => "Info",
    }
}

fn render_text(report: &Report) -> Result<String, RenderError> {
    let mut out = String::new();
    let summary = &report.summary;

    writeln!(out, "=== PROJECT EXPORT: {} ===", report.project)?;
    writeln!(out, "Generated: {}", timestamp(report))?;
    writeln!(out, "{RULE}")?;
    writeln!(out)?;

    writeln!(out, "📁 PROJECT STRUCTURE:")?;
    for node in &report.tree {
        writeln!(out, "{}", node.label)?;
    }

    writeln!(out)?;
    writeln!(out, "🎯 IMPORTANT FILES CHECK:")?;
    for file in &report.important_files {
        let status = if file.present { "✅ EXISTS" } else { "❌ MISSING" };
        writeln!(out, "{status} - {}", file.path)?;
    }

    writeln!(out)?;
    writeln!(out, "🔍 CODE QUALITY ANALYSIS:")?;
    writeln!(out, "  • Total files: {}", summary.total_files)?;
    writeln!(out, "  • Total size: {}", format_size(summary.total_size, BINARY))?;
    writeln!(out, "  • Total lines: {}", summary.total_lines)?;
    writeln!(out, "  • Files analyzed: {}", summary.files_analyzed)?;
    writeln!(out, "  • Total issues: {}", summary.total_issues)?;
    writeln!(out, "  • Files without doc block: {}", summary.missing_docs)?;
    writeln!(out, "  • Files without logger: {}", summary.missing_logger)?;
    writeln!(out, "  • Files without namespace: {}", summary.missing_namespace)?;
    writeln!(out, "  • Files without strict types: {}", summary.missing_strict_types)?;

    writeln!(out)?;
    writeln!(out, "  🚨 ISSUES BY SEVERITY:")?;
    for severity in Severity::iter().rev() {
        let count = summary.by_severity.get(&severity).copied().unwrap_or(0);
        writeln!(out, "    • {}: {count}", severity_title(severity))?;
    }

    if !report.issues_by_file.is_empty() {
        writeln!(out)?;
        writeln!(out, "  📋 ISSUES BY FILE:")?;
        for (path, issues) in &report.issues_by_file {
            writeln!(out)?;
            writeln!(out, "     📄 {} ({path}):", base_name(path))?;
            for issue in issues {
                match issue.line {
                    Some(line) => writeln!(
                        out,
                        "       {} {} (line {line})",
                        issue.severity.icon(),
                        issue.message
                    )?,
                    None => writeln!(out, "       {} {}", issue.severity.icon(), issue.message)?,
                }
                if let Some(suggestion) = &issue.suggestion {
                    writeln!(out, "          💡 SUGGESTION: {suggestion}")?;
                }
                if let Some(snippet) = &issue.snippet {
                    writeln!(out, "          📝 CODE: {snippet}")?;
                }
            }
        }
    }

    let quality = &report.quality;
    for (title, paths) in [
        ("Files without doc block", &quality.missing_docs),
        ("Files without logger", &quality.missing_logger),
        ("Files without namespace", &quality.missing_namespace),
    ] {
        if paths.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "  📋 {title}:")?;
        for path in paths.iter().take(LEGACY_LIST_LIMIT) {
            writeln!(out, "     ❌ {}", base_name(path))?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "⚠️ ANALYSIS FAILURES:")?;
        for failure in &report.failures {
            writeln!(out, "  • {}: {}", failure.path, failure.message)?;
        }
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "⚠️ SCAN WARNINGS:")?;
        for warning in &report.warnings {
            writeln!(out, "  • {}", warning.message)?;
        }
    }

    if !report.rule_warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "⚠️ RULE WARNINGS:")?;
        for warning in &report.rule_warnings {
            writeln!(out, "  • {warning}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "=== END EXPORT ===")?;
    Ok(out)
}

fn render_context(report: &Report) -> Result<String, RenderError> {
    let mut out = String::new();

    writeln!(out, "=== WORKING CONTEXT ===")?;
    writeln!(out, "Project: {}", report.project)?;
    writeln!(out, "Scan Date: {}", timestamp(report))?;

    if report.summary.total_issues > 0 {
        writeln!(out)?;
        writeln!(out, "🔍 CODE QUALITY ISSUES:")?;
        for severity in Severity::iter().rev() {
            let issues: Vec<&Issue> = report.issues_with(severity).collect();
            if issues.is_empty() {
                continue;
            }
            writeln!(out, "  {} ({}):", severity.as_ref().to_uppercase(), issues.len())?;
            for issue in issues.iter().take(CONTEXT_ISSUE_LIMIT) {
                writeln!(out, "    • {}: {}", issue.file_name(), issue.message)?;
            }
            if issues.len() > CONTEXT_ISSUE_LIMIT {
                writeln!(out, "    • ... and {} more", issues.len() - CONTEXT_ISSUE_LIMIT)?;
            }
        }
    }

    let summary = &report.summary;
    writeln!(out)?;
    writeln!(out, "📊 QUALITY:")?;
    writeln!(
        out,
        "  {} files, {} analyzed, {} issues",
        summary.total_files, summary.files_analyzed, summary.total_issues
    )?;
    let gaps = [
        ("doc block", summary.missing_docs),
        ("logger", summary.missing_logger),
        ("namespace", summary.missing_namespace),
        ("strict types", summary.missing_strict_types),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(what, count)| format!("{count} without {what}"))
    .join(", ");
    if !gaps.is_empty() {
        writeln!(out, "  {gaps}")?;
    }

    writeln!(out)?;
    writeln!(out, "🔍 IMPORTANT FILES STATUS:")?;
    for file in &report.important_files {
        let status = if file.present { "✅ FOUND" } else { "❌ MISSING" };
        writeln!(out, "  {status} - {}", file.path)?;
    }

    writeln!(out)?;
    writeln!(out, "=== END CONTEXT ===")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!(ReportFormat::Context.to_string(), "context");
        assert!("html".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::iter().count(), 3);
    }

    #[test]
    fn test_severity_titles_cover_all() {
        let titles: Vec<&str> = Severity::iter().rev().map(severity_title).collect();
        assert_eq!(titles, vec!["Critical", "Error", "Warning", "Info"]);
    }
}
