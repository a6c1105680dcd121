//! Issue aggregation and report rendering for projectlens.
//!
//! A [`Report`] is built once from a [`ScanResult`](projectlens_core::ScanResult)
//! and the important-file checks, then rendered as:
//!
//! - **text** - the full human-readable export
//! - **json** - the report serialized as pretty JSON
//! - **context** - a compact summary grouped by severity

mod aggregate;
mod render;

pub use aggregate::{Report, ReportAggregator, ReportSummary, aggregate};
pub use render::{RenderError, ReportFormat, render};
