//! Configuration and rule storage for projectlens.
//!
//! - [`AppConfig`] - TOML settings for scanning, analysis and reporting,
//!   looked up in `--config`, `./projectlens.toml`, then the user config dir
//! - [`RuleStore`] - rule definitions as `[rules.<id>]` tables, saved
//!   atomically

mod app;
mod error;
mod fs;
mod rules;

pub use app::{AnalysisSection, AppConfig, LOCAL_CONFIG_FILE, LoadedConfig, ScanSection};
pub use error::{ConfigError, ConfigResult};
pub use rules::{DEFAULT_RULES_FILE, RuleFile, RuleStore, default_rules, to_toml};
