//! projectlens - project tree scanner with pattern-based code quality reports.
//!
//! Usage:
//!   plens scan [PATH]          Scan, analyze and print a report
//!   plens tree [PATH]          Print the project tree only
//!   plens projects [ROOT]      List projects under a directory
//!   plens rules list|check     Inspect the configured rules
//!   plens rules export         Print the rules as TOML
//!   plens init [DIR]           Write a starter configuration
//!   plens --help               Show help

mod logging;

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::{self, error::RecvError};

use projectlens_analyze::{FsSource, RuleAnalyzer};
use projectlens_config::{AppConfig, DEFAULT_RULES_FILE, LoadedConfig, RuleStore, default_rules};
use projectlens_core::{RuleSet, RuleWarning, ScanConfig, ScanResult};
use projectlens_report::{ReportAggregator, ReportFormat, render};
use projectlens_scan::{ScanProgress, TreeScanner, check_important_files, list_projects};

#[derive(Parser)]
#[command(
    name = "plens",
    version,
    about = "Project tree scanner with pattern-based code quality reports",
    long_about = "projectlens walks a project directory, checks every file against \
                  configurable pattern rules and prints a report.\n\n\
                  Settings are read from --config, ./projectlens.toml or the user \
                  config directory, in that order. Run `plens init` to create one."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a project, analyze it and print a report
    Scan {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rule file (overrides the configured one)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Project name shown in the report
        #[arg(short, long)]
        name: Option<String>,

        /// Analysis threads (0 = one per core)
        #[arg(short, long)]
        threads: Option<usize>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the project tree
    Tree {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List the project directories under a root
    Projects {
        /// Directory holding the projects
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Inspect the configured rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,

        /// Rule file (overrides the configured one)
        #[arg(short, long, global = true)]
        rules: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Write a starter projectlens.toml and rules.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum RulesAction {
    /// List rules with severity and extensions
    List,
    /// Compile every rule and report invalid ones
    Check,
    /// Print the rules as TOML
    Export,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Context,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Context => ReportFormat::Context,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Scan {
            path,
            format,
            output,
            rules,
            name,
            threads,
            config,
        } => {
            let loaded = AppConfig::discover(config.config.as_deref())?;
            run_scan(&path, &loaded, rules, name, threads, format, output)?;
        }
        Command::Tree { path, config } => {
            let loaded = AppConfig::discover(config.config.as_deref())?;
            run_tree(&path, &loaded)?;
        }
        Command::Projects { root } => {
            run_projects(&root)?;
        }
        Command::Rules {
            action,
            rules,
            config,
        } => {
            let loaded = AppConfig::discover(config.config.as_deref())?;
            run_rules(action, &loaded, rules)?;
        }
        Command::Init { dir, force } => {
            run_init(&dir, force)?;
        }
    }

    Ok(())
}

/// Scan, analyze and render a report.
fn run_scan(
    path: &Path,
    loaded: &LoadedConfig,
    rules_override: Option<PathBuf>,
    name: Option<String>,
    threads: Option<usize>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = &loaded.config;
    let result = scan_with_progress(&config.scan_config(path))?;

    let (rules, rule_warnings) = load_rules(loaded, rules_override)?;
    let mut analyzer_config = config.analyzer_config();
    if let Some(threads) = threads {
        analyzer_config.threads = threads;
    }

    eprintln!("Analyzing {} files with {} rules...", result.total_files(), rules.len());
    let source = FsSource::new(&result.root);
    let analysis = RuleAnalyzer::with_config(analyzer_config)
        .analyze(&result.files, &rules, &source)
        .context("Analysis failed")?;

    let important = check_important_files(&result.root, &config.important_files);
    let result = result
        .with_analysis(analysis)
        .with_rule_warnings(rule_warnings);

    let aggregator = match name {
        Some(name) => ReportAggregator::new().with_project_name(name),
        None => ReportAggregator::new(),
    };
    let report = aggregator.aggregate(result, important);
    let rendered = render(&report, format.into()).context("Rendering failed")?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, rendered)
                .with_context(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Report written to {}", output_path.display());
        }
        None => {
            print!("{rendered}");
        }
    }

    Ok(())
}

/// Print the display tree.
fn run_tree(path: &Path, loaded: &LoadedConfig) -> Result<()> {
    let result = scan_with_progress(&loaded.config.scan_config(path))?;

    for line in result.display_lines() {
        println!("{line}");
    }

    println!();
    println!(
        "{} directories, {} files, {}",
        result.total_dirs(),
        result.total_files(),
        format_size(result.stats().total_size)
    );

    if result.has_warnings() {
        println!("{} warning(s) during scan", result.warnings.len());
    }

    Ok(())
}

/// List project directories.
fn run_projects(root: &Path) -> Result<()> {
    let projects = list_projects(root).context("Cannot list projects")?;

    if projects.is_empty() {
        eprintln!("No projects found in {}", root.display());
    }
    for project in projects {
        println!("{project}");
    }

    Ok(())
}

/// List, check or export the configured rules.
fn run_rules(
    action: RulesAction,
    loaded: &LoadedConfig,
    rules_override: Option<PathBuf>,
) -> Result<()> {
    let Some(path) = rules_override.or_else(|| loaded.rules_path()) else {
        bail!("No rule file configured; pass --rules or set rules_file in the config");
    };
    let store = RuleStore::new(path);

    match action {
        RulesAction::List => {
            let definitions = store.load()?;
            for (id, def) in &definitions {
                let extensions = if def.extensions.is_empty() {
                    "*".to_string()
                } else {
                    def.extensions.join(",")
                };
                println!("{id:<28} {:<9} {extensions:<10} {}", def.severity, def.message);
            }
            eprintln!("{} rule(s) in {}", definitions.len(), store.path().display());
        }
        RulesAction::Check => {
            let (rules, warnings) = store.compile()?;
            report_rule_warnings(&warnings);
            println!("{} rule(s) valid, {} excluded", rules.len(), warnings.len());
            if !warnings.is_empty() {
                bail!("{} invalid rule(s) in {}", warnings.len(), store.path().display());
            }
        }
        RulesAction::Export => {
            let definitions = store.load()?;
            print!("{}", projectlens_config::to_toml(&definitions)?);
        }
    }

    Ok(())
}

/// Write the starter configuration files.
fn run_init(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(projectlens_config::LOCAL_CONFIG_FILE);
    let rules_path = dir.join(DEFAULT_RULES_FILE);

    for path in [&config_path, &rules_path] {
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
    }

    AppConfig::recommended()
        .save(&config_path)
        .context("Cannot write configuration")?;
    RuleStore::new(&rules_path)
        .save(&default_rules())
        .context("Cannot write rules")?;

    eprintln!("Wrote {}", config_path.display());
    eprintln!("Wrote {}", rules_path.display());
    Ok(())
}

/// Run a scan while printing progress on stderr.
fn scan_with_progress(config: &ScanConfig) -> Result<ScanResult> {
    eprintln!("Scanning {}...", config.root.display());

    let scanner = TreeScanner::new();
    let printer = spawn_progress_printer(scanner.subscribe());
    let result = scanner.scan(config);

    // Closing the channel ends the printer.
    drop(scanner);
    let _ = printer.join();

    let result = result.context("Scan failed")?;
    eprintln!(
        "Scanned {} files, {} directories in {:.2}s",
        result.total_files(),
        result.total_dirs(),
        result.scan_duration.as_secs_f64()
    );
    Ok(result)
}

fn spawn_progress_printer(mut rx: broadcast::Receiver<ScanProgress>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            match rx.blocking_recv() {
                Ok(progress) => eprintln!(
                    "  {} files, {} at {:.0} files/s ({})",
                    progress.files_scanned,
                    format_size(progress.bytes_scanned),
                    progress.files_per_second(),
                    progress.current_path
                ),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Compile the rule file selected by `--rules` or the configuration.
fn load_rules(
    loaded: &LoadedConfig,
    rules_override: Option<PathBuf>,
) -> Result<(RuleSet, Vec<RuleWarning>)> {
    let Some(path) = rules_override.or_else(|| loaded.rules_path()) else {
        tracing::info!("no rule file configured, running without rules");
        return Ok((RuleSet::empty(), Vec::new()));
    };

    let (rules, warnings) = RuleStore::new(&path)
        .compile()
        .with_context(|| format!("Cannot load rules from {}", path.display()))?;
    report_rule_warnings(&warnings);
    Ok((rules, warnings))
}

fn report_rule_warnings(warnings: &[RuleWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
