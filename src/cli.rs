//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{AnalyzerKind, Severity};
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// perflens - bundle, re-render and memory auditor for web front-ends
///
/// Reads a bundler's build statistics and telemetry recorded from a running
/// page, and writes a report of prioritized recommendations.
///
/// Examples:
///   perflens --project ./my-app
///   perflens --stats dist/stats.json --analyze bundle --format json -o bundle.json
///   perflens --renders renders.json --memory memory.json --analyze rerenders,memory
///   perflens --fail-on critical
///   perflens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Project directory to analyze
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub project: PathBuf,

    /// Analyzers to run (comma-separated)
    ///
    /// Example: --analyze bundle,memory. Defaults to the config file's list,
    /// or all analyzers.
    #[arg(short, long, value_name = "ANALYZERS", value_delimiter = ',')]
    pub analyze: Option<Vec<AnalyzerKind>>,

    /// Bundler build statistics JSON
    ///
    /// If not specified, stats.json (or a similar name) is searched for in
    /// the project directory.
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Render event recording (JSON array)
    #[arg(long, value_name = "FILE")]
    pub renders: Option<PathBuf>,

    /// Heap sample recording (JSON array)
    #[arg(long, value_name = "FILE")]
    pub memory: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, html)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .perflens.toml in the current directory,
    /// then in the project directory
    #[arg(short, long, value_name = "FILE", env = "PERFLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also report duplicate modules under node_modules
    #[arg(long)]
    pub include_node_modules: bool,

    /// Fail if recommendations at or above this severity are found
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is exceeded.
    /// Values: critical, warning, info
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .perflens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Severity level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Info,
    Warning,
    Critical,
}

impl From<FailOnLevel> for Severity {
    fn from(level: FailOnLevel) -> Self {
        match level {
            FailOnLevel::Info => Severity::Info,
            FailOnLevel::Warning => Severity::Warning,
            FailOnLevel::Critical => Severity::Critical,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if !self.project.exists() {
            return Err(format!(
                "Project directory does not exist: {}",
                self.project.display()
            ));
        }
        if !self.project.is_dir() {
            return Err(format!(
                "Project path is not a directory: {}",
                self.project.display()
            ));
        }

        if let Some(ref analyzers) = self.analyze {
            if analyzers.is_empty() {
                return Err("--analyze needs at least one analyzer".to_string());
            }
        }

        for (flag, path) in [
            ("--stats", &self.stats),
            ("--renders", &self.renders),
            ("--memory", &self.memory),
        ] {
            if let Some(path) = path {
                if !path.is_file() {
                    return Err(format!("{} file does not exist: {}", flag, path.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the config file's `general.verbose`; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
