//! Perflens - bundle, re-render and memory auditor for web front-ends
//!
//! Reads bundler build statistics and recorded page telemetry, and writes a
//! report of prioritized performance recommendations.
//!
//! Exit codes:
//!   0 - Success (no recommendations at or above threshold, or no --fail-on set)
//!   1 - Runtime error (bad arguments, unreadable config, report write failure, etc.)
//!   2 - Recommendations found at or above the --fail-on threshold

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use perflens::analysis::{merge_recommendations, top_recommendations, PlaceholderHeapInspector};
use perflens::audit::{run_audit, AuditPlan};
use perflens::cli::Args;
use perflens::config::{Config, CONFIG_FILE_NAME};
use perflens::models::{AnalysisResult, Severity};
use perflens::report;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Recommendations listed in the console summary.
const TOP_CONSOLE_RECOMMENDATIONS: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so `general.verbose` can set the level
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.resolve_inputs(&args.project);
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose))?;

    info!("Perflens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    info!("{}", config_source);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Audit failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .perflens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set input files, thresholds, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete audit workflow. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let plan = AuditPlan::from_config(args.project.clone(), &config);

    let spinner = (!args.quiet).then(|| start_spinner("Analyzing..."));
    let result = run_audit(&plan, &PlaceholderHeapInspector).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let output = PathBuf::from(&config.general.output);
    report::write_report(&result, config.general.format, &config.report, &output)?;

    if !args.quiet {
        print_summary(&result, start_time.elapsed());
        println!("\n✅ Audit complete! Report saved to: {}", output.display());
    }

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = Severity::from(fail_level);
        if result.has_issues_at_or_above(threshold) {
            eprintln!(
                "\n⛔ Recommendations found at or above {} severity. Failing (exit code 2).",
                threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

fn start_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_summary(result: &AnalysisResult, elapsed: Duration) {
    let summary = &result.summary;

    println!("\n📊 Analysis Summary:");
    if let Some(ref bundle) = result.analyses.bundle {
        println!(
            "   Bundle: {} across {} chunks",
            perflens::fmt::format_bytes(bundle.total_size),
            bundle.chunks.len()
        );
    }
    if let Some(ref rerenders) = result.analyses.rerenders {
        println!(
            "   Renders: {} across {} components",
            rerenders.total_rerenders,
            rerenders.components.len()
        );
    }
    if let Some(ref memory) = result.analyses.memory {
        println!(
            "   Memory: {} heap, {} growth",
            perflens::fmt::format_bytes(memory.heap_size),
            perflens::fmt::format_bytes(memory.retained_size)
        );
    }
    for skipped in &result.skipped {
        println!("   ⚠️  Skipped {}: {}", skipped.analyzer, skipped.reason);
    }
    println!("   Total recommendations: {}", summary.total_issues);
    println!(
        "   - {} Critical: {} | {} Warning: {} | {} Info: {}",
        Severity::Critical.emoji(),
        summary.critical_issues,
        Severity::Warning.emoji(),
        summary.warnings,
        Severity::Info.emoji(),
        summary.total_issues - summary.critical_issues - summary.warnings
    );

    let merged = merge_recommendations(result);
    let top = top_recommendations(&merged, TOP_CONSOLE_RECOMMENDATIONS);
    if !top.is_empty() {
        println!("\n   Top recommendations:");
        for rec in top {
            println!("   {} {}", rec.severity.emoji(), rec.headline());
        }
    }
    println!("   Duration: {:.1}s", elapsed.as_secs_f64());
}

/// Load configuration from file or use defaults.
///
/// Lookup order: --config, ./.perflens.toml, <project>/.perflens.toml.
/// Runs before logging is set up, so problems are printed directly and the
/// chosen source is returned for logging afterwards.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, format!("Loaded config from: {}", config_path.display())));
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            return Ok((config, format!("Loaded config from {}", CONFIG_FILE_NAME)));
        }
        Ok(None) => {}
        Err(e) => eprintln!("⚠️  Failed to load config: {:#}", e),
    }

    match Config::load_from_project(&args.project) {
        Ok(Some(config)) => Ok((config, format!("Found {} in project", CONFIG_FILE_NAME))),
        Ok(None) => Ok((
            Config::default(),
            "No config file found, using defaults".to_string(),
        )),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok((Config::default(), "Using default config".to_string()))
        }
    }
}
