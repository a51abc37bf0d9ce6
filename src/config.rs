//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.perflens.toml` files.

use crate::analysis::{bundle, memory, rerender, BundleOptions, MemoryOptions, RerenderOptions};
use crate::models::AnalyzerKind;
use crate::report::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working and project directories.
pub const CONFIG_FILE_NAME: &str = ".perflens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input recordings.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Bundle analyzer thresholds.
    #[serde(default)]
    pub bundle: BundleConfig,

    /// Rerender analyzer thresholds.
    #[serde(default)]
    pub rerenders: RerenderConfig,

    /// Memory analyzer thresholds.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Debug-level logging, as with `--verbose`. `--quiet` overrides it.
    #[serde(default)]
    pub verbose: bool,

    /// Analyzers to run.
    #[serde(default = "default_analyzers")]
    pub analyzers: Vec<AnalyzerKind>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
            analyzers: default_analyzers(),
        }
    }
}

fn default_output() -> String {
    "perflens-report.md".to_string()
}

fn default_analyzers() -> Vec<AnalyzerKind> {
    AnalyzerKind::ALL.to_vec()
}

/// Paths to the recorded inputs, relative to the project directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Bundler build statistics. Discovered in the project when unset.
    #[serde(default)]
    pub stats: Option<PathBuf>,

    /// Render event recording.
    #[serde(default)]
    pub renders: Option<PathBuf>,

    /// Heap sample recording.
    #[serde(default)]
    pub memory: Option<PathBuf>,
}

/// Bundle analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_large_module_bytes")]
    pub large_module_bytes: u64,

    #[serde(default = "default_large_bundle_bytes")]
    pub large_bundle_bytes: u64,

    #[serde(default = "default_large_chunk_bytes")]
    pub large_chunk_bytes: u64,

    /// Also report duplicates found under `node_modules`.
    #[serde(default)]
    pub include_node_modules_duplicates: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            large_module_bytes: default_large_module_bytes(),
            large_bundle_bytes: default_large_bundle_bytes(),
            large_chunk_bytes: default_large_chunk_bytes(),
            include_node_modules_duplicates: false,
        }
    }
}

fn default_large_module_bytes() -> u64 {
    bundle::LARGE_MODULE_BYTES
}

fn default_large_bundle_bytes() -> u64 {
    bundle::LARGE_BUNDLE_BYTES
}

fn default_large_chunk_bytes() -> u64 {
    bundle::LARGE_CHUNK_BYTES
}

impl From<&BundleConfig> for BundleOptions {
    fn from(config: &BundleConfig) -> Self {
        Self {
            large_module_bytes: config.large_module_bytes,
            large_bundle_bytes: config.large_bundle_bytes,
            large_chunk_bytes: config.large_chunk_bytes,
            include_node_modules_duplicates: config.include_node_modules_duplicates,
        }
    }
}

/// Rerender analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerenderConfig {
    /// Average render time (ms) above which a component is slow.
    #[serde(default = "default_slow_render_ms")]
    pub slow_render_ms: f64,
}

impl Default for RerenderConfig {
    fn default() -> Self {
        Self {
            slow_render_ms: default_slow_render_ms(),
        }
    }
}

fn default_slow_render_ms() -> f64 {
    rerender::SLOW_RENDER_MS
}

impl From<&RerenderConfig> for RerenderOptions {
    fn from(config: &RerenderConfig) -> Self {
        Self {
            slow_render_ms: config.slow_render_ms,
        }
    }
}

/// Memory analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Mean growth per sample that counts as a leak.
    #[serde(default = "default_growth_per_sample_bytes")]
    pub growth_per_sample_bytes: u64,

    /// Final heap size that counts as high memory usage.
    #[serde(default = "default_high_memory_bytes")]
    pub high_memory_bytes: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            growth_per_sample_bytes: default_growth_per_sample_bytes(),
            high_memory_bytes: default_high_memory_bytes(),
        }
    }
}

fn default_growth_per_sample_bytes() -> u64 {
    memory::GROWTH_PER_SAMPLE_BYTES
}

fn default_high_memory_bytes() -> u64 {
    memory::HIGH_MEMORY_BYTES
}

impl From<&MemoryConfig> for MemoryOptions {
    fn from(config: &MemoryConfig) -> Self {
        Self {
            growth_per_sample_bytes: config.growth_per_sample_bytes,
            high_memory_bytes: config.high_memory_bytes,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include code examples with recommendations.
    #[serde(default = "default_true")]
    pub include_code_examples: bool,

    /// Maximum rows per table (chunks, modules, components).
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_code_examples: true,
            max_rows: default_max_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_rows() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the working directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from a project directory.
    pub fn load_from_project(project_path: &Path) -> Result<Option<Self>> {
        let config_path = project_path.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve relative input paths against the project directory.
    pub fn resolve_inputs(&mut self, project_path: &Path) {
        for input in [
            &mut self.inputs.stats,
            &mut self.inputs.renders,
            &mut self.inputs.memory,
        ] {
            if let Some(path) = input.as_mut() {
                if path.is_relative() {
                    *path = project_path.join(&*path);
                }
            }
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref analyzers) = args.analyze {
            self.general.analyzers = analyzers.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.to_string_lossy().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        // Input paths from the CLI are used as given (relative to the working directory)
        if let Some(ref stats) = args.stats {
            self.inputs.stats = Some(stats.clone());
        }
        if let Some(ref renders) = args.renders {
            self.inputs.renders = Some(renders.clone());
        }
        if let Some(ref memory) = args.memory {
            self.inputs.memory = Some(memory.clone());
        }

        if args.include_node_modules {
            self.bundle.include_node_modules_duplicates = true;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.analyzers, AnalyzerKind::ALL.to_vec());
        assert_eq!(config.bundle.large_bundle_bytes, 500_000);
        assert_eq!(config.memory.high_memory_bytes, 52_428_800);
        assert!(config.inputs.stats.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "perf.html"
format = "html"
analyzers = ["bundle", "memory"]

[inputs]
stats = "dist/stats.json"

[bundle]
large_chunk_bytes = 100000
include_node_modules_duplicates = true

[rerenders]
slow_render_ms = 8.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "perf.html");
        assert_eq!(config.general.format, OutputFormat::Html);
        assert_eq!(
            config.general.analyzers,
            vec![AnalyzerKind::Bundle, AnalyzerKind::Memory]
        );
        assert_eq!(config.inputs.stats, Some(PathBuf::from("dist/stats.json")));
        assert_eq!(config.bundle.large_chunk_bytes, 100_000);
        assert_eq!(config.bundle.large_module_bytes, 50_000);
        assert!(config.bundle.include_node_modules_duplicates);
        assert_eq!(config.rerenders.slow_render_ms, 8.0);

        let options = BundleOptions::from(&config.bundle);
        assert_eq!(options.large_chunk_bytes, 100_000);
    }

    #[test]
    fn test_resolve_inputs() {
        let mut config = Config::default();
        config.inputs.stats = Some(PathBuf::from("dist/stats.json"));
        config.inputs.memory = Some(PathBuf::from("/abs/memory.json"));

        config.resolve_inputs(Path::new("/work/app"));
        assert_eq!(
            config.inputs.stats,
            Some(PathBuf::from("/work/app/dist/stats.json"))
        );
        assert_eq!(config.inputs.memory, Some(PathBuf::from("/abs/memory.json")));
        assert!(config.inputs.renders.is_none());
    }

    #[test]
    fn test_merge_with_args() {
        let args = Args::parse_from([
            "perflens",
            "--analyze",
            "rerenders",
            "--renders",
            "renders.json",
            "--format",
            "json",
        ]);

        let mut config = Config::default();
        config.general.output = "from-file.md".to_string();
        config.merge_with_args(&args);

        assert_eq!(config.general.analyzers, vec![AnalyzerKind::Rerenders]);
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.general.output, "from-file.md");
        assert_eq!(config.inputs.renders, Some(PathBuf::from("renders.json")));
    }

    #[test]
    fn test_verbose_from_file_sets_debug_logging() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = Args::parse_from(["perflens"]);
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[bundle]"));
        assert!(toml_str.contains("[memory]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.analyzers, AnalyzerKind::ALL.to_vec());
    }
}
