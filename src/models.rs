//! Data models for the performance auditor.
//!
//! This module contains the core data structures shared across the
//! application: the recorded inputs each analyzer consumes, the
//! recommendation record every analyzer emits, and the merged result
//! handed to the report renderers.

use crate::analysis::{BundleAnalysis, MemoryAnalysis, RerenderAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Severity level of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational suggestion
    Info,
    /// Worth fixing, measurable cost
    Warning,
    /// Large, user-visible cost
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "🔵",
            Severity::Warning => "🟡",
            Severity::Critical => "🔴",
        }
    }
}

/// The analyzers this tool can run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// Built-bundle composition
    Bundle,
    /// Component re-render frequency
    Rerenders,
    /// Heap memory growth
    Memory,
}

impl AnalyzerKind {
    /// All analyzers, in merge order.
    pub const ALL: [AnalyzerKind; 3] = [
        AnalyzerKind::Bundle,
        AnalyzerKind::Rerenders,
        AnalyzerKind::Memory,
    ];
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::Bundle => write!(f, "bundle"),
            AnalyzerKind::Rerenders => write!(f, "rerenders"),
            AnalyzerKind::Memory => write!(f, "memory"),
        }
    }
}

/// A single piece of advice produced by an analyzer.
///
/// Categories are free-form tags; the same category may appear more than
/// once, including across analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Severity of the finding.
    pub severity: Severity,
    /// Category tag (e.g. `bundle-size`, `slow-renders`).
    pub category: String,
    /// Short title.
    pub title: String,
    /// What was observed.
    pub description: String,
    /// Remediation prose.
    pub fix: String,
    /// Optional code example illustrating the fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    /// Expected effect of applying the fix.
    pub estimated_impact: String,
}

impl Recommendation {
    /// Returns the `category: title` line used in summaries.
    pub fn headline(&self) -> String {
        format!("{}: {}", self.category, self.title)
    }
}

// ---------------------------------------------------------------------------
// Build statistics (bundler output)
// ---------------------------------------------------------------------------

/// Build statistics as emitted by a module bundler.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildStatistics {
    pub assets: Vec<StatsAsset>,
    pub chunks: Vec<StatsChunk>,
    pub modules: Vec<StatsModule>,
}

/// An emitted output file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsAsset {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: u64,
}

/// Chunk identifier; bundlers emit either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkId {
    Number(u64),
    Name(String),
}

impl Default for ChunkId {
    fn default() -> Self {
        ChunkId::Number(0)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkId::Number(n) => write!(f, "{}", n),
            ChunkId::Name(s) => write!(f, "{}", s),
        }
    }
}

/// A chunk entry from the build statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsChunk {
    #[serde(deserialize_with = "null_as_default")]
    pub id: ChunkId,
    #[serde(deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub initial: bool,
    /// Number of modules in the chunk (stats list the modules themselves).
    #[serde(rename = "modules", deserialize_with = "deserialize_module_count")]
    pub module_count: usize,
    pub parents: Vec<ChunkId>,
}

/// A module entry from the build statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub identifier: String,
    /// Distance from the entry point; bundlers emit `null` for unreachable modules.
    #[serde(deserialize_with = "null_as_default")]
    pub depth: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub reasons: Vec<ModuleReason>,
}

/// Why a module was included: the module that references it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleReason {
    pub module_name: Option<String>,
}

impl StatsModule {
    /// Names of the modules referencing this one.
    pub fn referenced_by(&self) -> Vec<String> {
        self.reasons
            .iter()
            .filter_map(|r| r.module_name.clone())
            .collect()
    }
}

/// Reads `null` as the field's default, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts either a list of modules or a bare count.
fn deserialize_module_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Modules {
        Count(usize),
        List(Vec<serde::de::IgnoredAny>),
        Missing(Option<()>),
    }

    Ok(match Modules::deserialize(deserializer)? {
        Modules::Count(n) => n,
        Modules::List(items) => items.len(),
        Modules::Missing(_) => 0,
    })
}

// ---------------------------------------------------------------------------
// Runtime telemetry (recorded from a running page)
// ---------------------------------------------------------------------------

/// Why a component rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseType {
    Props,
    State,
    Context,
    Parent,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for CauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CauseType::Props => write!(f, "props"),
            CauseType::State => write!(f, "state"),
            CauseType::Context => write!(f, "context"),
            CauseType::Parent => write!(f, "parent"),
            CauseType::Unknown => write!(f, "unknown"),
        }
    }
}

/// One observed render of a UI component.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEvent {
    pub component_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: f64,
    /// Render duration in milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    pub cause_type: CauseType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
}

/// A point-in-time heap measurement, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemorySnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub heap_used: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub heap_total: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub external: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub array_buffers: u64,
}

// ---------------------------------------------------------------------------
// Merged result
// ---------------------------------------------------------------------------

/// Per-analyzer outputs; an entry is present only if that analyzer ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analyses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<BundleAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerenders: Option<RerenderAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryAnalysis>,
}

/// An analyzer that was selected but could not run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedAnalyzer {
    pub analyzer: AnalyzerKind,
    pub reason: String,
}

/// Summary of all recommendations in a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Total number of recommendations.
    pub total_issues: usize,
    /// Number of critical recommendations.
    pub critical_issues: usize,
    /// Number of warnings.
    pub warnings: usize,
    /// Every recommendation as a `category: title` line.
    pub suggestions: Vec<String>,
}

impl Summary {
    /// Creates a summary from a list of recommendations.
    pub fn from_recommendations<'a, I>(recommendations: I) -> Self
    where
        I: IntoIterator<Item = &'a Recommendation>,
    {
        let mut summary = Self::default();

        for rec in recommendations {
            summary.total_issues += 1;
            match rec.severity {
                Severity::Critical => summary.critical_issues += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => {}
            }
            summary.suggestions.push(rec.headline());
        }

        summary
    }
}

/// The complete result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// When the run happened.
    pub timestamp: DateTime<Utc>,
    /// Project directory that was analyzed.
    pub project_path: String,
    /// Outputs of the analyzers that ran.
    pub analyses: Analyses,
    /// Analyzers that were selected but skipped, with the reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedAnalyzer>,
    /// Derived summary; see [`AnalysisResult::calculate_summary`].
    pub summary: Summary,
}

impl AnalysisResult {
    /// Creates an empty result for the given project.
    pub fn new(project_path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            project_path: project_path.into(),
            analyses: Analyses::default(),
            skipped: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// All recommendations in merge order: bundle, rerenders, memory.
    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        let bundle = self.analyses.bundle.iter().flat_map(|a| &a.recommendations);
        let rerenders = self
            .analyses
            .rerenders
            .iter()
            .flat_map(|a| &a.recommendations);
        let memory = self.analyses.memory.iter().flat_map(|a| &a.recommendations);

        bundle.chain(rerenders).chain(memory)
    }

    /// Recalculates the summary from the present analyses.
    ///
    /// Must be the last step before reporting. Idempotent.
    pub fn calculate_summary(&mut self) {
        self.summary = Summary::from_recommendations(self.recommendations());
    }

    /// Whether any recommendation is at or above `threshold`.
    pub fn has_issues_at_or_above(&self, threshold: Severity) -> bool {
        self.recommendations().any(|r| r.severity >= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(severity: Severity, category: &str) -> Recommendation {
        Recommendation {
            severity,
            category: category.to_string(),
            title: "Test".to_string(),
            description: String::new(),
            fix: String::new(),
            code_example: None,
            estimated_impact: String::new(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_severity_emoji() {
        assert_eq!(Severity::Critical.emoji(), "🔴");
        assert_eq!(Severity::Warning.emoji(), "🟡");
        assert_eq!(Severity::Info.emoji(), "🔵");
    }

    #[test]
    fn test_summary_counts() {
        let recs = vec![
            rec(Severity::Critical, "bundle-size"),
            rec(Severity::Warning, "chunk-size"),
            rec(Severity::Warning, "chunk-size"),
            rec(Severity::Info, "tips"),
        ];

        let summary = Summary::from_recommendations(&recs);
        assert_eq!(summary.total_issues, 4);
        assert_eq!(summary.critical_issues, 1);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.suggestions[0], "bundle-size: Test");
    }

    #[test]
    fn test_chunk_module_count_accepts_list_or_number() {
        let json = r#"{"chunks":[
            {"id":0,"names":["main"],"size":10,"modules":[{"name":"a"},{"name":"b"}]},
            {"id":"vendors","size":5,"modules":7},
            {"id":2}
        ]}"#;

        let stats: BuildStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.chunks[0].module_count, 2);
        assert_eq!(stats.chunks[1].module_count, 7);
        assert_eq!(stats.chunks[1].id, ChunkId::Name("vendors".to_string()));
        assert_eq!(stats.chunks[2].module_count, 0);
        assert_eq!(stats.chunks[2].size, 0);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let json = r#"{
            "assets":[{"name":"main.js","size":null}],
            "chunks":[{"id":null,"names":null,"size":null,"files":["main.js"],"initial":null,"modules":null}],
            "modules":[{"name":"./src/a.js","identifier":null,"size":null,"depth":null,"reasons":null}]
        }"#;

        let stats: BuildStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.assets[0].size, 0);
        assert_eq!(stats.chunks[0].id, ChunkId::default());
        assert!(stats.chunks[0].names.is_empty());
        assert_eq!(stats.chunks[0].size, 0);
        assert!(!stats.chunks[0].initial);
        assert_eq!(stats.chunks[0].module_count, 0);
        assert_eq!(stats.modules[0].name, "./src/a.js");
        assert_eq!(stats.modules[0].depth, 0);
        assert_eq!(stats.modules[0].size, 0);
        assert!(stats.modules[0].identifier.is_empty());
        assert!(stats.modules[0].referenced_by().is_empty());
    }

    #[test]
    fn test_null_telemetry_numbers() {
        let event: RenderEvent = serde_json::from_str(
            r#"{"componentName":"App","causeType":"props","timestamp":null,"duration":null,"details":null}"#,
        )
        .unwrap();
        assert_eq!(event.duration, 0.0);
        assert!(event.details.is_empty());

        let snapshot: MemorySnapshot =
            serde_json::from_str(r#"{"timestamp":1,"heapUsed":2048,"external":null}"#).unwrap();
        assert_eq!(snapshot.heap_used, 2048);
        assert_eq!(snapshot.external, 0);
    }

    #[test]
    fn test_module_reasons() {
        let json = r#"{"modules":[{"name":"./a.js","size":3,
            "reasons":[{"moduleName":"./index.js"},{"type":"entry"}]}]}"#;

        let stats: BuildStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.modules[0].referenced_by(), vec!["./index.js"]);
    }

    #[test]
    fn test_unknown_cause_type() {
        let json = r#"{"componentName":"App","causeType":"hooks"}"#;
        let event: RenderEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.cause_type, CauseType::Unknown);
        assert_eq!(event.duration, 0.0);
    }

    #[test]
    fn test_empty_result_summary() {
        let mut result = AnalysisResult::new("/tmp/app");
        result.calculate_summary();
        assert_eq!(result.summary, Summary::default());
        assert!(!result.has_issues_at_or_above(Severity::Info));
    }
}
