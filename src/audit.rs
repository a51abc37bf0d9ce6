//! Audit orchestration.
//!
//! Runs the selected analyzers concurrently, each on its own input, and
//! merges whatever succeeded into one [`AnalysisResult`]. An analyzer whose
//! input cannot be loaded is recorded as skipped; the others still run.

use crate::analysis::{
    analyze_bundle, analyze_memory, analyze_rerenders, BundleAnalysis, BundleOptions,
    HeapInspector, MemoryAnalysis, MemoryOptions, RerenderAnalysis, RerenderOptions,
};
use crate::collector::{
    discover_stats_file, load_build_stats, load_memory_snapshots, load_render_events,
    CollectError,
};
use crate::config::{Config, InputsConfig};
use crate::models::{AnalysisResult, AnalyzerKind, SkippedAnalyzer};
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything needed to run one audit.
#[derive(Debug, Clone)]
pub struct AuditPlan {
    pub project: PathBuf,
    pub analyzers: Vec<AnalyzerKind>,
    pub inputs: InputsConfig,
    pub bundle: BundleOptions,
    pub rerenders: RerenderOptions,
    pub memory: MemoryOptions,
}

impl AuditPlan {
    /// Build a plan from a merged configuration.
    pub fn from_config(project: PathBuf, config: &Config) -> Self {
        Self {
            project,
            analyzers: config.general.analyzers.clone(),
            inputs: config.inputs.clone(),
            bundle: BundleOptions::from(&config.bundle),
            rerenders: RerenderOptions::from(&config.rerenders),
            memory: MemoryOptions::from(&config.memory),
        }
    }

    /// Whether `kind` was selected.
    pub fn runs(&self, kind: AnalyzerKind) -> bool {
        self.analyzers.contains(&kind)
    }
}

/// Run the audit described by `plan`.
pub async fn run_audit(plan: &AuditPlan, inspector: &dyn HeapInspector) -> AnalysisResult {
    info!(
        "Auditing {} with analyzers: {}",
        plan.project.display(),
        plan.analyzers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let (bundle, rerenders, memory) = futures::join!(
        run_if(plan.runs(AnalyzerKind::Bundle), run_bundle(plan)),
        run_if(plan.runs(AnalyzerKind::Rerenders), run_rerenders(plan)),
        run_if(plan.runs(AnalyzerKind::Memory), run_memory(plan, inspector)),
    );

    let mut result = AnalysisResult::new(plan.project.display().to_string());
    result.analyses.bundle = record(AnalyzerKind::Bundle, bundle, &mut result.skipped);
    result.analyses.rerenders = record(AnalyzerKind::Rerenders, rerenders, &mut result.skipped);
    result.analyses.memory = record(AnalyzerKind::Memory, memory, &mut result.skipped);

    result.calculate_summary();
    info!(
        "Audit finished: {} recommendations ({} critical, {} warnings)",
        result.summary.total_issues, result.summary.critical_issues, result.summary.warnings
    );

    result
}

/// Await `task` only when its analyzer was selected.
async fn run_if<T, F>(selected: bool, task: F) -> Option<Result<T, CollectError>>
where
    F: std::future::Future<Output = Result<T, CollectError>>,
{
    if selected {
        Some(task.await)
    } else {
        None
    }
}

/// Keep a successful analysis; note a failed one as skipped.
fn record<T>(
    kind: AnalyzerKind,
    outcome: Option<Result<T, CollectError>>,
    skipped: &mut Vec<SkippedAnalyzer>,
) -> Option<T> {
    match outcome? {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!("Skipping {} analysis: {}", kind, e);
            skipped.push(SkippedAnalyzer {
                analyzer: kind,
                reason: e.to_string(),
            });
            None
        }
    }
}

async fn run_bundle(plan: &AuditPlan) -> Result<BundleAnalysis, CollectError> {
    let path = match plan.inputs.stats {
        Some(ref path) => path.clone(),
        None => discover_stats_file(&plan.project)?,
    };
    let stats = load_build_stats(&path).await?;
    Ok(analyze_bundle(&stats, &plan.bundle))
}

async fn run_rerenders(plan: &AuditPlan) -> Result<RerenderAnalysis, CollectError> {
    let path = plan
        .inputs
        .renders
        .as_deref()
        .ok_or(CollectError::MissingInput(AnalyzerKind::Rerenders))?;
    let events = load_render_events(path).await?;
    Ok(analyze_rerenders(&events, &plan.rerenders))
}

async fn run_memory(
    plan: &AuditPlan,
    inspector: &dyn HeapInspector,
) -> Result<MemoryAnalysis, CollectError> {
    let path = plan
        .inputs
        .memory
        .as_deref()
        .ok_or(CollectError::MissingInput(AnalyzerKind::Memory))?;
    let snapshots = load_memory_snapshots(path).await?;
    Ok(analyze_memory(&snapshots, inspector, &plan.memory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PlaceholderHeapInspector;
    use std::fs;
    use tempfile::TempDir;

    fn plan(project: &std::path::Path, analyzers: &[AnalyzerKind]) -> AuditPlan {
        let mut config = Config::default();
        config.general.analyzers = analyzers.to_vec();
        AuditPlan::from_config(project.to_path_buf(), &config)
    }

    #[test]
    fn test_bundle_only_with_discovered_stats() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("stats.json"),
            r#"{"assets":[{"name":"main.js","size":600000}]}"#,
        )
        .unwrap();

        let plan = plan(dir.path(), &[AnalyzerKind::Bundle]);
        let result = tokio_test::block_on(run_audit(&plan, &PlaceholderHeapInspector));

        assert!(result.analyses.bundle.is_some());
        assert!(result.analyses.rerenders.is_none());
        assert!(result.analyses.memory.is_none());
        assert!(result.skipped.is_empty());
        assert_eq!(result.summary.total_issues, 1);
        assert_eq!(result.summary.critical_issues, 1);
    }

    #[test]
    fn test_failed_input_does_not_block_others() {
        let dir = TempDir::new().unwrap();
        let memory = dir.path().join("memory.json");
        fs::write(&memory, r#"[{"timestamp":0,"heapUsed":1000}]"#).unwrap();

        let mut plan = plan(dir.path(), &AnalyzerKind::ALL);
        plan.inputs.memory = Some(memory);

        let result = tokio_test::block_on(run_audit(&plan, &PlaceholderHeapInspector));

        assert!(result.analyses.bundle.is_none());
        assert!(result.analyses.rerenders.is_none());
        assert!(result.analyses.memory.is_some());

        let skipped: Vec<AnalyzerKind> = result.skipped.iter().map(|s| s.analyzer).collect();
        assert_eq!(skipped, vec![AnalyzerKind::Bundle, AnalyzerKind::Rerenders]);

        // Placeholder heap findings: detached-dom + event-listeners
        assert_eq!(result.summary.total_issues, 2);
        assert_eq!(result.summary.warnings, 2);
    }
}
