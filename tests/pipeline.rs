use perflens::analysis::memory::LeakType;
use perflens::analysis::{finalize, merge_recommendations, PlaceholderHeapInspector};
use perflens::audit::{run_audit, AuditPlan};
use perflens::config::{Config, ReportConfig};
use perflens::models::{AnalysisResult, AnalyzerKind, Severity};
use perflens::report::{render_report, OutputFormat};
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn full_plan() -> AuditPlan {
    let mut config = Config::default();
    config.inputs.renders = Some(PathBuf::from("renders.json"));
    config.inputs.memory = Some(PathBuf::from("memory.json"));
    config.resolve_inputs(&fixtures());
    AuditPlan::from_config(fixtures(), &config)
}

fn audit(plan: &AuditPlan) -> AnalysisResult {
    tokio_test::block_on(run_audit(plan, &PlaceholderHeapInspector))
}

#[test]
fn test_full_audit_over_fixtures() {
    let result = audit(&full_plan());

    assert!(result.skipped.is_empty());
    assert_eq!(result.summary.total_issues, 13);
    assert_eq!(result.summary.critical_issues, 3);
    assert_eq!(result.summary.warnings, 10);
    assert_eq!(result.summary.suggestions.len(), 13);
    assert!(result.has_issues_at_or_above(Severity::Critical));
}

#[test]
fn test_bundle_fixture() {
    let result = audit(&full_plan());
    let bundle = result.analyses.bundle.as_ref().unwrap();

    assert_eq!(bundle.total_size, 789_000);
    assert_eq!(bundle.metrics.js_size, 730_000);
    assert_eq!(bundle.metrics.css_size, 45_000);
    assert_eq!(bundle.metrics.image_size, 12_000);
    assert_eq!(bundle.metrics.other_size, 2_000);

    let chunk_names: Vec<&str> = bundle.chunks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(chunk_names, vec!["main", "vendors", "2"]);
    assert_eq!(bundle.chunks[0].module_count, 4);

    assert_eq!(bundle.large_modules.len(), 4);
    assert_eq!(bundle.large_modules[0].name, "./node_modules/lodash/lodash.js");

    // node_modules copies are left out by default; webpack runtime always is
    assert_eq!(bundle.duplicates.len(), 1);
    assert_eq!(bundle.duplicates[0].name, "format");
    assert_eq!(bundle.duplicates[0].instances, 2);
    assert_eq!(bundle.duplicates[0].total_size, 7_500);

    let categories: Vec<&str> = bundle
        .recommendations
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(
        categories,
        vec![
            "bundle-size",
            "chunk-size",
            "chunk-size",
            "large-module",
            "large-module",
            "large-module",
            "duplicate-modules",
        ]
    );
}

#[test]
fn test_node_modules_duplicates_opt_in() {
    let mut plan = full_plan();
    plan.analyzers = vec![AnalyzerKind::Bundle];
    plan.bundle.include_node_modules_duplicates = true;

    let result = audit(&plan);
    let bundle = result.analyses.bundle.as_ref().unwrap();

    assert_eq!(bundle.duplicates.len(), 2);
    assert_eq!(bundle.duplicates[0].name, "lodash");
    assert_eq!(bundle.duplicates[0].total_size, 143_000);
    assert_eq!(bundle.duplicates[1].name, "format");
}

#[test]
fn test_rerender_fixture() {
    let result = audit(&full_plan());
    let rerenders = result.analyses.rerenders.as_ref().unwrap();

    assert_eq!(rerenders.total_rerenders, 26);
    assert_eq!(rerenders.unnecessary_rerenders, 23);

    let names: Vec<&str> = rerenders.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ListItem", "Counter", "DataGrid"]);
    assert!((rerenders.components[2].avg_render_time - 24.0).abs() < 1e-9);

    let categories: Vec<(&str, Severity)> = rerenders
        .recommendations
        .iter()
        .map(|r| (r.category.as_str(), r.severity))
        .collect();
    assert_eq!(
        categories,
        vec![
            ("excessive-renders", Severity::Warning),
            ("state-updates", Severity::Warning),
            ("slow-renders", Severity::Critical),
        ]
    );
    assert_eq!(
        rerenders.recommendations[0].estimated_impact,
        "Could avoid ~7 renders"
    );
}

#[test]
fn test_memory_fixture() {
    let result = audit(&full_plan());
    let memory = result.analyses.memory.as_ref().unwrap();

    const MIB: u64 = 1024 * 1024;
    assert_eq!(memory.snapshots.len(), 5);
    assert_eq!(memory.heap_size, 38 * MIB);
    assert_eq!(memory.retained_size, 18 * MIB);

    let leak_types: Vec<LeakType> = memory.leaks.iter().map(|l| l.leak_type).collect();
    assert_eq!(
        leak_types,
        vec![
            LeakType::ConsistentGrowth,
            LeakType::LargeIncrease,
            LeakType::DetachedDom,
            LeakType::EventListeners,
        ]
    );

    let categories: Vec<&str> = memory
        .recommendations
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(categories, vec!["memory-leak", "detached-dom", "event-listeners"]);
}

#[test]
fn test_merge_order_and_idempotent_summary() {
    let mut result = audit(&full_plan());

    let merged = merge_recommendations(&result);
    assert_eq!(merged.first().map(|r| r.category.as_str()), Some("bundle-size"));
    assert_eq!(merged.last().map(|r| r.category.as_str()), Some("event-listeners"));

    let before = result.summary.clone();
    let after = finalize(&mut result).clone();
    assert_eq!(before, after);
}

#[test]
fn test_reports_render_in_every_format() {
    let result = audit(&full_plan());
    let config = ReportConfig::default();

    let markdown = render_report(&result, OutputFormat::Markdown, &config).unwrap();
    assert!(markdown.contains("## Bundle Analysis"));
    assert!(markdown.contains("`ListItem`"));

    let json = render_report(&result, OutputFormat::Json, &config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["total_issues"], 13);
    assert_eq!(value["analyses"]["memory"]["leaks"][2]["type"], "detached-dom");

    let html = render_report(&result, OutputFormat::Html, &config).unwrap();
    assert!(html.contains("<h2>Memory Analysis</h2>"));
}
