//! Markdown and JSON report generation.
//!
//! This module generates Markdown audit reports from the merged analysis
//! result, plus a plain JSON serialization of it.

use crate::analysis::{
    count_by_category, group_by_severity, merge_recommendations, BundleAnalysis, MemoryAnalysis,
    RerenderAnalysis,
};
use crate::config::ReportConfig;
use crate::fmt::{format_bytes, format_ms};
use crate::models::{AnalysisResult, Recommendation, Severity, Summary};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(result: &AnalysisResult, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Perflens Report\n\n");

    output.push_str(&generate_metadata_section(result));
    output.push_str(&generate_table_of_contents(result));
    output.push_str(&generate_summary_section(result));

    if let Some(ref bundle) = result.analyses.bundle {
        output.push_str(&generate_bundle_section(bundle, config));
    }
    if let Some(ref rerenders) = result.analyses.rerenders {
        output.push_str(&generate_rerender_section(rerenders, config));
    }
    if let Some(ref memory) = result.analyses.memory {
        output.push_str(&generate_memory_section(memory));
    }

    let recommendations = merge_recommendations(result);
    output.push_str(&generate_recommendations_section(&recommendations, config));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(result: &AnalysisResult) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Project:** `{}`\n", result.project_path));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Analyzers Run:** {}\n",
        analyzers_run(result).join(", ")
    ));
    for skipped in &result.skipped {
        section.push_str(&format!(
            "- **Skipped {}:** {}\n",
            skipped.analyzer, skipped.reason
        ));
    }
    section.push_str(&format!(
        "- **Total Recommendations:** {}\n",
        result.summary.total_issues
    ));
    section.push('\n');

    section
}

/// Names of the analyzers with output in `result`.
pub(super) fn analyzers_run(result: &AnalysisResult) -> Vec<&'static str> {
    let mut names = Vec::new();
    if result.analyses.bundle.is_some() {
        names.push("bundle");
    }
    if result.analyses.rerenders.is_some() {
        names.push("rerenders");
    }
    if result.analyses.memory.is_some() {
        names.push("memory");
    }
    if names.is_empty() {
        names.push("none");
    }
    names
}

/// Generate the table of contents.
fn generate_table_of_contents(result: &AnalysisResult) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");

    if result.analyses.bundle.is_some() {
        toc.push_str("- [Bundle Analysis](#bundle-analysis)\n");
    }
    if result.analyses.rerenders.is_some() {
        toc.push_str("- [Re-render Analysis](#re-render-analysis)\n");
    }
    if result.analyses.memory.is_some() {
        toc.push_str("- [Memory Analysis](#memory-analysis)\n");
    }

    toc.push_str("- [Recommendations](#recommendations)\n\n");

    toc
}

/// Generate the summary section.
fn generate_summary_section(result: &AnalysisResult) -> String {
    let summary: &Summary = &result.summary;
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    section.push_str(&format!(
        "| {} Critical | {} Warning | {} Info | **Total** |\n",
        Severity::Critical.emoji(),
        Severity::Warning.emoji(),
        Severity::Info.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        summary.critical_issues,
        summary.warnings,
        summary.total_issues - summary.critical_issues - summary.warnings,
        summary.total_issues
    ));

    let recommendations = merge_recommendations(result);
    let categories = count_by_category(&recommendations);
    if !categories.is_empty() {
        section.push_str("### Recommendations by Category\n\n");
        section.push_str("| Category | Count |\n");
        section.push_str("|:---|:---:|\n");
        for (category, count) in categories {
            section.push_str(&format!("| {} | {} |\n", category, count));
        }
        section.push('\n');
    }

    section
}

/// Generate the bundle section.
fn generate_bundle_section(bundle: &BundleAnalysis, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Bundle Analysis\n\n");
    section.push_str(&format!(
        "**Total size:** {}\n\n",
        format_bytes(bundle.total_size)
    ));

    section.push_str("### Assets by Type\n\n");
    section.push_str("| JavaScript | CSS | Images | Other |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        format_bytes(bundle.metrics.js_size),
        format_bytes(bundle.metrics.css_size),
        format_bytes(bundle.metrics.image_size),
        format_bytes(bundle.metrics.other_size)
    ));

    if !bundle.chunks.is_empty() {
        section.push_str("### Chunks\n\n");
        section.push_str("| Chunk | Size | Modules | Type |\n");
        section.push_str("|:---|---:|---:|:---:|\n");
        for chunk in bundle.chunks.iter().take(config.max_rows) {
            section.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                chunk.name,
                format_bytes(chunk.size),
                chunk.module_count,
                if chunk.initial { "initial" } else { "async" }
            ));
        }
        section.push('\n');
    }

    if !bundle.large_modules.is_empty() {
        section.push_str("### Large Modules\n\n");
        section.push_str("| Module | Size | Depth |\n");
        section.push_str("|:---|---:|---:|\n");
        for module in bundle.large_modules.iter().take(config.max_rows) {
            section.push_str(&format!(
                "| `{}` | {} | {} |\n",
                module.name,
                format_bytes(module.size),
                module.depth
            ));
        }
        section.push('\n');
    }

    if !bundle.duplicates.is_empty() {
        section.push_str("### Duplicate Modules\n\n");
        section.push_str("| Module | Copies | Total Size | Locations |\n");
        section.push_str("|:---|---:|---:|:---|\n");
        for group in bundle.duplicates.iter().take(config.max_rows) {
            section.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                group.name,
                group.instances,
                format_bytes(group.total_size),
                group.locations.join("<br>")
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the re-render section.
fn generate_rerender_section(rerenders: &RerenderAnalysis, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str("## Re-render Analysis\n\n");
    section.push_str(&format!(
        "- **Total renders:** {}\n- **Renders in components flagged as unnecessary:** {}\n\n",
        rerenders.total_rerenders, rerenders.unnecessary_rerenders
    ));

    if rerenders.components.is_empty() {
        section.push_str("No render events were recorded.\n\n");
        return section;
    }

    section.push_str("| Component | Renders | Avg Time | Causes | Unnecessary* |\n");
    section.push_str("|:---|---:|---:|:---|:---:|\n");
    for component in rerenders.components.iter().take(config.max_rows) {
        let causes: Vec<String> = component
            .causes
            .iter()
            .map(|c| format!("{} ×{}", c.cause_type, c.count))
            .collect();
        section.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            component.name,
            component.render_count,
            format_ms(component.avg_render_time),
            causes.join(", "),
            if component.is_unnecessary { "yes" } else { "" }
        ));
    }
    section.push_str(
        "\n*Heuristic: more than 5 renders averaging under 5ms each.*\n\n",
    );

    section
}

/// Generate the memory section.
fn generate_memory_section(memory: &MemoryAnalysis) -> String {
    let mut section = String::new();

    section.push_str("## Memory Analysis\n\n");
    section.push_str(&format!(
        "- **Final heap:** {}\n- **Growth over session:** {}\n\n",
        format_bytes(memory.heap_size),
        format_bytes(memory.retained_size)
    ));

    if !memory.snapshots.is_empty() {
        section.push_str("### Snapshots\n\n");
        section.push_str("| # | Time (ms) | Heap Used | Heap Total |\n");
        section.push_str("|---:|---:|---:|---:|\n");
        for (i, snapshot) in memory.snapshots.iter().enumerate() {
            section.push_str(&format!(
                "| {} | {:.0} | {} | {} |\n",
                i + 1,
                snapshot.timestamp,
                format_bytes(snapshot.heap_used),
                format_bytes(snapshot.heap_total)
            ));
        }
        section.push('\n');
    }

    if !memory.leaks.is_empty() {
        section.push_str("### Suspected Leaks\n\n");
        for leak in &memory.leaks {
            section.push_str(&format!(
                "- {} **{}**{}: {}\n",
                leak.severity.emoji(),
                leak.leak_type,
                if leak.heuristic { " (heuristic)" } else { "" },
                leak.description
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the recommendations section.
fn generate_recommendations_section(
    recommendations: &[Recommendation],
    config: &ReportConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n");

    if recommendations.is_empty() {
        section.push_str("No recommendations. Nothing crossed a threshold. 🎉\n\n");
        return section;
    }

    for (_, group) in group_by_severity(recommendations) {
        for rec in group {
            section.push_str(&generate_recommendation_block(rec, config));
        }
    }

    section
}

/// Generate a single recommendation block.
fn generate_recommendation_block(rec: &Recommendation, config: &ReportConfig) -> String {
    let mut block = String::new();

    let severity_badge = match rec.severity {
        Severity::Critical => "🔴 **CRITICAL**",
        Severity::Warning => "🟡 **WARNING**",
        Severity::Info => "🔵 **INFO**",
    };

    block.push_str(&format!(
        "#### {} {} - {}\n\n",
        severity_badge, rec.category, rec.title
    ));

    if !rec.description.is_empty() {
        block.push_str(&format!("**Description:** {}\n\n", rec.description));
    }

    if !rec.fix.is_empty() {
        block.push_str(&format!("> 💡 **Fix:** {}\n\n", rec.fix));
    }

    if config.include_code_examples {
        if let Some(ref code) = rec.code_example {
            block.push_str("<details>\n<summary>Example</summary>\n\n```js\n");
            block.push_str(code);
            block.push_str("\n```\n</details>\n\n");
        }
    }

    if !rec.estimated_impact.is_empty() {
        block.push_str(&format!("**Estimated impact:** {}\n\n", rec.estimated_impact));
    }

    block.push_str("---\n\n");

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated by perflens*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(Into::into)
}
