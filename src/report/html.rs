//! Standalone HTML report.
//!
//! A single self-contained page with inline styles. Every piece of text that
//! came from an input file is escaped.

use super::generator::analyzers_run;
use crate::analysis::{group_by_severity, merge_recommendations};
use crate::config::ReportConfig;
use crate::fmt::{format_bytes, format_ms};
use crate::models::{AnalysisResult, Recommendation, Severity};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;\
padding:0 1rem;color:#1f2328}table{border-collapse:collapse;width:100%;margin:1rem 0}\
th,td{border:1px solid #d0d7de;padding:.4rem .6rem;text-align:left}\
th{background:#f6f8fa}.rec{border-left:4px solid #d0d7de;padding:.5rem 1rem;margin:1rem 0}\
.critical{border-color:#cf222e}.warning{border-color:#d4a72c}.info{border-color:#0969da}\
pre{background:#f6f8fa;padding:.75rem;overflow-x:auto}";

/// Generate a complete HTML report.
pub fn generate_html_report(result: &AnalysisResult, config: &ReportConfig) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Perflens Report</title>\n");
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n<h1>Perflens Report</h1>\n");

    html.push_str(&format!(
        "<p><strong>Project:</strong> <code>{}</code><br>\n<strong>Analysis Date:</strong> {}<br>\n\
         <strong>Analyzers Run:</strong> {}</p>\n",
        html_escape(&result.project_path),
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        analyzers_run(result).join(", ")
    ));
    if !result.skipped.is_empty() {
        html.push_str("<ul class=\"skipped\">\n");
        for skipped in &result.skipped {
            html.push_str(&format!(
                "<li>Skipped {}: {}</li>\n",
                skipped.analyzer,
                html_escape(&skipped.reason)
            ));
        }
        html.push_str("</ul>\n");
    }

    let summary = &result.summary;
    html.push_str("<h2>Summary</h2>\n<table>\n<tr><th>Critical</th><th>Warning</th><th>Info</th><th>Total</th></tr>\n");
    html.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>\n</table>\n",
        summary.critical_issues,
        summary.warnings,
        summary.total_issues - summary.critical_issues - summary.warnings,
        summary.total_issues
    ));

    if let Some(ref bundle) = result.analyses.bundle {
        html.push_str("<h2>Bundle Analysis</h2>\n");
        html.push_str(&format!(
            "<p>Total size: <strong>{}</strong> (JS {}, CSS {}, images {}, other {})</p>\n",
            format_bytes(bundle.total_size),
            format_bytes(bundle.metrics.js_size),
            format_bytes(bundle.metrics.css_size),
            format_bytes(bundle.metrics.image_size),
            format_bytes(bundle.metrics.other_size)
        ));
        let rows: Vec<[String; 3]> = bundle
            .chunks
            .iter()
            .take(config.max_rows)
            .map(|c| {
                [
                    html_escape(&c.name),
                    format_bytes(c.size),
                    c.module_count.to_string(),
                ]
            })
            .collect();
        html.push_str(&table(&["Chunk", "Size", "Modules"], &rows));

        let rows: Vec<[String; 3]> = bundle
            .duplicates
            .iter()
            .take(config.max_rows)
            .map(|d| {
                [
                    html_escape(&d.name),
                    d.instances.to_string(),
                    format_bytes(d.total_size),
                ]
            })
            .collect();
        html.push_str(&table(&["Duplicate", "Copies", "Total Size"], &rows));
    }

    if let Some(ref rerenders) = result.analyses.rerenders {
        html.push_str("<h2>Re-render Analysis</h2>\n");
        let rows: Vec<[String; 3]> = rerenders
            .components
            .iter()
            .take(config.max_rows)
            .map(|c| {
                [
                    html_escape(&c.name),
                    c.render_count.to_string(),
                    format_ms(c.avg_render_time),
                ]
            })
            .collect();
        html.push_str(&table(&["Component", "Renders", "Avg Time"], &rows));
    }

    if let Some(ref memory) = result.analyses.memory {
        html.push_str("<h2>Memory Analysis</h2>\n");
        html.push_str(&format!(
            "<p>Final heap: <strong>{}</strong>, growth: <strong>{}</strong></p>\n",
            format_bytes(memory.heap_size),
            format_bytes(memory.retained_size)
        ));
        if !memory.leaks.is_empty() {
            html.push_str("<ul>\n");
            for leak in &memory.leaks {
                html.push_str(&format!(
                    "<li><strong>{}</strong>{}: {}</li>\n",
                    leak.leak_type,
                    if leak.heuristic { " (heuristic)" } else { "" },
                    html_escape(&leak.description)
                ));
            }
            html.push_str("</ul>\n");
        }
    }

    html.push_str("<h2>Recommendations</h2>\n");
    let recommendations = merge_recommendations(result);
    if recommendations.is_empty() {
        html.push_str("<p>No recommendations.</p>\n");
    }
    for (_, group) in group_by_severity(&recommendations) {
        for rec in group {
            html.push_str(&recommendation_block(rec, config));
        }
    }

    html.push_str("<footer><em>Report generated by perflens</em></footer>\n</body>\n</html>\n");
    html
}

fn recommendation_block(rec: &Recommendation, config: &ReportConfig) -> String {
    let class = match rec.severity {
        Severity::Critical => "critical",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };

    let mut block = format!(
        "<div class=\"rec {}\">\n<h3>{} {}: {}</h3>\n<p>{}</p>\n",
        class,
        rec.severity.emoji(),
        html_escape(&rec.category),
        html_escape(&rec.title),
        html_escape(&rec.description)
    );
    if !rec.fix.is_empty() {
        block.push_str(&format!("<p><strong>Fix:</strong> {}</p>\n", html_escape(&rec.fix)));
    }
    if config.include_code_examples {
        if let Some(ref code) = rec.code_example {
            block.push_str(&format!("<pre><code>{}</code></pre>\n", html_escape(code)));
        }
    }
    if !rec.estimated_impact.is_empty() {
        block.push_str(&format!(
            "<p><strong>Estimated impact:</strong> {}</p>\n",
            html_escape(&rec.estimated_impact)
        ));
    }
    block.push_str("</div>\n");
    block
}

/// Render a table, or nothing when there are no rows.
fn table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::from("<table>\n<tr>");
    for header in headers {
        out.push_str(&format!("<th>{}</th>", header));
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

/// HTML-escape a string.
fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
