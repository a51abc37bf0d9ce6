//! Recommendation merging and statistics.
//!
//! This module flattens the per-analyzer recommendation lists into one
//! sequence and provides the groupings the report renderers use.

use crate::models::{AnalysisResult, Recommendation, Severity, Summary};
use std::collections::HashMap;

/// Concatenate every present analyzer's recommendations (bundle, rerenders, memory).
pub fn merge_recommendations(result: &AnalysisResult) -> Vec<Recommendation> {
    result.recommendations().cloned().collect()
}

/// Recompute and return the summary of `result`.
pub fn finalize(result: &mut AnalysisResult) -> &Summary {
    result.calculate_summary();
    &result.summary
}

/// Group recommendations by severity, most severe first. Input order is kept
/// within each group.
pub fn group_by_severity(recommendations: &[Recommendation]) -> Vec<(Severity, Vec<&Recommendation>)> {
    [Severity::Critical, Severity::Warning, Severity::Info]
        .into_iter()
        .map(|severity| {
            let group: Vec<&Recommendation> = recommendations
                .iter()
                .filter(|r| r.severity == severity)
                .collect();
            (severity, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Count recommendations per category, most frequent first.
pub fn count_by_category(recommendations: &[Recommendation]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for rec in recommendations {
        *counts.entry(rec.category.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(category, count)| (category.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// The `n` most severe recommendations; ties keep merge order.
pub fn top_recommendations(recommendations: &[Recommendation], n: usize) -> Vec<&Recommendation> {
    let mut sorted: Vec<&Recommendation> = recommendations.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
    sorted.truncate(n);
    sorted
}
