//! Heap memory growth analysis.
//!
//! Looks at a short chronological series of heap samples for sustained or
//! large growth, merges in whatever the heap inspector reports, and turns
//! the findings into recommendations.

use super::heap::HeapInspector;
use crate::fmt::format_bytes;
use crate::models::{MemorySnapshot, Recommendation, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Mean growth per sample above which the heap is considered leaking.
pub const GROWTH_PER_SAMPLE_BYTES: u64 = 1024 * 1024;
/// Final heap size above which memory usage is flagged.
pub const HIGH_MEMORY_BYTES: u64 = 50 * 1024 * 1024;
/// Relative growth between first and last sample that is flagged.
pub const LARGE_INCREASE_RATIO: f64 = 0.5;

/// Tunables for the memory analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryOptions {
    pub growth_per_sample_bytes: u64,
    pub high_memory_bytes: u64,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            growth_per_sample_bytes: GROWTH_PER_SAMPLE_BYTES,
            high_memory_bytes: HIGH_MEMORY_BYTES,
        }
    }
}

/// Kind of leak finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeakType {
    ConsistentGrowth,
    LargeIncrease,
    DetachedDom,
    EventListeners,
}

impl fmt::Display for LeakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeakType::ConsistentGrowth => write!(f, "consistent-growth"),
            LeakType::LargeIncrease => write!(f, "large-increase"),
            LeakType::DetachedDom => write!(f, "detached-dom"),
            LeakType::EventListeners => write!(f, "event-listeners"),
        }
    }
}

/// Objects of one constructor retained by a leak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakedObject {
    pub constructor: String,
    pub count: usize,
    pub retained_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A suspected leak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLeak {
    #[serde(rename = "type")]
    pub leak_type: LeakType,
    pub description: String,
    pub severity: Severity,
    /// Bytes attributed to the leak; projected for growth-based findings.
    pub retained_size: u64,
    pub objects: Vec<LeakedObject>,
    /// Set when the finding is a fixed heuristic rather than a measurement.
    #[serde(default)]
    pub heuristic: bool,
}

/// Output of the memory analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryAnalysis {
    pub snapshots: Vec<MemorySnapshot>,
    pub leaks: Vec<MemoryLeak>,
    /// Heap in use at the last sample.
    pub heap_size: u64,
    /// Growth from first to last sample, never negative.
    pub retained_size: u64,
    pub recommendations: Vec<Recommendation>,
}

/// Analyze a chronological series of heap samples.
pub fn analyze_memory(
    snapshots: &[MemorySnapshot],
    inspector: &dyn HeapInspector,
    options: &MemoryOptions,
) -> MemoryAnalysis {
    debug!(
        "Analyzing {} memory snapshots (heap inspector: {})",
        snapshots.len(),
        inspector.name()
    );

    let heap_size = snapshots.last().map(|s| s.heap_used).unwrap_or(0);
    let retained_size = retained_growth(snapshots);

    let mut leaks = detect_growth_leaks(snapshots, options);
    leaks.extend(inspector.inspect(snapshots));

    let recommendations = generate_recommendations(&leaks, heap_size, options);

    debug!(
        "Memory analysis: heap {}, retained {}, {} leaks",
        format_bytes(heap_size),
        format_bytes(retained_size),
        leaks.len()
    );

    MemoryAnalysis {
        snapshots: snapshots.to_vec(),
        leaks,
        heap_size,
        retained_size,
        recommendations,
    }
}

/// `last - first`, clamped at zero. Needs two samples.
pub fn retained_growth(snapshots: &[MemorySnapshot]) -> u64 {
    match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) if snapshots.len() >= 2 => {
            last.heap_used.saturating_sub(first.heap_used)
        }
        _ => 0,
    }
}

/// Mean of consecutive `heap_used` deltas. `None` with fewer than two samples.
pub fn mean_growth(snapshots: &[MemorySnapshot]) -> Option<f64> {
    if snapshots.len() < 2 {
        return None;
    }

    let total: f64 = snapshots
        .windows(2)
        .map(|pair| pair[1].heap_used as f64 - pair[0].heap_used as f64)
        .sum();

    Some(total / (snapshots.len() - 1) as f64)
}

/// Growth-based leak rules.
fn detect_growth_leaks(snapshots: &[MemorySnapshot], options: &MemoryOptions) -> Vec<MemoryLeak> {
    let mut leaks = Vec::new();

    if snapshots.len() >= 3 {
        if let Some(mean) = mean_growth(snapshots) {
            if mean > options.growth_per_sample_bytes as f64 {
                leaks.push(MemoryLeak {
                    leak_type: LeakType::ConsistentGrowth,
                    description: format!(
                        "Heap grew by {} per sample on average across {} samples",
                        format_bytes(mean as u64),
                        snapshots.len()
                    ),
                    severity: Severity::Critical,
                    retained_size: (mean * snapshots.len() as f64) as u64,
                    objects: Vec::new(),
                    heuristic: false,
                });
            }
        }
    }

    if let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) {
        if first.heap_used > 0 {
            let growth = last.heap_used as f64 - first.heap_used as f64;
            let ratio = growth / first.heap_used as f64;
            if ratio > LARGE_INCREASE_RATIO {
                leaks.push(MemoryLeak {
                    leak_type: LeakType::LargeIncrease,
                    description: format!(
                        "Heap grew {:.0}% from {} to {}",
                        ratio * 100.0,
                        format_bytes(first.heap_used),
                        format_bytes(last.heap_used)
                    ),
                    severity: Severity::Warning,
                    retained_size: growth as u64,
                    objects: Vec::new(),
                    heuristic: false,
                });
            }
        }
    }

    leaks
}

/// Remediation text and sample code for a leak type.
fn leak_remedy(leak_type: LeakType) -> (&'static str, Option<&'static str>) {
    match leak_type {
        LeakType::ConsistentGrowth => (
            "Return a cleanup function from every effect that subscribes, schedules or \
             caches, and bound any module-level caches.",
            Some(
                "useEffect(() => {\n  const id = setInterval(poll, 1000);\n  return () => clearInterval(id);\n}, []);",
            ),
        ),
        LeakType::DetachedDom => (
            "Drop references to DOM nodes when they are removed: clear refs on unmount and \
             avoid storing elements in long-lived collections.",
            Some(
                "useEffect(() => {\n  nodes.set(id, ref.current);\n  return () => nodes.delete(id);\n}, [id]);",
            ),
        ),
        LeakType::EventListeners => (
            "Remove every listener you add, using the same function reference, when the \
             component unmounts.",
            Some(
                "useEffect(() => {\n  window.addEventListener('resize', onResize);\n  return () => window.removeEventListener('resize', onResize);\n}, [onResize]);",
            ),
        ),
        _ => (
            "Take heap snapshots before and after the suspect interaction and compare \
             retained objects in the browser's memory tools.",
            None,
        ),
    }
}

/// Map leak findings and final heap size into recommendations.
pub fn generate_recommendations(
    leaks: &[MemoryLeak],
    heap_size: u64,
    options: &MemoryOptions,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for leak in leaks.iter().filter(|l| l.severity == Severity::Critical) {
        let (fix, code) = leak_remedy(leak.leak_type);
        recommendations.push(Recommendation {
            severity: Severity::Critical,
            category: "memory-leak".to_string(),
            title: format!("Memory leak detected ({})", leak.leak_type),
            description: leak.description.clone(),
            fix: fix.to_string(),
            code_example: code.map(String::from),
            estimated_impact: format!("Could free ~{}", format_bytes(leak.retained_size)),
        });
    }

    if let Some(leak) = leaks.iter().find(|l| l.leak_type == LeakType::DetachedDom) {
        let (fix, code) = leak_remedy(LeakType::DetachedDom);
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "detached-dom".to_string(),
            title: "Detached DOM nodes".to_string(),
            description: leak.description.clone(),
            fix: fix.to_string(),
            code_example: code.map(String::from),
            estimated_impact: "Lower steady-state memory after navigation".to_string(),
        });
    }

    if let Some(leak) = leaks.iter().find(|l| l.leak_type == LeakType::EventListeners) {
        let (fix, code) = leak_remedy(LeakType::EventListeners);
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "event-listeners".to_string(),
            title: "Event listeners not cleaned up".to_string(),
            description: leak.description.clone(),
            fix: fix.to_string(),
            code_example: code.map(String::from),
            estimated_impact: "Prevents listener and closure build-up across mounts".to_string(),
        });
    }

    if heap_size > options.high_memory_bytes {
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "high-memory".to_string(),
            title: "High memory usage".to_string(),
            description: format!(
                "Heap usage ended at {}, above {}.",
                format_bytes(heap_size),
                format_bytes(options.high_memory_bytes)
            ),
            fix: "Paginate or virtualize large data sets, release cached responses that are no \
                  longer shown, and prefer streaming over buffering whole payloads."
                .to_string(),
            code_example: None,
            estimated_impact: "Lower memory pressure and fewer GC pauses".to_string(),
        });
    }

    recommendations
}
