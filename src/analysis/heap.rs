//! Heap-graph findings.
//!
//! Detecting detached DOM trees or leaked listeners needs a captured heap
//! graph and a retainer-path walk. The memory analyzer only depends on the
//! [`HeapInspector`] trait, so a real inspector can replace the placeholder
//! below without changing how leaks are aggregated or reported.

use super::memory::{LeakType, MemoryLeak};
use crate::models::{MemorySnapshot, Severity};

/// Source of leak findings that come from inspecting the heap graph.
pub trait HeapInspector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Leaks found for the recorded session.
    fn inspect(&self, snapshots: &[MemorySnapshot]) -> Vec<MemoryLeak>;
}

/// Inspector that reports the two common leak patterns unconditionally.
///
/// It never looks at a heap graph. Its findings are marked `heuristic` and
/// always present, including for an empty recording.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderHeapInspector;

impl HeapInspector for PlaceholderHeapInspector {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn inspect(&self, _snapshots: &[MemorySnapshot]) -> Vec<MemoryLeak> {
        vec![
            MemoryLeak {
                leak_type: LeakType::DetachedDom,
                description: "Possible detached DOM nodes still referenced from JavaScript \
                              (heuristic, heap graph not inspected)"
                    .to_string(),
                severity: Severity::Warning,
                retained_size: 0,
                objects: Vec::new(),
                heuristic: true,
            },
            MemoryLeak {
                leak_type: LeakType::EventListeners,
                description: "Possible event listeners not removed on unmount \
                              (heuristic, heap graph not inspected)"
                    .to_string(),
                severity: Severity::Warning,
                retained_size: 0,
                objects: Vec::new(),
                heuristic: true,
            },
        ]
    }
}
