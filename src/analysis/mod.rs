//! Analysis modules.
//!
//! Each analyzer is a pure function of its own recorded input. The merger
//! combines their recommendation lists into one summary.

pub mod bundle;
pub mod heap;
pub mod memory;
pub mod merger;
pub mod rerender;

pub use bundle::{analyze_bundle, BundleAnalysis, BundleOptions};
pub use heap::{HeapInspector, PlaceholderHeapInspector};
pub use memory::{analyze_memory, MemoryAnalysis, MemoryOptions};
pub use merger::*;
pub use rerender::{analyze_rerenders, RerenderAnalysis, RerenderOptions};
