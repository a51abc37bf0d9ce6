//! Perflens - bundle, re-render and memory auditor for web front-ends.
//!
//! Three independent analyzers read recorded inputs and each produce a list
//! of [`models::Recommendation`]s:
//!
//! - [`analysis::bundle`] reads a bundler's build statistics (`stats.json`)
//! - [`analysis::rerender`] reads render events captured from a running page
//! - [`analysis::memory`] reads heap usage samples
//!
//! [`audit::run_audit`] runs the selected analyzers concurrently and merges
//! their output into one [`models::AnalysisResult`], which [`report`]
//! renders as Markdown, JSON or HTML.

pub mod analysis;
pub mod audit;
pub mod cli;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod models;
pub mod report;
