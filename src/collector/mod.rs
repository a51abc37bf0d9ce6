//! Input collection.
//!
//! Loads the recordings the analyzers consume: bundler build statistics and
//! runtime telemetry (render events and heap samples). Producing those
//! recordings is the job of the bundler and of a browser harness; this
//! module only reads what they wrote.

pub mod stats;
pub mod telemetry;

use crate::models::AnalyzerKind;
use std::path::PathBuf;
use thiserror::Error;

pub use stats::{discover_stats_file, load_build_stats, STATS_FILE_NAMES};
pub use telemetry::{load_memory_snapshots, load_render_events};

/// Errors that can occur while loading an analyzer's input.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No input recording configured for the {0} analyzer")]
    MissingInput(AnalyzerKind),

    #[error("No build statistics file found under {}", .0.display())]
    StatsNotFound(PathBuf),
}

/// Read and deserialize a JSON file.
pub(crate) async fn read_json<T>(path: &std::path::Path) -> Result<T, CollectError>
where
    T: serde::de::DeserializeOwned,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CollectError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| CollectError::Json {
        path: path.to_path_buf(),
        source,
    })
}
