//! Runtime telemetry loading.
//!
//! Render events and heap samples are recorded by a browser harness as JSON
//! arrays. Events may arrive out of order; both loaders return them sorted
//! by timestamp.

use super::{read_json, CollectError};
use crate::models::{MemorySnapshot, RenderEvent};
use std::path::Path;
use tracing::{debug, info};

/// Load a render event recording, ordered by timestamp.
pub async fn load_render_events(path: &Path) -> Result<Vec<RenderEvent>, CollectError> {
    info!("Loading render events from {}", path.display());
    let mut events: Vec<RenderEvent> = read_json(path).await?;
    events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    debug!("Loaded {} render events", events.len());
    Ok(events)
}

/// Load a heap sample recording, ordered by timestamp.
pub async fn load_memory_snapshots(path: &Path) -> Result<Vec<MemorySnapshot>, CollectError> {
    info!("Loading memory snapshots from {}", path.display());
    let mut snapshots: Vec<MemorySnapshot> = read_json(path).await?;
    snapshots.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    debug!("Loaded {} memory snapshots", snapshots.len());
    Ok(snapshots)
}
