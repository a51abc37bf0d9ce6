//! Build statistics loading and discovery.

use super::{read_json, CollectError};
use crate::models::BuildStatistics;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// File names bundlers and their plugins commonly write statistics to.
pub const STATS_FILE_NAMES: &[&str] = &[
    "stats.json",
    "webpack-stats.json",
    "bundle-stats.json",
    "compilation-stats.json",
];

/// Directories never searched for statistics.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "coverage"];

/// How deep below the project root to look.
const MAX_DISCOVERY_DEPTH: usize = 3;

/// Load build statistics from a JSON file.
pub async fn load_build_stats(path: &Path) -> Result<BuildStatistics, CollectError> {
    info!("Loading build statistics from {}", path.display());
    let stats: BuildStatistics = read_json(path).await?;
    debug!(
        "Loaded {} assets, {} chunks, {} modules",
        stats.assets.len(),
        stats.chunks.len(),
        stats.modules.len()
    );
    Ok(stats)
}

/// Find a statistics file under `project_root`.
///
/// Shallower matches win; at equal depth, names earlier in
/// [`STATS_FILE_NAMES`] win.
pub fn discover_stats_file(project_root: &Path) -> Result<PathBuf, CollectError> {
    let mut best: Option<(usize, usize, PathBuf)> = None;

    let walker = WalkDir::new(project_root)
        .max_depth(MAX_DISCOVERY_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(rank) = STATS_FILE_NAMES.iter().position(|n| *n == name) else {
            continue;
        };

        let candidate = (entry.depth(), rank);
        if best
            .as_ref()
            .map_or(true, |(depth, r, _)| candidate < (*depth, *r))
        {
            best = Some((candidate.0, candidate.1, entry.into_path()));
        }
    }

    match best {
        Some((_, _, path)) => {
            info!("Discovered build statistics: {}", path.display());
            Ok(path)
        }
        None => Err(CollectError::StatsNotFound(project_root.to_path_buf())),
    }
}

/// Hidden and dependency directories are not searched.
fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (name.starts_with('.') || SKIPPED_DIRS.contains(&&*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_prefers_shallow_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/stats.json"), "{}").unwrap();
        fs::write(dir.path().join("bundle-stats.json"), "{}").unwrap();

        let found = discover_stats_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("bundle-stats.json"));
    }

    #[test]
    fn test_discover_skips_node_modules_and_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/stats.json"), "{}").unwrap();
        fs::write(dir.path().join(".cache/stats.json"), "{}").unwrap();

        let err = discover_stats_file(dir.path()).unwrap_err();
        assert!(matches!(err, CollectError::StatsNotFound(_)));
    }

    #[test]
    fn test_discover_skips_build_output_dirs() {
        let dir = TempDir::new().unwrap();
        for skipped in ["target", "coverage"] {
            fs::create_dir_all(dir.path().join(skipped)).unwrap();
            fs::write(dir.path().join(skipped).join("stats.json"), "{}").unwrap();
        }
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/webpack-stats.json"), "{}").unwrap();

        let found = discover_stats_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("dist/webpack-stats.json"));
    }

    #[test]
    fn test_discover_name_rank() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("webpack-stats.json"), "{}").unwrap();
        fs::write(dir.path().join("stats.json"), "{}").unwrap();

        let found = discover_stats_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("stats.json"));
    }

    #[test]
    fn test_load_build_stats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(
            &path,
            r#"{"assets":[{"name":"main.js","size":1200}],"chunks":[],"modules":[],"hash":"abc"}"#,
        )
        .unwrap();

        let stats = tokio_test::block_on(load_build_stats(&path)).unwrap();
        assert_eq!(stats.assets.len(), 1);
        assert_eq!(stats.assets[0].size, 1200);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "not json").unwrap();

        let err = tokio_test::block_on(load_build_stats(&path)).unwrap_err();
        assert!(matches!(err, CollectError::Json { .. }));
    }
}
