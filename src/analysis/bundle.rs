//! Bundle composition analysis.
//!
//! Reduces bundler build statistics into chunk, module, duplicate and
//! asset-class summaries, then maps those through fixed size thresholds
//! into recommendations.

use crate::fmt::format_bytes;
use crate::models::{BuildStatistics, ChunkId, Recommendation, Severity, StatsAsset, StatsModule};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::debug;

/// Modules above this size are reported individually.
pub const LARGE_MODULE_BYTES: u64 = 50_000;
/// Total bundle size above which the bundle is flagged.
pub const LARGE_BUNDLE_BYTES: u64 = 500_000;
/// Chunk size above which a chunk is flagged.
pub const LARGE_CHUNK_BYTES: u64 = 250_000;

/// Maximum number of large modules kept.
const MAX_LARGE_MODULES: usize = 20;
/// Number of large modules / duplicates that get a recommendation.
const TOP_FINDINGS: usize = 3;

/// Extensions whose stem is used as a module's base name.
const SOURCE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Tunables for the bundle analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOptions {
    pub large_module_bytes: u64,
    pub large_bundle_bytes: u64,
    pub large_chunk_bytes: u64,
    /// Count duplicates living under `node_modules` too. Off by default.
    pub include_node_modules_duplicates: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            large_module_bytes: LARGE_MODULE_BYTES,
            large_bundle_bytes: LARGE_BUNDLE_BYTES,
            large_chunk_bytes: LARGE_CHUNK_BYTES,
            include_node_modules_duplicates: false,
        }
    }
}

/// Summary of one output chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub name: String,
    pub size: u64,
    pub files: Vec<String>,
    pub module_count: usize,
    pub initial: bool,
    pub parents: Vec<ChunkId>,
}

/// A module above the large-module threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub size: u64,
    pub path: String,
    /// Modules that import this one.
    pub reasons: Vec<String>,
    pub depth: u32,
}

/// Modules sharing a base filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Base filename without extension.
    pub name: String,
    pub instances: usize,
    pub total_size: u64,
    pub locations: Vec<String>,
}

impl DuplicateGroup {
    /// Bytes saved by keeping a single instance.
    pub fn potential_savings(&self) -> u64 {
        if self.instances == 0 {
            return 0;
        }
        self.total_size - self.total_size / self.instances as u64
    }
}

/// Asset bytes partitioned by file type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub js_size: u64,
    pub css_size: u64,
    pub image_size: u64,
    pub other_size: u64,
}

impl AssetMetrics {
    /// Sum of all buckets.
    pub fn total(&self) -> u64 {
        self.js_size + self.css_size + self.image_size + self.other_size
    }
}

/// Output of the bundle analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleAnalysis {
    pub total_size: u64,
    pub chunks: Vec<ChunkSummary>,
    pub large_modules: Vec<ModuleSummary>,
    pub duplicates: Vec<DuplicateGroup>,
    pub metrics: AssetMetrics,
    pub recommendations: Vec<Recommendation>,
}

/// Analyze build statistics.
///
/// Total over its input: empty statistics yield an all-zero analysis.
pub fn analyze_bundle(stats: &BuildStatistics, options: &BundleOptions) -> BundleAnalysis {
    debug!(
        "Analyzing bundle: {} assets, {} chunks, {} modules",
        stats.assets.len(),
        stats.chunks.len(),
        stats.modules.len()
    );

    let total_size = stats.assets.iter().map(|a| a.size).sum();
    let chunks = summarize_chunks(stats);
    let large_modules = find_large_modules(&stats.modules, options.large_module_bytes);
    let duplicates = find_duplicates(&stats.modules, options.include_node_modules_duplicates);
    let metrics = asset_metrics(&stats.assets);

    let mut analysis = BundleAnalysis {
        total_size,
        chunks,
        large_modules,
        duplicates,
        metrics,
        recommendations: Vec::new(),
    };
    analysis.recommendations = generate_recommendations(&analysis, options);

    debug!(
        "Bundle analysis: {} total, {} large modules, {} duplicate groups, {} recommendations",
        format_bytes(analysis.total_size),
        analysis.large_modules.len(),
        analysis.duplicates.len(),
        analysis.recommendations.len()
    );

    analysis
}

/// Summarize chunks, largest first. Ties keep input order.
pub fn summarize_chunks(stats: &BuildStatistics) -> Vec<ChunkSummary> {
    let mut chunks: Vec<ChunkSummary> = stats
        .chunks
        .iter()
        .map(|chunk| ChunkSummary {
            name: chunk
                .names
                .first()
                .cloned()
                .unwrap_or_else(|| chunk.id.to_string()),
            size: chunk.size,
            files: chunk.files.clone(),
            module_count: chunk.module_count,
            initial: chunk.initial,
            parents: chunk.parents.clone(),
        })
        .collect();

    // sort_by_key is stable
    chunks.sort_by_key(|c| Reverse(c.size));
    chunks
}

/// Modules strictly above `threshold`, largest first, at most 20.
pub fn find_large_modules(modules: &[StatsModule], threshold: u64) -> Vec<ModuleSummary> {
    let mut large: Vec<ModuleSummary> = modules
        .iter()
        .filter(|m| m.size > threshold)
        .map(|m| ModuleSummary {
            name: m.name.clone(),
            size: m.size,
            path: m.identifier.clone(),
            reasons: m.referenced_by(),
            depth: m.depth,
        })
        .collect();

    large.sort_by_key(|m| Reverse(m.size));
    large.truncate(MAX_LARGE_MODULES);
    large
}

/// Group modules by base filename and keep groups with more than one member.
///
/// Modules whose raw name mentions `webpack` are runtime housekeeping and
/// always skipped. Modules under `node_modules` are skipped unless
/// `include_node_modules` is set.
pub fn find_duplicates(modules: &[StatsModule], include_node_modules: bool) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for module in modules {
        if module.name.contains("webpack") {
            continue;
        }
        if !include_node_modules && module.name.contains("node_modules") {
            continue;
        }
        let Some(base) = base_name(&module.name) else {
            continue;
        };

        let location = if module.identifier.is_empty() {
            module.name.clone()
        } else {
            module.identifier.clone()
        };

        let slot = *index.entry(base).or_insert_with(|| {
            groups.push(DuplicateGroup {
                name: base.to_string(),
                instances: 0,
                total_size: 0,
                locations: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.instances += 1;
        group.total_size += module.size;
        group.locations.push(location);
    }

    let mut duplicates: Vec<DuplicateGroup> =
        groups.into_iter().filter(|g| g.instances > 1).collect();
    duplicates.sort_by_key(|g| Reverse(g.total_size));
    duplicates
}

/// File stem of a JS/TS module name, if it has one.
fn base_name(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);

    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| file.strip_suffix(ext))
        .filter(|stem| !stem.is_empty())
}

/// Partition asset bytes by suffix. Every asset lands in exactly one bucket.
pub fn asset_metrics(assets: &[StatsAsset]) -> AssetMetrics {
    let mut metrics = AssetMetrics::default();

    for asset in assets {
        let name = asset.name.to_lowercase();
        if name.ends_with(".js") {
            metrics.js_size += asset.size;
        } else if name.ends_with(".css") {
            metrics.css_size += asset.size;
        } else if IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            metrics.image_size += asset.size;
        } else {
            metrics.other_size += asset.size;
        }
    }

    metrics
}

/// Map the aggregated summaries through the size rules.
pub fn generate_recommendations(
    analysis: &BundleAnalysis,
    options: &BundleOptions,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if analysis.total_size > options.large_bundle_bytes {
        recommendations.push(Recommendation {
            severity: Severity::Critical,
            category: "bundle-size".to_string(),
            title: "Bundle size exceeds recommended limit".to_string(),
            description: format!(
                "Total bundle size is {}, above the recommended {}.",
                format_bytes(analysis.total_size),
                format_bytes(options.large_bundle_bytes)
            ),
            fix: "Split the bundle with dynamic import() so routes and heavy features load on \
                  demand, and make sure tree shaking is enabled for production builds."
                .to_string(),
            code_example: Some(
                "const Dashboard = React.lazy(() => import('./Dashboard'));\n\n\
                 <Suspense fallback={<Spinner />}>\n  <Dashboard />\n</Suspense>"
                    .to_string(),
            ),
            estimated_impact: format!(
                "Could cut the initial download by up to {}",
                format_bytes(analysis.total_size - options.large_bundle_bytes)
            ),
        });
    }

    for chunk in analysis
        .chunks
        .iter()
        .filter(|c| c.size > options.large_chunk_bytes)
    {
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "chunk-size".to_string(),
            title: format!("Large chunk: {}", chunk.name),
            description: format!(
                "Chunk '{}' is {} across {} modules ({}).",
                chunk.name,
                format_bytes(chunk.size),
                chunk.module_count,
                if chunk.initial { "initial" } else { "async" }
            ),
            fix: "Break the chunk up with splitChunks cache groups so rarely changing vendor \
                  code is cached separately from application code."
                .to_string(),
            code_example: Some(
                "optimization: {\n  splitChunks: {\n    chunks: 'all',\n    maxSize: 250000,\n  },\n}"
                    .to_string(),
            ),
            estimated_impact: "Smaller chunks cache better and download in parallel".to_string(),
        });
    }

    for module in analysis.large_modules.iter().take(TOP_FINDINGS) {
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "large-module".to_string(),
            title: format!("Large module: {}", short_name(&module.name)),
            description: format!(
                "{} is {}{}.",
                module.name,
                format_bytes(module.size),
                if module.reasons.is_empty() {
                    String::new()
                } else {
                    format!(", imported by {}", module.reasons.join(", "))
                }
            ),
            fix: "Import only the parts you use, swap in a lighter alternative, or load the \
                  module lazily where it is needed."
                .to_string(),
            code_example: Some(
                "// Instead of\nimport _ from 'lodash';\n// import just what you use\nimport debounce from 'lodash/debounce';"
                    .to_string(),
            ),
            estimated_impact: format!("Up to {} smaller", format_bytes(module.size)),
        });
    }

    for group in analysis.duplicates.iter().take(TOP_FINDINGS) {
        recommendations.push(Recommendation {
            severity: Severity::Warning,
            category: "duplicate-modules".to_string(),
            title: format!("Duplicate module: {}", group.name),
            description: format!(
                "'{}' is bundled {} times ({} total): {}.",
                group.name,
                group.instances,
                format_bytes(group.total_size),
                group.locations.join(", ")
            ),
            fix: "Point every import at a single copy with resolve.alias, or align dependency \
                  versions so the package manager can dedupe them."
                .to_string(),
            code_example: Some(
                "resolve: {\n  alias: {\n    utils: path.resolve(__dirname, 'src/utils'),\n  },\n}"
                    .to_string(),
            ),
            estimated_impact: format!("Could save {}", format_bytes(group.potential_savings())),
        });
    }

    recommendations
}

/// Last path segment of a module name.
fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatsChunk;

    fn asset(name: &str, size: u64) -> StatsAsset {
        StatsAsset {
            name: name.to_string(),
            size,
        }
    }

    fn module(name: &str, size: u64) -> StatsModule {
        StatsModule {
            name: name.to_string(),
            size,
            identifier: format!("/app/{}", name.trim_start_matches("./")),
            ..Default::default()
        }
    }

    fn chunk(id: u64, name: &str, size: u64) -> StatsChunk {
        StatsChunk {
            id: ChunkId::Number(id),
            names: vec![name.to_string()],
            size,
            ..Default::default()
        }
    }

    fn categories(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.category.as_str()).collect()
    }

    #[test]
    fn test_empty_stats() {
        let analysis = analyze_bundle(&BuildStatistics::default(), &BundleOptions::default());

        assert_eq!(analysis.total_size, 0);
        assert!(analysis.chunks.is_empty());
        assert!(analysis.large_modules.is_empty());
        assert!(analysis.duplicates.is_empty());
        assert_eq!(analysis.metrics, AssetMetrics::default());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_asset_metrics_partition() {
        let assets = vec![
            asset("main.js", 1000),
            asset("styles.css", 200),
            asset("logo.PNG", 50),
            asset("icon.svg", 5),
            asset("hero.webp", 7),
            asset("main.js.map", 4000),
            asset("index.html", 3),
        ];

        let metrics = asset_metrics(&assets);
        assert_eq!(metrics.js_size, 1000);
        assert_eq!(metrics.css_size, 200);
        assert_eq!(metrics.image_size, 62);
        assert_eq!(metrics.other_size, 4003);
        assert_eq!(metrics.total(), assets.iter().map(|a| a.size).sum::<u64>());
    }

    #[test]
    fn test_chunks_sorted_stably() {
        let stats = BuildStatistics {
            chunks: vec![
                chunk(0, "a", 100),
                chunk(1, "b", 300),
                chunk(2, "c", 100),
                StatsChunk {
                    id: ChunkId::Number(3),
                    size: 300,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let names: Vec<String> = summarize_chunks(&stats)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["b", "3", "a", "c"]);
    }

    #[test]
    fn test_large_modules_threshold_and_cap() {
        let mut modules: Vec<StatsModule> = (0..25)
            .map(|i| module(&format!("./src/m{}.js", i), 60_000 + i * 10))
            .collect();
        modules.push(module("./src/exact.js", 50_000));
        modules.push(module("./src/small.js", 10));

        let large = find_large_modules(&modules, LARGE_MODULE_BYTES);
        assert_eq!(large.len(), 20);
        assert_eq!(large[0].name, "./src/m24.js");
        assert!(large.iter().all(|m| m.size > LARGE_MODULE_BYTES));
        assert!(large.windows(2).all(|w| w[0].size >= w[1].size));
    }

    #[test]
    fn test_duplicates_grouped_by_base_name() {
        let modules = vec![
            module("./src/utils/format.js", 100),
            module("./src/legacy/format.ts", 300),
            module("./src/format.jsx", 50),
            module("./src/other.js", 10),
            module("./src/big/helpers.js", 1000),
            module("./src/small/helpers.js", 1000),
            module("./node_modules/lodash/format.js", 999),
            module("(webpack)/buildin/format.js", 5),
        ];

        let duplicates = find_duplicates(&modules, false);
        assert_eq!(duplicates.len(), 2);

        assert_eq!(duplicates[0].name, "helpers");
        assert_eq!(duplicates[0].instances, 2);
        assert_eq!(duplicates[0].total_size, 2000);

        assert_eq!(duplicates[1].name, "format");
        assert_eq!(duplicates[1].instances, 3);
        assert_eq!(duplicates[1].total_size, 450);
        assert_eq!(duplicates[1].locations[0], "/app/src/utils/format.js");
    }

    #[test]
    fn test_duplicates_can_include_node_modules() {
        let modules = vec![
            module("./node_modules/lodash/lodash.js", 500),
            module("./node_modules/a/node_modules/lodash/lodash.js", 500),
            module("(webpack)/runtime/lodash.js", 1),
        ];

        assert!(find_duplicates(&modules, false).is_empty());

        let duplicates = find_duplicates(&modules, true);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].instances, 2);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("./src/App.tsx"), Some("App"));
        assert_eq!(base_name("./src/index.ts"), Some("index"));
        assert_eq!(base_name("C:\\src\\util.js"), Some("util"));
        assert_eq!(base_name("./src/styles.css"), None);
        assert_eq!(base_name("./src/.js"), None);
        assert_eq!(base_name("./src/a.js + 4 modules"), None);
    }

    #[test]
    fn test_duplicate_savings() {
        let group = DuplicateGroup {
            name: "x".to_string(),
            instances: 3,
            total_size: 300,
            locations: vec![],
        };
        assert_eq!(group.potential_savings(), 200);
    }

    #[test]
    fn test_bundle_size_rule_boundary() {
        let options = BundleOptions::default();

        let at_limit = BuildStatistics {
            assets: vec![asset("main.js", 500_000)],
            ..Default::default()
        };
        let analysis = analyze_bundle(&at_limit, &options);
        assert!(!categories(&analysis.recommendations).contains(&"bundle-size"));

        let over = BuildStatistics {
            assets: vec![asset("main.js", 400_000), asset("vendor.js", 100_001)],
            ..Default::default()
        };
        let analysis = analyze_bundle(&over, &options);
        assert_eq!(analysis.recommendations[0].category, "bundle-size");
        assert_eq!(analysis.recommendations[0].severity, Severity::Critical);
    }

    #[test]
    fn test_recommendation_order_and_limits() {
        let mut modules: Vec<StatsModule> = (0..5)
            .map(|i| module(&format!("./src/heavy{}.js", i), 70_000 + i))
            .collect();
        for dir in ["a", "b", "c", "d"] {
            for name in ["x", "y", "z", "w"] {
                modules.push(module(&format!("./src/{}/{}.js", dir, name), 10));
            }
        }

        let stats = BuildStatistics {
            assets: vec![asset("main.js", 600_000)],
            chunks: vec![
                chunk(0, "main", 300_000),
                chunk(1, "vendors", 260_000),
                chunk(2, "small", 1_000),
            ],
            modules,
        };

        let analysis = analyze_bundle(&stats, &BundleOptions::default());
        assert_eq!(
            categories(&analysis.recommendations),
            vec![
                "bundle-size",
                "chunk-size",
                "chunk-size",
                "large-module",
                "large-module",
                "large-module",
                "duplicate-modules",
                "duplicate-modules",
                "duplicate-modules",
            ]
        );
        assert_eq!(analysis.duplicates.len(), 4);
        assert_eq!(analysis.recommendations[3].title, "Large module: heavy4.js");
    }

    #[test]
    fn test_duplicate_recommendation_impact() {
        let stats = BuildStatistics {
            modules: vec![
                module("./src/a/date.js", 2048),
                module("./src/b/date.js", 2048),
            ],
            ..Default::default()
        };

        let analysis = analyze_bundle(&stats, &BundleOptions::default());
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].estimated_impact, "Could save 2.00 KB");
    }
}
