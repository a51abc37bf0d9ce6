//! Component re-render analysis.
//!
//! Groups recorded render events per component, flags components that
//! render often but cheaply, and recommends memoization or faster renders.

use crate::fmt::format_ms;
use crate::models::{CauseType, Recommendation, RenderEvent, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::debug;

/// Renders above this count are "frequent" for the unnecessary heuristic.
pub const UNNECESSARY_MIN_RENDERS: usize = 5;
/// Average render time (ms) below which a frequent component is considered wasted work.
pub const UNNECESSARY_MAX_AVG_MS: f64 = 5.0;
/// Components must render more than this many times to get a frequency recommendation.
pub const EXCESSIVE_RENDER_COUNT: usize = 10;
/// More than this many renders of a single cause triggers a recommendation.
pub const CAUSE_COUNT_THRESHOLD: usize = 5;
/// One frame at 60fps.
pub const SLOW_RENDER_MS: f64 = 16.0;

const MAX_FREQUENT_COMPONENTS: usize = 5;
const MAX_SLOW_COMPONENTS: usize = 3;
/// Share of renders memoization is expected to remove.
const MEMO_SAVINGS_RATIO: f64 = 0.6;

/// Tunables for the rerender analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct RerenderOptions {
    pub slow_render_ms: f64,
}

impl Default for RerenderOptions {
    fn default() -> Self {
        Self {
            slow_render_ms: SLOW_RENDER_MS,
        }
    }
}

/// Renders of one cause type within a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCause {
    pub cause_type: CauseType,
    pub count: usize,
    /// Details of the first event with this cause.
    pub example: String,
}

/// Per-component render statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRerenderSummary {
    pub name: String,
    pub render_count: usize,
    /// Mean render duration in milliseconds.
    pub avg_render_time: f64,
    pub causes: Vec<RenderCause>,
    /// Heuristic: rendered more than 5 times, each under 5ms on average.
    pub is_unnecessary: bool,
}

impl ComponentRerenderSummary {
    /// Number of renders attributed to `cause`.
    pub fn cause_count(&self, cause: CauseType) -> usize {
        self.causes
            .iter()
            .find(|c| c.cause_type == cause)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Output of the rerender analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RerenderAnalysis {
    pub components: Vec<ComponentRerenderSummary>,
    pub total_rerenders: usize,
    /// Renders of components flagged by the unnecessary heuristic.
    pub unnecessary_rerenders: usize,
    pub recommendations: Vec<Recommendation>,
}

/// Running totals for one component.
#[derive(Default)]
struct ComponentAccumulator<'a> {
    render_count: usize,
    total_duration: f64,
    causes: Vec<(CauseType, usize, &'a str)>,
}

/// Analyze a stream of render events.
pub fn analyze_rerenders(events: &[RenderEvent], options: &RerenderOptions) -> RerenderAnalysis {
    debug!("Analyzing {} render events", events.len());

    let components = summarize_components(events);
    let total_rerenders = components.iter().map(|c| c.render_count).sum();
    let unnecessary_rerenders = components
        .iter()
        .filter(|c| c.is_unnecessary)
        .map(|c| c.render_count)
        .sum();
    let recommendations = generate_recommendations(&components, options);

    debug!(
        "Rerender analysis: {} components, {} renders, {} unnecessary",
        components.len(),
        total_rerenders,
        unnecessary_rerenders
    );

    RerenderAnalysis {
        components,
        total_rerenders,
        unnecessary_rerenders,
        recommendations,
    }
}

/// Group events by component name, most renders first.
pub fn summarize_components(events: &[RenderEvent]) -> Vec<ComponentRerenderSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accumulators: Vec<(&str, ComponentAccumulator<'_>)> = Vec::new();

    for event in events {
        let slot = *index
            .entry(event.component_name.as_str())
            .or_insert_with(|| {
                accumulators.push((event.component_name.as_str(), ComponentAccumulator::default()));
                accumulators.len() - 1
            });

        let acc = &mut accumulators[slot].1;
        acc.render_count += 1;
        acc.total_duration += event.duration;

        match acc
            .causes
            .iter()
            .position(|(cause, _, _)| *cause == event.cause_type)
        {
            Some(i) => acc.causes[i].1 += 1,
            None => acc
                .causes
                .push((event.cause_type, 1, event.details.as_str())),
        }
    }

    let mut components: Vec<ComponentRerenderSummary> = accumulators
        .into_iter()
        .map(|(name, acc)| {
            let avg_render_time = acc.total_duration / acc.render_count as f64;
            ComponentRerenderSummary {
                name: name.to_string(),
                render_count: acc.render_count,
                avg_render_time,
                causes: acc
                    .causes
                    .into_iter()
                    .map(|(cause_type, count, example)| RenderCause {
                        cause_type,
                        count,
                        example: example.to_string(),
                    })
                    .collect(),
                is_unnecessary: acc.render_count > UNNECESSARY_MIN_RENDERS
                    && avg_render_time < UNNECESSARY_MAX_AVG_MS,
            }
        })
        .collect();

    components.sort_by_key(|c| Reverse(c.render_count));
    components
}

/// Map per-component statistics through the frequency and duration rules.
pub fn generate_recommendations(
    components: &[ComponentRerenderSummary],
    options: &RerenderOptions,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let frequent = components
        .iter()
        .filter(|c| c.render_count > EXCESSIVE_RENDER_COUNT)
        .take(MAX_FREQUENT_COMPONENTS);

    for component in frequent {
        let props_renders = component.cause_count(CauseType::Props);
        if props_renders > CAUSE_COUNT_THRESHOLD {
            let avoidable = (component.render_count as f64 * MEMO_SAVINGS_RATIO).floor() as usize;
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                category: "excessive-renders".to_string(),
                title: format!("{} re-renders on prop changes", component.name),
                description: format!(
                    "{} rendered {} times, {} of them because its props changed.",
                    component.name, component.render_count, props_renders
                ),
                fix: "Wrap the component in React.memo and keep the props it receives \
                      referentially stable with useMemo and useCallback."
                    .to_string(),
                code_example: Some(format!(
                    "const {name} = React.memo(function {name}(props) {{\n  // ...\n}});\n\n\
                     // in the parent\nconst onSelect = useCallback(id => select(id), [select]);",
                    name = component.name
                )),
                estimated_impact: format!("Could avoid ~{} renders", avoidable),
            });
        }

        let state_renders = component.cause_count(CauseType::State);
        if state_renders > CAUSE_COUNT_THRESHOLD {
            recommendations.push(Recommendation {
                severity: Severity::Warning,
                category: "state-updates".to_string(),
                title: format!("{} updates state too often", component.name),
                description: format!(
                    "{} rendered {} times because of its own state updates.",
                    component.name, state_renders
                ),
                fix: "Batch related updates, derive values instead of storing them in state, \
                      and debounce updates driven by high-frequency events."
                    .to_string(),
                code_example: Some(
                    "// Instead of several setState calls\nsetState(prev => ({ ...prev, a, b, c }));"
                        .to_string(),
                ),
                estimated_impact: "Fewer renders per user interaction".to_string(),
            });
        }
    }

    let slow = components
        .iter()
        .filter(|c| c.avg_render_time > options.slow_render_ms)
        .take(MAX_SLOW_COMPONENTS);

    for component in slow {
        recommendations.push(Recommendation {
            severity: Severity::Critical,
            category: "slow-renders".to_string(),
            title: format!("Slow renders in {}", component.name),
            description: format!(
                "{} takes {} per render on average, longer than one frame ({}).",
                component.name,
                format_ms(component.avg_render_time),
                format_ms(options.slow_render_ms)
            ),
            fix: "Move expensive computation out of render with useMemo, virtualize long \
                  lists, and split the component so less of the tree re-renders."
                .to_string(),
            code_example: Some(
                "const sorted = useMemo(() => sortRows(rows), [rows]);".to_string(),
            ),
            estimated_impact: "Smoother interactions and fewer dropped frames".to_string(),
        });
    }

    recommendations
}
