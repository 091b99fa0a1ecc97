//! Confidence weighting of per-source point sets before merging.

use crate::params::ConsolidationParams;
use crate::types::{Source, WeightedPoint};

/// Rescales one source's retained points so they sum to the source's share
/// of the merged set: `confidence(total_weight) × priority`, where measured
/// points carry the configured priority factor and crowd points carry 1.
pub fn weight_source(
    points: &[WeightedPoint],
    source: Source,
    total_weight: f64,
    params: &ConsolidationParams,
) -> Vec<WeightedPoint> {
    let retained: f64 = points.iter().map(|p| p.weight).sum();
    if retained <= 0.0 {
        return Vec::new();
    }
    let priority = match source {
        Source::Measured => params.measured_priority,
        Source::Crowd => 1.0,
    };
    let share = params.confidence(total_weight) * priority;
    points
        .iter()
        .map(|p| WeightedPoint {
            coord: p.coord,
            weight: p.weight / retained * share,
        })
        .collect()
}
