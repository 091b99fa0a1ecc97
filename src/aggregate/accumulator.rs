use super::reservoir::{weighted_key, PointReservoir};
use crate::stats::{CircularAccumulator, HueStats, LinearAccumulator};
use crate::types::{Source, WeightedPoint};
use serde::Serialize;

/// Online statistics for one (category, source) pair.
///
/// All fields are sums or a mergeable reservoir, so two partial aggregates
/// combine by [`merge`](Self::merge) exactly as if their samples had been
/// pushed into one.
#[derive(Clone, Debug)]
pub struct SourceAggregate {
    source: Source,
    count: u64,
    dropped: u64,
    achromatic: u64,
    value: LinearAccumulator,
    chroma: LinearAccumulator,
    hue: CircularAccumulator,
    reservoir: PointReservoir,
}

impl SourceAggregate {
    pub fn new(source: Source, retention_cap: usize) -> Self {
        Self {
            source,
            count: 0,
            dropped: 0,
            achromatic: 0,
            value: LinearAccumulator::default(),
            chroma: LinearAccumulator::default(),
            hue: CircularAccumulator::default(),
            reservoir: PointReservoir::new(retention_cap),
        }
    }

    pub fn push(&mut self, point: WeightedPoint, key: u64, achromatic_chroma: f64) {
        let w = point.weight;
        self.count += 1;
        self.value.push(point.coord.value, w);
        self.chroma.push(point.coord.chroma, w);
        if point.coord.is_achromatic(achromatic_chroma) {
            self.achromatic += 1;
        } else {
            self.hue.push(point.coord.hue, w);
        }
        self.reservoir.offer(weighted_key(key, w), point);
    }

    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    pub fn merge(&mut self, other: SourceAggregate) {
        debug_assert_eq!(self.source, other.source);
        self.count += other.count;
        self.dropped += other.dropped;
        self.achromatic += other.achromatic;
        self.value.merge(&other.value);
        self.chroma.merge(&other.chroma);
        self.hue.merge(&other.hue);
        self.reservoir.merge(other.reservoir);
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn total_weight(&self) -> f64 {
        self.value.sum_w
    }

    pub fn hue_accumulator(&self) -> &CircularAccumulator {
        &self.hue
    }

    pub(crate) fn value_accumulator(&self) -> &LinearAccumulator {
        &self.value
    }

    pub(crate) fn chroma_accumulator(&self) -> &LinearAccumulator {
        &self.chroma
    }

    pub fn achromatic_count(&self) -> u64 {
        self.achromatic
    }

    /// Points retained for geometry.
    pub fn points(&self) -> Vec<WeightedPoint> {
        self.reservoir.points()
    }

    pub fn retained(&self) -> usize {
        self.reservoir.len()
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            source: self.source,
            count: self.count,
            total_weight: self.total_weight(),
            dropped: self.dropped,
            achromatic: self.achromatic,
            retained: self.reservoir.len(),
            retention_saturated: self.reservoir.is_saturated(),
            hue: self.hue.stats(),
            value_mean: self.value.mean(),
            value_std: self.value.std(),
            chroma_mean: self.chroma.mean(),
            chroma_std: self.chroma.std(),
        }
    }
}

/// Summary statistics for one source of a category.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStats {
    pub source: Source,
    pub count: u64,
    pub total_weight: f64,
    pub dropped: u64,
    pub achromatic: u64,
    pub retained: usize,
    pub retention_saturated: bool,
    pub hue: HueStats,
    pub value_mean: Option<f64>,
    pub value_std: Option<f64>,
    pub chroma_mean: Option<f64>,
    pub chroma_std: Option<f64>,
}
