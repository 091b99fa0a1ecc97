use super::accumulator::{SourceAggregate, SourceStats};
use crate::stats::{CircularAccumulator, HueStats, LinearAccumulator};
use crate::types::{Source, WeightedPoint};
use serde::Serialize;
use std::collections::BTreeMap;

/// All samples sharing one canonical color name, split by source.
#[derive(Clone, Debug)]
pub struct Category {
    name: String,
    retention_cap: usize,
    sources: BTreeMap<Source, SourceAggregate>,
}

impl Category {
    pub fn new(name: impl Into<String>, retention_cap: usize) -> Self {
        Self {
            name: name.into(),
            retention_cap,
            sources: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn source_mut(&mut self, source: Source) -> &mut SourceAggregate {
        let cap = self.retention_cap;
        self.sources
            .entry(source)
            .or_insert_with(|| SourceAggregate::new(source, cap))
    }

    pub fn source(&self, source: Source) -> Option<&SourceAggregate> {
        self.sources.get(&source)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceAggregate> {
        self.sources.values()
    }

    pub fn merge(&mut self, other: Category) {
        debug_assert_eq!(self.name, other.name);
        for (source, agg) in other.sources {
            match self.sources.get_mut(&source) {
                Some(existing) => existing.merge(agg),
                None => {
                    self.sources.insert(source, agg);
                }
            }
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.sources.values().map(|s| s.total_weight()).sum()
    }

    pub fn count(&self) -> u64 {
        self.sources.values().map(|s| s.count()).sum()
    }

    pub fn dropped(&self) -> u64 {
        self.sources.values().map(|s| s.dropped()).sum()
    }

    /// True when the category as a whole reaches `min_weight`.
    pub fn is_sufficient(&self, min_weight: f64) -> bool {
        self.count() > 0 && self.total_weight() >= min_weight
    }

    /// True when `source` alone reaches `min_weight`.
    pub fn has_adequate(&self, source: Source, min_weight: f64) -> bool {
        self.source(source)
            .map(|s| s.count() > 0 && s.total_weight() >= min_weight)
            .unwrap_or(false)
    }

    /// Retained points of one source (empty if the source never appeared).
    pub fn points(&self, source: Source) -> Vec<WeightedPoint> {
        self.source(source).map(|s| s.points()).unwrap_or_default()
    }

    pub fn stats(&self, min_weight: f64) -> CategoryStats {
        let mut hue = CircularAccumulator::default();
        let mut value = LinearAccumulator::default();
        let mut chroma = LinearAccumulator::default();
        let mut achromatic = 0u64;
        for agg in self.sources.values() {
            hue.merge(agg.hue_accumulator());
            value.merge(agg.value_accumulator());
            chroma.merge(agg.chroma_accumulator());
            achromatic += agg.achromatic_count();
        }
        CategoryStats {
            name: self.name.clone(),
            count: self.count(),
            total_weight: self.total_weight(),
            dropped: self.dropped(),
            achromatic,
            insufficient_samples: !self.is_sufficient(min_weight),
            hue: hue.stats(),
            value_mean: value.mean(),
            value_std: value.std(),
            chroma_mean: chroma.mean(),
            chroma_std: chroma.std(),
            per_source: self.sources.values().map(|s| s.stats()).collect(),
        }
    }
}

/// Statistics reported for every category, including those excluded from
/// geometry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub name: String,
    pub count: u64,
    pub total_weight: f64,
    pub dropped: u64,
    pub achromatic: u64,
    pub insufficient_samples: bool,
    pub hue: HueStats,
    pub value_mean: Option<f64>,
    pub value_std: Option<f64>,
    pub chroma_mean: Option<f64>,
    pub chroma_std: Option<f64>,
    pub per_source: Vec<SourceStats>,
}
