//! Streaming sample aggregation.
//!
//! The [`Aggregator`] consumes raw records, converts them through the external
//! [`CoordinateConverter`], and folds each accepted sample into its
//! (category, source) accumulator. Aggregators built over disjoint shards of
//! the input merge into the same statistics as a single sequential pass.
//! [`Aggregator::finalize`] freezes the state into an [`AggregateSet`]; later
//! stages only ever see the frozen set.

use super::category::{Category, CategoryStats};
use crate::convert::CoordinateConverter;
use crate::error::OverlayError;
use crate::params::AggregationParams;
use crate::types::{Sample, SampleRecord, Source};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Run-wide ingestion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestCounters {
    /// Records offered to the aggregator.
    pub seen: u64,
    /// Records accepted into a category.
    pub accepted: u64,
    /// Records dropped because conversion reported out of gamut.
    pub out_of_gamut: u64,
    /// Records rejected for an empty name or non-positive weight.
    pub invalid: u64,
}

impl IngestCounters {
    fn merge(&mut self, other: &IngestCounters) {
        self.seen += other.seen;
        self.accepted += other.accepted;
        self.out_of_gamut += other.out_of_gamut;
        self.invalid += other.invalid;
    }
}

/// Mutable accumulation state for one pipeline run.
pub struct Aggregator {
    params: AggregationParams,
    categories: HashMap<String, Category>,
    counters: IngestCounters,
    rng: StdRng,
}

impl Aggregator {
    pub fn new(params: AggregationParams) -> Self {
        let seed = params.seed;
        Self::with_seed(params, seed)
    }

    fn with_seed(params: AggregationParams, seed: u64) -> Self {
        Self {
            params,
            categories: HashMap::new(),
            counters: IngestCounters::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn counters(&self) -> IngestCounters {
        self.counters
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn category_mut(&mut self, name: &str) -> &mut Category {
        let cap = self.params.retention_cap;
        self.categories
            .entry(name.to_string())
            .or_insert_with(|| Category::new(name, cap))
    }

    /// Folds an already converted sample into its category.
    pub fn push(&mut self, sample: &Sample) {
        let key = self.rng.gen::<u64>();
        let achromatic = self.params.achromatic_chroma;
        self.counters.seen += 1;
        self.counters.accepted += 1;
        self.category_mut(sample.name())
            .source_mut(sample.source())
            .push(sample.point(), key, achromatic);
    }

    /// Converts and folds one raw record. Out-of-gamut records are counted
    /// against their category and source; invalid records are counted and
    /// skipped.
    pub fn ingest_record<C: CoordinateConverter>(
        &mut self,
        record: &SampleRecord<C::Native>,
        converter: &C,
    ) {
        let coord = match converter.convert(&record.coordinate) {
            Ok(coord) => coord,
            Err(err) => {
                debug!(
                    "Aggregator: dropping sample for '{}' ({}): {}",
                    record.name,
                    record.source.label(),
                    OverlayError::from(err)
                );
                self.counters.seen += 1;
                self.counters.out_of_gamut += 1;
                if !record.name.is_empty() {
                    self.category_mut(&record.name)
                        .source_mut(record.source)
                        .record_dropped();
                }
                return;
            }
        };
        match Sample::new(record.name.as_str(), record.source, coord, record.weight) {
            Ok(sample) => self.push(&sample),
            Err(err) => {
                debug!("Aggregator: skipping invalid record: {err}");
                self.counters.seen += 1;
                self.counters.invalid += 1;
            }
        }
    }

    /// Sequential ingestion of a record stream.
    pub fn ingest<'a, C, I>(&mut self, records: I, converter: &C)
    where
        C: CoordinateConverter,
        C::Native: 'a,
        I: IntoIterator<Item = &'a SampleRecord<C::Native>>,
    {
        for record in records {
            self.ingest_record(record, converter);
        }
    }

    /// Sharded ingestion: each chunk is folded into its own aggregator on the
    /// rayon pool and the partial aggregates are merged.
    pub fn ingest_parallel<C>(
        params: &AggregationParams,
        records: &[SampleRecord<C::Native>],
        converter: &C,
        chunk_size: usize,
    ) -> Aggregator
    where
        C: CoordinateConverter,
        C::Native: Sync,
    {
        let chunk_size = chunk_size.max(1);
        records
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(idx, chunk)| {
                let seed = params.seed.wrapping_add(idx as u64 + 1);
                let mut shard = Aggregator::with_seed(params.clone(), seed);
                shard.ingest(chunk, converter);
                shard
            })
            .reduce(
                || Aggregator::with_seed(params.clone(), params.seed),
                |mut a, b| {
                    a.merge(b);
                    a
                },
            )
    }

    /// Commutative merge of another partial aggregate for the same run.
    pub fn merge(&mut self, other: Aggregator) {
        self.counters.merge(&other.counters);
        for (name, category) in other.categories {
            match self.categories.get_mut(&name) {
                Some(existing) => existing.merge(category),
                None => {
                    self.categories.insert(name, category);
                }
            }
        }
    }

    /// Freezes the accumulated state. Calibration and consolidation only run
    /// on the returned set, so they never observe partial aggregates.
    pub fn finalize(self) -> AggregateSet {
        let categories: BTreeMap<String, Category> = self.categories.into_iter().collect();
        debug!(
            "Aggregator::finalize categories={} accepted={} out_of_gamut={} invalid={}",
            categories.len(),
            self.counters.accepted,
            self.counters.out_of_gamut,
            self.counters.invalid
        );
        AggregateSet {
            min_weight: self.params.min_weight,
            categories,
            counters: self.counters,
        }
    }
}

/// Finalized, read-only aggregation result.
#[derive(Clone, Debug)]
pub struct AggregateSet {
    min_weight: f64,
    categories: BTreeMap<String, Category>,
    counters: IngestCounters,
}

impl AggregateSet {
    pub fn min_weight(&self) -> f64 {
        self.min_weight
    }

    pub fn counters(&self) -> IngestCounters {
        self.counters
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.get(name)
    }

    /// Categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Names of categories with adequate weight in both sources.
    pub fn anchor_names(&self) -> Vec<&str> {
        self.categories
            .values()
            .filter(|c| {
                c.has_adequate(Source::Measured, self.min_weight)
                    && c.has_adequate(Source::Crowd, self.min_weight)
            })
            .map(|c| c.name())
            .collect()
    }

    pub fn stats(&self) -> Vec<CategoryStats> {
        self.categories
            .values()
            .map(|c| c.stats(self.min_weight))
            .collect()
    }
}
