//! End-to-end overlay pipeline.
//!
//! The [`OverlayPipeline`] owns nothing but its parameters; every run builds
//! its own aggregate state, so independent runs (for example threshold
//! sweeps) can execute concurrently.
//!
//! Stages
//! - Aggregate: convert and fold raw records into per-category, per-source
//!   accumulators on the rayon pool, then freeze them.
//! - Calibrate: build per-source hulls of the anchor categories and fit the
//!   crowd-to-measured correction. Runs only on the frozen aggregate set.
//! - Consolidate: pick the source with priority (or merge sources when
//!   neither is adequate alone), correct crowd points and build the final
//!   polyhedron of every category.
//!
//! ```no_run
//! use color_overlays::prelude::*;
//!
//! # fn example(records: Vec<SampleRecord<HvcTriple>>) -> color_overlays::Result<()> {
//! let pipeline = OverlayPipeline::new(OverlayParams::default())?;
//! let report = pipeline.run(&records, &PassThrough);
//! for overlay in &report.overlays {
//!     println!("{}: {}", overlay.name, overlay.status.label());
//! }
//! # Ok(())
//! # }
//! ```

use crate::aggregate::{AggregateSet, Aggregator};
use crate::calibrate::{CalibrationModel, Calibrator};
use crate::consolidate::{ConsolidationEngine, OverlayRecord};
use crate::convert::CoordinateConverter;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{OverlayReport, RunSummary, TimingBreakdown};
use crate::error::Result;
use crate::params::OverlayParams;
use crate::types::SampleRecord;
use log::debug;
use std::time::Instant;

/// Records per ingestion shard.
const INGEST_CHUNK: usize = 8192;

/// Overlay construction and calibration pipeline.
#[derive(Clone, Debug)]
pub struct OverlayPipeline {
    params: OverlayParams,
}

impl OverlayPipeline {
    /// Validates `params` and creates a pipeline.
    pub fn new(params: OverlayParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &OverlayParams {
        &self.params
    }

    /// Aggregates `records` in parallel shards and freezes the result.
    pub fn aggregate<C>(&self, records: &[SampleRecord<C::Native>], converter: &C) -> AggregateSet
    where
        C: CoordinateConverter,
        C::Native: Sync,
    {
        Aggregator::ingest_parallel(&self.params.aggregation, records, converter, INGEST_CHUNK)
            .finalize()
    }

    pub fn calibrate(&self, set: &AggregateSet) -> CalibrationModel {
        Calibrator::new(&self.params).fit(set)
    }

    pub fn consolidate(&self, set: &AggregateSet, model: &CalibrationModel) -> Vec<OverlayRecord> {
        ConsolidationEngine::new(&self.params).consolidate(set, model)
    }

    /// Runs every stage from a finalized aggregate set.
    pub fn run_aggregated(&self, set: &AggregateSet) -> OverlayReport {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        let (calibration, overlays) = self.calibrate_and_consolidate(set, &mut timings);
        timings.total_ms = elapsed_ms(total_start);
        self.report(set, calibration, overlays, timings)
    }

    /// Runs the full pipeline over raw records.
    pub fn run<C>(&self, records: &[SampleRecord<C::Native>], converter: &C) -> OverlayReport
    where
        C: CoordinateConverter,
        C::Native: Sync,
    {
        let total_start = Instant::now();
        debug!("OverlayPipeline::run start records={}", records.len());
        let mut timings = TimingBreakdown::default();

        let stage = Instant::now();
        let set = self.aggregate(records, converter);
        timings.push("aggregate", elapsed_ms(stage));

        let (calibration, overlays) = self.calibrate_and_consolidate(&set, &mut timings);
        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "OverlayPipeline::run done categories={} total_ms={:.3}",
            overlays.len(),
            timings.total_ms
        );
        self.report(&set, calibration, overlays, timings)
    }

    fn calibrate_and_consolidate(
        &self,
        set: &AggregateSet,
        timings: &mut TimingBreakdown,
    ) -> (CalibrationModel, Vec<OverlayRecord>) {
        let stage = Instant::now();
        let calibration = self.calibrate(set);
        timings.push("calibrate", elapsed_ms(stage));

        let stage = Instant::now();
        let overlays = self.consolidate(set, &calibration);
        timings.push("consolidate", elapsed_ms(stage));
        (calibration, overlays)
    }

    fn report(
        &self,
        set: &AggregateSet,
        calibration: CalibrationModel,
        overlays: Vec<OverlayRecord>,
        timings: TimingBreakdown,
    ) -> OverlayReport {
        OverlayReport {
            summary: RunSummary::from_records(&overlays),
            overlays,
            calibration,
            counters: set.counters(),
            timings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_are_rejected() {
        let mut params = OverlayParams::default();
        params.calibration.significance = 1.5;
        assert!(OverlayPipeline::new(params).is_err());
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let pipeline = OverlayPipeline::new(OverlayParams::default()).unwrap();
        let records: Vec<SampleRecord<crate::convert::HvcTriple>> = Vec::new();
        let report = pipeline.run(&records, &crate::convert::PassThrough);
        assert!(report.overlays.is_empty());
        assert_eq!(report.summary.categories, 0);
        assert!(!report.calibration.is_calibrated());
        assert_eq!(report.timings.stages.len(), 3);
    }
}
