#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod aggregate;
pub mod calibrate;
pub mod consolidate;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod types;

// Supporting modules used by the stages and the command-line tool.
pub mod angle;
pub mod config;
pub mod hull;
pub mod io;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

// Main entry point and its parameters.
pub use crate::params::OverlayParams;
pub use crate::pipeline::OverlayPipeline;

// Results and errors.
pub use crate::calibrate::CalibrationModel;
pub use crate::consolidate::{OverlayRecord, OverlayStatus};
pub use crate::diagnostics::OverlayReport;
pub use crate::error::{OverlayError, Result};
pub use crate::hull::Polyhedron;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use color_overlays::prelude::*;
///
/// # fn main() -> color_overlays::Result<()> {
/// let records = vec![SampleRecord {
///     name: "red".to_string(),
///     source: Source::Crowd,
///     coordinate: HvcTriple([5.0, 4.0, 12.0]),
///     weight: 3.0,
/// }];
/// let pipeline = OverlayPipeline::new(OverlayParams::default())?;
/// let report = pipeline.run(&records, &PassThrough);
/// report.print_text_summary();
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::convert::{CoordinateConverter, HvcTriple, OutOfGamut, PassThrough};
    pub use crate::types::{HueValueChroma, Sample, SampleRecord, Source, WeightedPoint};
    pub use crate::{OverlayParams, OverlayPipeline, OverlayReport, OverlayStatus};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::aggregate::{AggregateSet, Aggregator};
    pub use crate::calibrate::Calibrator;
    pub use crate::consolidate::ConsolidationEngine;
    pub use crate::hull::HullBuilder;

    // Structured diagnostics types.
    pub use crate::aggregate::{CategoryStats, IngestCounters, SourceStats};
    pub use crate::calibrate::{
        AnchorDelta, AxisCalibration, BiasTest, RejectedModel, SkippedAnchor,
    };
    pub use crate::diagnostics::{RunSummary, StageTiming, TimingBreakdown};
    pub use crate::hull::{PeelLayer, Provenance};
}
