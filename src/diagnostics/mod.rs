//! Serializable run reports.
//!
//! `OverlayReport` is the main entry point returned by the pipeline, bundling
//! the per-category overlay records, the fitted calibration and a timing
//! trace of every stage the run executed.

pub mod report;
pub mod timing;

pub use report::{OverlayReport, RunSummary};
pub use timing::{StageTiming, TimingBreakdown};
