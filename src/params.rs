//! Parameter types configuring the overlay stages.
//!
//! This module groups knobs for sample aggregation, robust hull construction,
//! cross-source calibration, and multi-source consolidation.
//!
//! Defaults follow the reference physical-measurement methodology: single
//! layer peeling, a 5% significance level, and at least ten anchor pairs
//! before a calibration is fitted. All values are read-only once a pipeline
//! is constructed and are shared across worker threads.

use crate::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};

/// Pipeline-wide parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OverlayParams {
    pub aggregation: AggregationParams,
    pub hull: HullParams,
    pub calibration: CalibrationParams,
    pub consolidation: ConsolidationParams,
}

impl OverlayParams {
    /// Rejects values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let agg = &self.aggregation;
        if !(agg.min_weight.is_finite() && agg.min_weight >= 0.0) {
            return Err(OverlayError::invalid_config("min_weight", agg.min_weight));
        }
        if agg.retention_cap < 4 {
            return Err(OverlayError::invalid_config("retention_cap", agg.retention_cap));
        }
        if !(agg.achromatic_chroma.is_finite() && agg.achromatic_chroma >= 0.0) {
            return Err(OverlayError::invalid_config(
                "achromatic_chroma",
                agg.achromatic_chroma,
            ));
        }
        let hull = &self.hull;
        if hull.peel_layers == 0 {
            return Err(OverlayError::invalid_config("peel_layers", hull.peel_layers));
        }
        if hull.min_interior_points < 4 {
            return Err(OverlayError::invalid_config(
                "min_interior_points",
                hull.min_interior_points,
            ));
        }
        if !(hull.tolerance.is_finite() && hull.tolerance > 0.0) {
            return Err(OverlayError::invalid_config("tolerance", hull.tolerance));
        }
        let cal = &self.calibration;
        if !(cal.significance > 0.0 && cal.significance < 1.0) {
            return Err(OverlayError::invalid_config("significance", cal.significance));
        }
        if cal.min_anchor_pairs < 2 {
            return Err(OverlayError::invalid_config(
                "min_anchor_pairs",
                cal.min_anchor_pairs,
            ));
        }
        let con = &self.consolidation;
        if !(con.confidence_decades.is_finite() && con.confidence_decades > 0.0) {
            return Err(OverlayError::invalid_config(
                "confidence_decades",
                con.confidence_decades,
            ));
        }
        if !(0.0..=1.0).contains(&con.confidence_floor) {
            return Err(OverlayError::invalid_config(
                "confidence_floor",
                con.confidence_floor,
            ));
        }
        if !(con.measured_priority.is_finite() && con.measured_priority >= 1.0) {
            return Err(OverlayError::invalid_config(
                "measured_priority",
                con.measured_priority,
            ));
        }
        Ok(())
    }
}

/// Streaming aggregation parameters.
///
/// - `min_weight`: total weight a category (or one source of it) needs before
///   geometry is attempted.
/// - `retention_cap`: raw points retained per (category, source) for hulls.
/// - `achromatic_chroma`: chroma below which hue is excluded from hue stats.
/// - `seed`: seeds the reservoir keys so runs are reproducible.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregationParams {
    pub min_weight: f64,
    pub retention_cap: usize,
    pub achromatic_chroma: f64,
    pub seed: u64,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            min_weight: 10.0,
            retention_cap: 4096,
            achromatic_chroma: 0.5,
            seed: 0x5eed_c010,
        }
    }
}

/// Hull construction and peeling parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HullParams {
    /// Boundary layers to peel (>=1). `1` is the reference single-layer policy.
    pub peel_layers: usize,
    /// Minimum points the interior must keep for a layer to be peeled (>=4).
    pub min_interior_points: usize,
    /// Relative geometric tolerance used for degeneracy and visibility tests.
    pub tolerance: f64,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            peel_layers: 1,
            min_interior_points: 4,
            tolerance: 1e-9,
        }
    }
}

/// Cross-source calibration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Two-sided significance level for the bias and nested-model tests.
    pub significance: f64,
    /// Anchors required before any correction is fitted.
    pub min_anchor_pairs: usize,
    /// Highest harmonic order offered to model selection (0 = constant only).
    pub max_harmonic_order: usize,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            significance: 0.05,
            min_anchor_pairs: 10,
            max_harmonic_order: 2,
        }
    }
}

/// Multi-source merge weighting.
///
/// A source's confidence is `clamp(log10(total_weight) / confidence_decades,
/// confidence_floor, 1)`; measured points are further scaled by
/// `measured_priority`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsolidationParams {
    pub confidence_decades: f64,
    pub confidence_floor: f64,
    pub measured_priority: f64,
}

impl Default for ConsolidationParams {
    fn default() -> Self {
        Self {
            confidence_decades: 3.0,
            confidence_floor: 0.05,
            measured_priority: 2.0,
        }
    }
}

impl ConsolidationParams {
    pub fn confidence(&self, total_weight: f64) -> f64 {
        if total_weight <= 0.0 {
            return 0.0;
        }
        (total_weight.log10() / self.confidence_decades).clamp(self.confidence_floor, 1.0)
    }
}
