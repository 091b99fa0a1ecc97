//! Fits the cross-source correction from anchor pairs.
//!
//! Each axis is handled independently:
//! 1. A one-sample t-test on the anchor differences decides whether the axis
//!    carries a systematic bias. Axes that do not reject the zero-bias null
//!    stay on the identity.
//! 2. Systematic axes walk the complexity ladder (constant, then harmonics in
//!    crowd hue) and keep the simplest model whose extensions were each
//!    justified by a nested F-test.
//!
//! The hue axis uses chromatic anchors only. Harmonic candidates are offered
//! on an axis only when every anchor on it has a meaningful hue.

use super::anchors::{collect_anchors, AnchorDelta, SkippedAnchor};
use super::bias::one_sample_t_test;
use super::model::{Axis, AxisCalibration, CalibrationModel, CalibrationStatus, CorrectionModel};
use super::selection::{select_model, ModelClass};
use crate::aggregate::AggregateSet;
use crate::error::OverlayError;
use crate::hull::HullBuilder;
use crate::params::{CalibrationParams, OverlayParams};
use log::{debug, warn};

/// Cross-source calibrator bound to a fixed parameter set.
#[derive(Clone, Debug)]
pub struct Calibrator {
    params: CalibrationParams,
    builder: HullBuilder,
    achromatic_chroma: f64,
}

impl Calibrator {
    pub fn new(params: &OverlayParams) -> Self {
        Self {
            params: params.calibration.clone(),
            builder: HullBuilder::new(params.hull.clone()),
            achromatic_chroma: params.aggregation.achromatic_chroma,
        }
    }

    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    /// Fits the correction on the anchors of a finalized aggregate set.
    pub fn fit(&self, set: &AggregateSet) -> CalibrationModel {
        let (deltas, skipped) = collect_anchors(set, &self.builder, self.achromatic_chroma);
        self.fit_deltas(deltas, skipped)
    }

    /// Fits the correction from precomputed anchor differences.
    pub fn fit_deltas(
        &self,
        anchors: Vec<AnchorDelta>,
        skipped: Vec<SkippedAnchor>,
    ) -> CalibrationModel {
        let required = self.params.min_anchor_pairs;
        if anchors.len() < required {
            let err = OverlayError::UncalibratedAnchors {
                found: anchors.len(),
                required,
            };
            warn!("Calibrator: {err}; using identity calibration");
            return CalibrationModel::uncalibrated(
                anchors.len(),
                required,
                self.achromatic_chroma,
                anchors,
                skipped,
            );
        }

        let chromatic: Vec<&AnchorDelta> = anchors.iter().filter(|a| a.is_chromatic()).collect();
        let all_chromatic = chromatic.len() == anchors.len();

        let hue = self.fit_axis(
            Axis::Hue,
            &chromatic.iter().map(|a| a.crowd.hue).collect::<Vec<_>>(),
            &chromatic
                .iter()
                .filter_map(|a| a.delta_hue)
                .collect::<Vec<_>>(),
            true,
        );
        let crowd_hues: Vec<f64> = anchors.iter().map(|a| a.crowd.hue).collect();
        let value = self.fit_axis(
            Axis::Value,
            &crowd_hues,
            &anchors.iter().map(|a| a.delta_value).collect::<Vec<_>>(),
            all_chromatic,
        );
        let chroma = self.fit_axis(
            Axis::Chroma,
            &crowd_hues,
            &anchors.iter().map(|a| a.delta_chroma).collect::<Vec<_>>(),
            all_chromatic,
        );

        debug!(
            "Calibrator::fit anchors={} chromatic={} hue={:?} value={:?} chroma={:?}",
            anchors.len(),
            chromatic.len(),
            hue.model,
            value.model,
            chroma.model
        );
        CalibrationModel {
            status: CalibrationStatus::Calibrated,
            hue,
            value,
            chroma,
            achromatic_chroma: self.achromatic_chroma,
            anchors,
            skipped,
        }
    }

    fn fit_axis(
        &self,
        axis: Axis,
        hues: &[f64],
        deltas: &[f64],
        allow_harmonics: bool,
    ) -> AxisCalibration {
        let mut result = AxisCalibration::identity(axis);
        result.anchors_used = deltas.len();
        result.bias_test = one_sample_t_test(deltas, self.params.significance);
        let Some(test) = result.bias_test else {
            debug!("Calibrator: {} axis has too few anchors to test", axis.label());
            return result;
        };
        if !test.systematic {
            debug!(
                "Calibrator: {} bias {:.4} not systematic (p={:.4})",
                axis.label(),
                test.mean,
                test.p_value
            );
            return result;
        }

        let max_order = if allow_harmonics {
            self.params.max_harmonic_order
        } else {
            0
        };
        let candidates = ModelClass::ladder(max_order);
        let Some(selection) = select_model(&candidates, hues, deltas, self.params.significance)
        else {
            // a constant fit needs only one anchor, so this means empty input
            return result;
        };
        for rejected in &selection.rejected {
            debug!(
                "Calibrator: {} {:?} rejected (p={:?})",
                axis.label(),
                rejected.class,
                rejected.p_value
            );
        }
        result.model = CorrectionModel::from_fit(&selection.chosen);
        result.rejected = selection.rejected;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HueValueChroma;

    fn anchors(offset: f64, noise: &[f64]) -> Vec<AnchorDelta> {
        noise
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let h = i as f64 * 360.0 / noise.len() as f64;
                let m = HueValueChroma::new(h, 5.0, 8.0).unwrap();
                let c = HueValueChroma::new(h + offset + n, 5.0, 8.0).unwrap();
                AnchorDelta::new(format!("a{i}"), m, c, 0.5)
            })
            .collect()
    }

    fn calibrator(min_anchor_pairs: usize) -> Calibrator {
        let mut params = OverlayParams::default();
        params.calibration.min_anchor_pairs = min_anchor_pairs;
        Calibrator::new(&params)
    }

    #[test]
    fn too_few_anchors_is_uncalibrated() {
        let model = calibrator(10).fit_deltas(anchors(15.0, &[0.0; 4]), Vec::new());
        assert_eq!(
            model.status,
            CalibrationStatus::Uncalibrated {
                found: 4,
                required: 10
            }
        );
        assert!(model.is_identity());
        assert_eq!(model.anchors.len(), 4);
    }

    #[test]
    fn constant_offset_is_recovered() {
        let model = calibrator(10).fit_deltas(anchors(15.0, &[0.0; 12]), Vec::new());
        assert!(model.is_calibrated());
        assert!(model.hue.is_systematic());
        match model.hue.model {
            CorrectionModel::Constant { offset } => assert!((offset - 15.0).abs() < 1e-6),
            ref other => panic!("expected constant model, got {other:?}"),
        }
        assert_eq!(model.hue.rejected.len(), 1);
        assert!(model.value.model.is_identity());
        assert!(model.chroma.model.is_identity());
    }

    #[test]
    fn hue_axis_ignores_achromatic_anchors() {
        let mut deltas = anchors(15.0, &[0.0; 10]);
        let m = HueValueChroma::new(0.0, 9.0, 0.1).unwrap();
        deltas.push(AnchorDelta::new("white", m, m, 0.5));
        let model = calibrator(10).fit_deltas(deltas, Vec::new());
        assert_eq!(model.hue.anchors_used, 10);
        assert_eq!(model.value.anchors_used, 11);
    }
}
