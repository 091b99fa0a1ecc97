use super::anchors::{AnchorDelta, SkippedAnchor};
use super::bias::BiasTest;
use super::selection::{CandidateFit, ModelClass, RejectedModel};
use crate::types::HueValueChroma;
use serde::Serialize;

/// Coordinate axis a correction acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Hue,
    Value,
    Chroma,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Hue, Axis::Value, Axis::Chroma];

    pub fn label(&self) -> &'static str {
        match self {
            Axis::Hue => "hue",
            Axis::Value => "value",
            Axis::Chroma => "chroma",
        }
    }
}

/// Bias of the crowd source relative to the measured source on one axis, as
/// a function of the crowd hue.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CorrectionModel {
    Identity,
    Constant {
        offset: f64,
    },
    Harmonic {
        order: usize,
        /// `[a0, b1, c1, ..., bk, ck]`
        coefficients: Vec<f64>,
    },
}

impl CorrectionModel {
    pub(crate) fn from_fit(fit: &CandidateFit) -> Self {
        match fit.class {
            ModelClass::Constant => CorrectionModel::Constant {
                offset: fit.coefficients.first().copied().unwrap_or(0.0),
            },
            ModelClass::Harmonic(order) => CorrectionModel::Harmonic {
                order,
                coefficients: fit.coefficients.clone(),
            },
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, CorrectionModel::Identity)
    }

    /// Estimated bias at `hue`. Without a meaningful hue (achromatic points)
    /// a harmonic model contributes its intercept only.
    pub fn bias_at(&self, hue: Option<f64>) -> f64 {
        match self {
            CorrectionModel::Identity => 0.0,
            CorrectionModel::Constant { offset } => *offset,
            CorrectionModel::Harmonic {
                order,
                coefficients,
            } => {
                let intercept = coefficients.first().copied().unwrap_or(0.0);
                let Some(hue) = hue else {
                    return intercept;
                };
                let h = hue.to_radians();
                let mut sum = intercept;
                for j in 1..=*order {
                    let (s, c) = (j as f64 * h).sin_cos();
                    let b = coefficients.get(2 * j - 1).copied().unwrap_or(0.0);
                    let a = coefficients.get(2 * j).copied().unwrap_or(0.0);
                    sum += b * c + a * s;
                }
                sum
            }
        }
    }
}

/// Outcome of calibrating one axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisCalibration {
    pub axis: Axis,
    /// `None` when fewer than two anchors were usable on this axis.
    pub bias_test: Option<BiasTest>,
    pub model: CorrectionModel,
    /// Higher-order candidates that failed their significance test.
    pub rejected: Vec<RejectedModel>,
    pub anchors_used: usize,
}

impl AxisCalibration {
    pub fn identity(axis: Axis) -> Self {
        Self {
            axis,
            bias_test: None,
            model: CorrectionModel::Identity,
            rejected: Vec::new(),
            anchors_used: 0,
        }
    }

    pub fn is_systematic(&self) -> bool {
        self.bias_test.map(|t| t.systematic).unwrap_or(false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum CalibrationStatus {
    Calibrated,
    /// Too few anchor pairs; every axis is the identity.
    Uncalibrated { found: usize, required: usize },
}

/// Immutable correction from crowd coordinates to measured-equivalent
/// coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationModel {
    pub status: CalibrationStatus,
    pub hue: AxisCalibration,
    pub value: AxisCalibration,
    pub chroma: AxisCalibration,
    /// Chroma below which a point's hue is left untouched.
    pub achromatic_chroma: f64,
    pub anchors: Vec<AnchorDelta>,
    pub skipped: Vec<SkippedAnchor>,
}

impl CalibrationModel {
    /// Identity on every axis, flagged as calibrated.
    pub fn identity(achromatic_chroma: f64) -> Self {
        Self {
            status: CalibrationStatus::Calibrated,
            hue: AxisCalibration::identity(Axis::Hue),
            value: AxisCalibration::identity(Axis::Value),
            chroma: AxisCalibration::identity(Axis::Chroma),
            achromatic_chroma,
            anchors: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn uncalibrated(
        found: usize,
        required: usize,
        achromatic_chroma: f64,
        anchors: Vec<AnchorDelta>,
        skipped: Vec<SkippedAnchor>,
    ) -> Self {
        Self {
            status: CalibrationStatus::Uncalibrated { found, required },
            anchors,
            skipped,
            ..Self::identity(achromatic_chroma)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.axes().iter().all(|a| a.model.is_identity())
    }

    pub fn is_calibrated(&self) -> bool {
        self.status == CalibrationStatus::Calibrated
    }

    pub fn axes(&self) -> [&AxisCalibration; 3] {
        [&self.hue, &self.value, &self.chroma]
    }

    pub fn axis(&self, axis: Axis) -> &AxisCalibration {
        match axis {
            Axis::Hue => &self.hue,
            Axis::Value => &self.value,
            Axis::Chroma => &self.chroma,
        }
    }

    /// Maps a crowd coordinate to its corrected coordinate. Hue wraps, value
    /// clamps to its range and chroma stays non-negative. Achromatic points
    /// keep their hue.
    pub fn apply(&self, coord: &HueValueChroma) -> HueValueChroma {
        if self.is_identity() {
            return *coord;
        }
        let hue = (!coord.is_achromatic(self.achromatic_chroma)).then_some(coord.hue);
        let corrected_hue = match hue {
            Some(h) => h - self.hue.model.bias_at(Some(h)),
            None => coord.hue,
        };
        HueValueChroma::clamped(
            corrected_hue,
            coord.value - self.value.model.bias_at(hue),
            coord.chroma - self.chroma.model.bias_at(hue),
        )
    }
}
