//! Core value types: sources, coordinates and samples.

use crate::angle::normalize_hue;
use crate::error::{OverlayError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Maximum value on the lightness axis.
pub const MAX_VALUE: f64 = 10.0;

/// Origin of a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Instrument-measured physical color set (clean, low volume).
    Measured,
    /// Crowdsourced screen-color naming survey (noisy, high volume).
    Crowd,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Measured, Source::Crowd];

    pub fn label(&self) -> &'static str {
        match self {
            Source::Measured => "measured",
            Source::Crowd => "crowd",
        }
    }
}

/// A validated point in hue/value/chroma space.
///
/// Hue is an angle in [0, 360), value lies in [0, 10], chroma is non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueValueChroma {
    pub hue: f64,
    pub value: f64,
    pub chroma: f64,
}

impl HueValueChroma {
    /// Builds a coordinate, normalizing the hue and rejecting out-of-range axes.
    pub fn new(hue: f64, value: f64, chroma: f64) -> Result<Self> {
        if !hue.is_finite() {
            return Err(OverlayError::invalid_sample("hue", hue));
        }
        if !value.is_finite() || !(0.0..=MAX_VALUE).contains(&value) {
            return Err(OverlayError::invalid_sample("value", value));
        }
        if !chroma.is_finite() || chroma < 0.0 {
            return Err(OverlayError::invalid_sample("chroma", chroma));
        }
        Ok(Self {
            hue: normalize_hue(hue),
            value,
            chroma,
        })
    }

    /// Builds a coordinate from possibly out-of-range values by wrapping the
    /// hue and clamping value and chroma. Used after applying corrections.
    pub fn clamped(hue: f64, value: f64, chroma: f64) -> Self {
        Self {
            hue: normalize_hue(hue),
            value: value.clamp(0.0, MAX_VALUE),
            chroma: chroma.max(0.0),
        }
    }

    /// Cartesian projection `(C cos H, C sin H, V)`.
    pub fn to_cartesian(&self) -> Vector3<f64> {
        let (s, c) = self.hue.to_radians().sin_cos();
        Vector3::new(self.chroma * c, self.chroma * s, self.value)
    }

    /// Inverse of [`to_cartesian`](Self::to_cartesian). Points on the neutral
    /// axis get hue 0.
    pub fn from_cartesian(p: &Vector3<f64>) -> Self {
        let chroma = (p.x * p.x + p.y * p.y).sqrt();
        let hue = if chroma > 0.0 {
            normalize_hue(p.y.atan2(p.x).to_degrees())
        } else {
            0.0
        };
        Self::clamped(hue, p.z, chroma)
    }

    /// True when chroma is below `threshold`, i.e. the hue carries no meaning.
    #[inline]
    pub fn is_achromatic(&self, threshold: f64) -> bool {
        self.chroma < threshold
    }
}

/// A single immutable observation in internal coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    name: String,
    source: Source,
    coord: HueValueChroma,
    weight: f64,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        source: Source,
        coord: HueValueChroma,
        weight: f64,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(OverlayError::invalid_sample("name", "<empty>"));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(OverlayError::invalid_sample("weight", weight));
        }
        Ok(Self {
            name,
            source,
            coord,
            weight,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn coord(&self) -> HueValueChroma {
        self.coord
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn point(&self) -> WeightedPoint {
        WeightedPoint {
            coord: self.coord,
            weight: self.weight,
        }
    }
}

/// A coordinate with its (positive) weight, as retained for geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub coord: HueValueChroma,
    pub weight: f64,
}

/// Raw input record before coordinate conversion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleRecord<N> {
    pub name: String,
    pub source: Source,
    pub coordinate: N,
    pub weight: f64,
}
