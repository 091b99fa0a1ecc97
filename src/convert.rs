//! Seam for the external native-to-internal coordinate conversion.
//!
//! The engine never converts device colors itself. Callers plug in a
//! [`CoordinateConverter`] (for example an sRGB to Munsell renotation lookup)
//! and the aggregator calls it as a black box for every incoming record.

use crate::types::HueValueChroma;
use serde::{Deserialize, Serialize};

/// The native coordinate falls outside the converter's gamut.
#[derive(Clone, Debug, PartialEq)]
pub struct OutOfGamut {
    pub reason: String,
}

impl OutOfGamut {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<OutOfGamut> for crate::error::OverlayError {
    fn from(err: OutOfGamut) -> Self {
        crate::error::OverlayError::OutOfGamut { reason: err.reason }
    }
}

/// Pure conversion from a native coordinate into hue/value/chroma.
pub trait CoordinateConverter: Sync {
    type Native;

    fn convert(&self, native: &Self::Native) -> Result<HueValueChroma, OutOfGamut>;
}

/// Native `[hue, value, chroma]` triple, validated on conversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HvcTriple(pub [f64; 3]);

/// Converter for inputs already expressed in hue/value/chroma.
///
/// Triples that fail validation (value outside [0, 10], negative chroma,
/// non-finite components) are reported as out of gamut.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl CoordinateConverter for PassThrough {
    type Native = HvcTriple;

    fn convert(&self, native: &HvcTriple) -> Result<HueValueChroma, OutOfGamut> {
        let [h, v, c] = native.0;
        HueValueChroma::new(h, v, c).map_err(|e| OutOfGamut::new(e.to_string()))
    }
}
