//! Anchor pairs: categories with adequate data in both sources.

use crate::aggregate::{AggregateSet, Category};
use crate::angle::hue_difference;
use crate::error::OverlayError;
use crate::hull::{HullBuilder, Provenance};
use crate::types::{HueValueChroma, Source};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

/// Per-axis difference `crowd - measured` between one anchor's centroids.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorDelta {
    pub name: String,
    pub measured: HueValueChroma,
    pub crowd: HueValueChroma,
    /// Wrapped to [-180, 180). `None` when either centroid is achromatic.
    pub delta_hue: Option<f64>,
    pub delta_value: f64,
    pub delta_chroma: f64,
}

impl AnchorDelta {
    pub fn new(
        name: impl Into<String>,
        measured: HueValueChroma,
        crowd: HueValueChroma,
        achromatic_chroma: f64,
    ) -> Self {
        let chromatic =
            !measured.is_achromatic(achromatic_chroma) && !crowd.is_achromatic(achromatic_chroma);
        Self {
            name: name.into(),
            measured,
            crowd,
            delta_hue: chromatic.then(|| hue_difference(crowd.hue, measured.hue)),
            delta_value: crowd.value - measured.value,
            delta_chroma: crowd.chroma - measured.chroma,
        }
    }

    pub fn is_chromatic(&self) -> bool {
        self.delta_hue.is_some()
    }
}

/// An anchor left out of calibration because a per-source hull failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAnchor {
    pub name: String,
    pub source: Source,
    pub reason: String,
}

/// Builds both per-source hulls of every anchor category and returns the
/// centroid differences in name order, plus the anchors that could not be
/// measured.
pub fn collect_anchors(
    set: &AggregateSet,
    builder: &HullBuilder,
    achromatic_chroma: f64,
) -> (Vec<AnchorDelta>, Vec<SkippedAnchor>) {
    let names = set.anchor_names();
    let results: Vec<Result<AnchorDelta, SkippedAnchor>> = names
        .par_iter()
        .filter_map(|name| set.get(name))
        .map(|category| anchor_delta(category, builder, achromatic_chroma))
        .collect();

    let mut deltas = Vec::new();
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(delta) => deltas.push(delta),
            Err(skip) => {
                debug!(
                    "collect_anchors: skipping '{}' ({}): {}",
                    skip.name,
                    skip.source.label(),
                    skip.reason
                );
                skipped.push(skip);
            }
        }
    }
    debug!(
        "collect_anchors: candidates={} usable={} skipped={}",
        names.len(),
        deltas.len(),
        skipped.len()
    );
    (deltas, skipped)
}

fn anchor_delta(
    category: &Category,
    builder: &HullBuilder,
    achromatic_chroma: f64,
) -> Result<AnchorDelta, SkippedAnchor> {
    let centroid = |source: Source| -> Result<HueValueChroma, SkippedAnchor> {
        let points = category.points(source);
        let provenance = Provenance::single(source, points.len());
        builder
            .build(&points, provenance)
            .map(|outcome| outcome.polyhedron.centroid_hvc)
            .map_err(|err: OverlayError| SkippedAnchor {
                name: category.name().to_string(),
                source,
                reason: err.to_string(),
            })
    };
    let measured = centroid(Source::Measured)?;
    let crowd = centroid(Source::Crowd)?;
    Ok(AnchorDelta::new(
        category.name(),
        measured,
        crowd,
        achromatic_chroma,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_wraps_across_the_seam() {
        let m = HueValueChroma::new(355.0, 5.0, 6.0).unwrap();
        let c = HueValueChroma::new(5.0, 5.5, 7.0).unwrap();
        let d = AnchorDelta::new("red", m, c, 0.5);
        assert!((d.delta_hue.unwrap() - 10.0).abs() < 1e-9);
        assert!((d.delta_value - 0.5).abs() < 1e-12);
        assert!((d.delta_chroma - 1.0).abs() < 1e-12);
    }

    #[test]
    fn achromatic_anchor_has_no_hue_delta() {
        let m = HueValueChroma::new(100.0, 5.0, 0.1).unwrap();
        let c = HueValueChroma::new(200.0, 5.0, 3.0).unwrap();
        let d = AnchorDelta::new("gray", m, c, 0.5);
        assert!(!d.is_chromatic());
    }
}
