//! Per-category overlay construction.
//!
//! For every category the engine decides which sources contribute, applies
//! the calibration to crowd points, merges sources under confidence
//! weighting when more than one contributes, and hands the point set to the
//! hull builder. Categories are independent and run on the rayon pool.
//!
//! Measured data has categorical priority: a category with adequate
//! measured weight is built from its measured points alone, so crowd points
//! never reshape an anchor overlay. Sources are merged only when no single
//! source is adequate on its own.

use super::record::{OverlayRecord, OverlayStatus};
use super::weighting::weight_source;
use crate::aggregate::{AggregateSet, Category};
use crate::calibrate::CalibrationModel;
use crate::error::OverlayError;
use crate::hull::{HullBuilder, Provenance};
use crate::params::{ConsolidationParams, OverlayParams};
use crate::types::{Source, WeightedPoint};
use log::debug;
use rayon::prelude::*;

/// Builds final overlays from a finalized aggregate set.
#[derive(Clone, Debug)]
pub struct ConsolidationEngine {
    params: ConsolidationParams,
    builder: HullBuilder,
    min_weight: f64,
}

impl ConsolidationEngine {
    pub fn new(params: &OverlayParams) -> Self {
        Self {
            params: params.consolidation.clone(),
            builder: HullBuilder::new(params.hull.clone()),
            min_weight: params.aggregation.min_weight,
        }
    }

    /// One record per category, in name order.
    pub fn consolidate(&self, set: &AggregateSet, model: &CalibrationModel) -> Vec<OverlayRecord> {
        let categories: Vec<&Category> = set.iter().collect();
        let records: Vec<OverlayRecord> = categories
            .par_iter()
            .map(|category| self.consolidate_category(category, model))
            .collect();
        debug!(
            "ConsolidationEngine::consolidate categories={} ok={}",
            records.len(),
            records
                .iter()
                .filter(|r| r.status == OverlayStatus::Ok)
                .count()
        );
        records
    }

    pub fn consolidate_category(
        &self,
        category: &Category,
        model: &CalibrationModel,
    ) -> OverlayRecord {
        let stats = category.stats(self.min_weight);
        if !category.is_sufficient(self.min_weight) {
            let err = OverlayError::InsufficientSamples {
                name: category.name().to_string(),
                weight: category.total_weight(),
                minimum: self.min_weight,
            };
            debug!("ConsolidationEngine: {err}");
            return OverlayRecord {
                name: category.name().to_string(),
                status: OverlayStatus::InsufficientSamples,
                polyhedron: None,
                degeneracy: None,
                provenance: Provenance::default(),
                stats,
            };
        }

        let sources = self.contributing_sources(category);
        let (points, provenance) = self.gather(category, &sources, model);

        match self.builder.build(&points, provenance.clone()) {
            Ok(outcome) => OverlayRecord {
                name: category.name().to_string(),
                status: outcome.status.into(),
                polyhedron: Some(outcome.polyhedron),
                degeneracy: None,
                provenance,
                stats,
            },
            Err(err) => {
                debug!("ConsolidationEngine: '{}' {err}", category.name());
                let degeneracy = match err {
                    OverlayError::DegenerateGeometry { kind, .. } => Some(kind),
                    _ => None,
                };
                OverlayRecord {
                    name: category.name().to_string(),
                    status: OverlayStatus::DegenerateGeometry,
                    polyhedron: None,
                    degeneracy,
                    provenance,
                    stats,
                }
            }
        }
    }

    /// Adequate measured data wins outright, then adequate crowd data. A
    /// category that is only sufficient in total uses every source it has.
    fn contributing_sources(&self, category: &Category) -> Vec<Source> {
        match Source::ALL
            .into_iter()
            .find(|&s| category.has_adequate(s, self.min_weight))
        {
            Some(source) => vec![source],
            None => category.sources().map(|s| s.source()).collect(),
        }
    }

    fn gather(
        &self,
        category: &Category,
        sources: &[Source],
        model: &CalibrationModel,
    ) -> (Vec<WeightedPoint>, Provenance) {
        let mut provenance = Provenance {
            sources: sources.to_vec(),
            ..Default::default()
        };
        let merged = sources.len() > 1;
        let mut points = Vec::new();
        for &source in sources {
            let mut raw = category.points(source);
            match source {
                Source::Measured => provenance.measured_points = raw.len(),
                Source::Crowd => {
                    provenance.crowd_points = raw.len();
                    if !model.is_identity() {
                        for p in raw.iter_mut() {
                            p.coord = model.apply(&p.coord);
                        }
                        provenance.calibration_applied = true;
                    }
                }
            }
            if merged {
                let total = category
                    .source(source)
                    .map(|s| s.total_weight())
                    .unwrap_or(0.0);
                points.extend(weight_source(&raw, source, total, &self.params));
            } else {
                points.extend(raw);
            }
        }
        (points, provenance)
    }
}
