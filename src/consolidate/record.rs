use crate::aggregate::CategoryStats;
use crate::error::Degeneracy;
use crate::hull::{HullStatus, Polyhedron, Provenance};
use serde::Serialize;

/// Outcome of overlay construction for one category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStatus {
    /// Peeled polyhedron produced.
    Ok,
    /// Total weight below the configured minimum; no geometry attempted.
    InsufficientSamples,
    /// Points do not span a solid; no polyhedron.
    DegenerateGeometry,
    /// Outer hull kept because peeling would leave too little interior.
    UnpeeledInsufficientInterior,
}

impl OverlayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OverlayStatus::Ok => "ok",
            OverlayStatus::InsufficientSamples => "insufficient_samples",
            OverlayStatus::DegenerateGeometry => "degenerate_geometry",
            OverlayStatus::UnpeeledInsufficientInterior => "unpeeled_insufficient_interior",
        }
    }

    pub fn has_polyhedron(&self) -> bool {
        matches!(
            self,
            OverlayStatus::Ok | OverlayStatus::UnpeeledInsufficientInterior
        )
    }
}

impl From<HullStatus> for OverlayStatus {
    fn from(status: HullStatus) -> Self {
        match status {
            HullStatus::Peeled => OverlayStatus::Ok,
            HullStatus::UnpeeledInsufficientInterior => OverlayStatus::UnpeeledInsufficientInterior,
        }
    }
}

/// Final per-category output record.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub name: String,
    pub status: OverlayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyhedron: Option<Polyhedron>,
    /// Set when `status` is `DegenerateGeometry`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degeneracy: Option<Degeneracy>,
    pub provenance: Provenance,
    pub stats: CategoryStats,
}
