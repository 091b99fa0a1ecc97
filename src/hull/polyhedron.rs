use crate::types::{HueValueChroma, Source};
use nalgebra::Vector3;
use serde::Serialize;

/// Which data went into a polyhedron.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub sources: Vec<Source>,
    pub measured_points: usize,
    pub crowd_points: usize,
    /// True when a non-identity calibration moved the crowd points.
    pub calibration_applied: bool,
}

impl Provenance {
    pub fn single(source: Source, points: usize) -> Self {
        let mut p = Provenance {
            sources: vec![source],
            ..Default::default()
        };
        match source {
            Source::Measured => p.measured_points = points,
            Source::Crowd => p.crowd_points = points,
        }
        p
    }
}

/// One boundary layer removed by peeling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeelLayer {
    pub layer: usize,
    pub points_before: usize,
    pub points_removed: usize,
    pub points_after: usize,
}

/// Convex region of one category in Cartesian `(C cos H, C sin H, V)` space.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyhedron {
    /// Hull vertices, at least four and not coplanar.
    pub vertices: Vec<Vector3<f64>>,
    /// Outward-oriented triangles indexing `vertices`.
    pub faces: Vec<[usize; 3]>,
    /// Weighted mean of the retained interior point set.
    pub centroid: Vector3<f64>,
    pub centroid_hvc: HueValueChroma,
    pub volume: f64,
    pub vertex_count: usize,
    /// Points in the retained interior set the hull was built from.
    pub point_count: usize,
    pub peel_layers: Vec<PeelLayer>,
    pub provenance: Provenance,
}

impl Polyhedron {
    /// Point-in-polyhedron test; points on the boundary count as inside.
    pub fn contains(&self, coord: &HueValueChroma) -> bool {
        self.contains_point(&coord.to_cartesian())
    }

    pub fn contains_point(&self, p: &Vector3<f64>) -> bool {
        let scale = self
            .vertices
            .iter()
            .map(|v| v.amax())
            .fold(1.0f64, f64::max);
        let eps = 1e-9 * scale;
        self.faces.iter().all(|f| {
            let a = self.vertices[f[0]];
            let n = (self.vertices[f[1]] - a).cross(&(self.vertices[f[2]] - a));
            let norm = n.norm();
            norm <= 0.0 || n.dot(&(p - a)) / norm <= eps
        })
    }
}
