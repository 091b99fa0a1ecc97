//! Outlier-robust hull construction by boundary peeling.
//!
//! The builder works in a local frame where the category's mean hue is
//! rotated onto the +x axis, so hue offsets around the mean are contiguous
//! regardless of where the category sits relative to the 0/360 seam. It
//! computes the outer hull, removes every point on its surface (the vertices
//! and anything lying on a face), and rebuilds the hull of what remains.
//! Peeling repeats up to `peel_layers` times and stops early as soon as the
//! interior would fall below the minimum or would no longer span a solid.

use super::polyhedron::{PeelLayer, Polyhedron, Provenance};
use super::quickhull::{convex_hull, extent, ConvexHull};
use crate::angle::rotate_xy;
use crate::error::{OverlayError, Result};
use crate::params::HullParams;
use crate::types::{HueValueChroma, WeightedPoint};
use log::debug;
use nalgebra::Vector3;
use serde::Serialize;

/// How the final hull relates to the outer hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HullStatus {
    /// At least one boundary layer was peeled.
    Peeled,
    /// Peeling would leave too small or flat an interior; the outer hull is kept.
    UnpeeledInsufficientInterior,
}

/// Result of a successful hull build.
#[derive(Clone, Debug)]
pub struct HullOutcome {
    pub status: HullStatus,
    pub polyhedron: Polyhedron,
}

/// Builds peeled hulls from weighted point sets.
#[derive(Clone, Debug)]
pub struct HullBuilder {
    params: HullParams,
}

impl HullBuilder {
    pub fn new(params: HullParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HullParams {
        &self.params
    }

    /// Builds the robust polyhedron of `points`.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` when the full point set has fewer than four points
    /// or is coincident, collinear or coplanar.
    pub fn build(&self, points: &[WeightedPoint], provenance: Provenance) -> Result<HullOutcome> {
        let reference = reference_hue(points);
        let local: Vec<Vector3<f64>> = points
            .iter()
            .map(|p| {
                let c = p.coord.to_cartesian();
                let (x, y) = rotate_xy(c.x, c.y, -reference);
                Vector3::new(x, y, c.z)
            })
            .collect();

        let eps = self.params.tolerance * extent(&local);
        let mut working: Vec<usize> = (0..points.len()).collect();
        let mut hull = hull_of(&local, &working, self.params.tolerance)?;
        let mut layers: Vec<PeelLayer> = Vec::new();

        while layers.len() < self.params.peel_layers {
            let inner = interior_of(&local, &working, &hull, eps);
            if inner.len() < self.params.min_interior_points {
                debug!(
                    "HullBuilder: stop peeling at layer {} (interior {} < {})",
                    layers.len() + 1,
                    inner.len(),
                    self.params.min_interior_points
                );
                break;
            }
            match hull_of(&local, &inner, self.params.tolerance) {
                Ok(inner_hull) => {
                    layers.push(PeelLayer {
                        layer: layers.len() + 1,
                        points_before: working.len(),
                        points_removed: working.len() - inner.len(),
                        points_after: inner.len(),
                    });
                    working = inner;
                    hull = inner_hull;
                }
                Err(err) => {
                    debug!(
                        "HullBuilder: stop peeling at layer {}: interior is {err}",
                        layers.len() + 1
                    );
                    break;
                }
            }
        }

        let status = if layers.is_empty() {
            HullStatus::UnpeeledInsufficientInterior
        } else {
            HullStatus::Peeled
        };
        let polyhedron =
            assemble(points, &local, &working, &hull, reference, layers, provenance);
        Ok(HullOutcome { status, polyhedron })
    }
}

/// Chroma-weighted circular mean hue, the direction of the summed chromatic
/// vectors. Neutral points contribute nothing.
fn reference_hue(points: &[WeightedPoint]) -> f64 {
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for p in points {
        let c = p.coord.to_cartesian();
        sx += p.weight * c.x;
        sy += p.weight * c.y;
    }
    if sx.hypot(sy) <= f64::EPSILON {
        0.0
    } else {
        sy.atan2(sx).to_degrees()
    }
}

/// Hull over a subset; returned indices refer to positions in `subset`.
fn hull_of(local: &[Vector3<f64>], subset: &[usize], tolerance: f64) -> Result<ConvexHull> {
    let pts: Vec<Vector3<f64>> = subset.iter().map(|&i| local[i]).collect();
    convex_hull(&pts, tolerance).map_err(|kind| OverlayError::DegenerateGeometry {
        kind,
        points: pts.len(),
    })
}

/// Points of `working` strictly inside `hull`. Vertices, their duplicates
/// and points lying on a face within `eps` form the boundary layer.
fn interior_of(
    local: &[Vector3<f64>],
    working: &[usize],
    hull: &ConvexHull,
    eps: f64,
) -> Vec<usize> {
    let planes: Vec<(Vector3<f64>, Vector3<f64>)> = hull
        .faces
        .iter()
        .filter_map(|f| {
            let a = local[working[f[0]]];
            let n = (local[working[f[1]]] - a).cross(&(local[working[f[2]]] - a));
            let norm = n.norm();
            (norm > 0.0).then(|| (n / norm, a))
        })
        .collect();
    working
        .iter()
        .copied()
        .filter(|&i| planes.iter().all(|(n, a)| n.dot(&(local[i] - a)) < -eps))
        .collect()
}

fn assemble(
    points: &[WeightedPoint],
    local: &[Vector3<f64>],
    working: &[usize],
    hull: &ConvexHull,
    reference: f64,
    peel_layers: Vec<PeelLayer>,
    provenance: Provenance,
) -> Polyhedron {
    let to_global = |p: &Vector3<f64>| {
        let (x, y) = rotate_xy(p.x, p.y, reference);
        Vector3::new(x, y, p.z)
    };

    let vertices: Vec<Vector3<f64>> = hull
        .vertices
        .iter()
        .map(|&i| to_global(&local[working[i]]))
        .collect();
    let faces: Vec<[usize; 3]> = hull
        .faces
        .iter()
        .map(|f| {
            // face indices are always hull vertices, so the search hits
            f.map(|i| hull.vertices.binary_search(&i).unwrap_or_else(|pos| pos))
        })
        .collect();

    let mut sum = Vector3::zeros();
    let mut total_w = 0.0;
    for &i in working {
        sum += points[i].coord.to_cartesian() * points[i].weight;
        total_w += points[i].weight;
    }
    let centroid = if total_w > 0.0 {
        sum / total_w
    } else {
        working
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + to_global(&local[i]))
            / working.len() as f64
    };

    Polyhedron {
        vertex_count: vertices.len(),
        vertices,
        faces,
        centroid,
        centroid_hvc: HueValueChroma::from_cartesian(&centroid),
        volume: hull.volume,
        point_count: working.len(),
        peel_layers,
        provenance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Degeneracy;
    use crate::types::Source;

    fn wp(h: f64, v: f64, c: f64) -> WeightedPoint {
        WeightedPoint {
            coord: HueValueChroma::new(h, v, c).unwrap(),
            weight: 1.0,
        }
    }

    fn builder(layers: usize) -> HullBuilder {
        HullBuilder::new(HullParams {
            peel_layers: layers,
            ..Default::default()
        })
    }

    /// Lattice of points in a box around hue 0, straddling the seam.
    fn seam_box() -> Vec<WeightedPoint> {
        let mut pts = Vec::new();
        for h in [-10.0, -5.0, 0.0, 5.0, 10.0] {
            for v in [3.0, 4.0, 5.0, 6.0, 7.0] {
                for c in [4.0, 6.0, 8.0, 10.0, 12.0] {
                    pts.push(wp(h, v, c));
                }
            }
        }
        pts
    }

    #[test]
    fn three_points_are_degenerate() {
        let pts = vec![wp(0.0, 5.0, 4.0), wp(10.0, 5.0, 4.0), wp(20.0, 6.0, 4.0)];
        let err = builder(1).build(&pts, Provenance::default()).unwrap_err();
        assert!(matches!(
            err,
            OverlayError::DegenerateGeometry {
                kind: Degeneracy::TooFewPoints,
                ..
            }
        ));
    }

    #[test]
    fn coplanar_points_are_degenerate() {
        // Same value: every point lies in the plane z = 5.
        let pts = vec![
            wp(0.0, 5.0, 4.0),
            wp(90.0, 5.0, 4.0),
            wp(180.0, 5.0, 4.0),
            wp(270.0, 5.0, 2.0),
            wp(45.0, 5.0, 1.0),
        ];
        let err = builder(1).build(&pts, Provenance::default()).unwrap_err();
        assert!(matches!(
            err,
            OverlayError::DegenerateGeometry {
                kind: Degeneracy::Coplanar,
                ..
            }
        ));
    }

    #[test]
    fn tetrahedron_keeps_outer_hull() {
        let pts = vec![
            wp(0.0, 4.0, 4.0),
            wp(40.0, 4.0, 4.0),
            wp(20.0, 4.0, 8.0),
            wp(20.0, 7.0, 6.0),
        ];
        let outcome = builder(1)
            .build(&pts, Provenance::single(Source::Measured, 4))
            .unwrap();
        assert_eq!(outcome.status, HullStatus::UnpeeledInsufficientInterior);
        assert_eq!(outcome.polyhedron.vertex_count, 4);
        assert_eq!(outcome.polyhedron.point_count, 4);
        assert!(outcome.polyhedron.volume > 0.0);
        assert!(outcome.polyhedron.peel_layers.is_empty());
    }

    #[test]
    fn seam_box_peels_one_layer() {
        let pts = seam_box();
        let outcome = builder(1).build(&pts, Provenance::default()).unwrap();
        assert_eq!(outcome.status, HullStatus::Peeled);
        let poly = &outcome.polyhedron;
        assert_eq!(poly.peel_layers.len(), 1);
        assert!(poly.point_count < pts.len());
        let h = poly.centroid_hvc.hue;
        assert!(h < 1.0 || h > 359.0, "centroid hue {h} should sit on the seam");
        assert!((poly.centroid_hvc.value - 5.0).abs() < 1e-6);
        for v in &poly.vertices {
            let hvc = HueValueChroma::from_cartesian(v);
            assert!(hvc.value >= 3.0 - 1e-9 && hvc.value <= 7.0 + 1e-9);
            assert!(hvc.chroma <= 12.0 + 1e-9);
        }
    }

    #[test]
    fn multi_layer_peeling_stops_at_minimum() {
        // 7x7x7 lattice in hue/value/chroma: at least two shells peel before
        // the interior runs out, well short of the 50 layers allowed
        let mut pts = Vec::new();
        for i in 0..7 {
            for j in 0..7 {
                for k in 0..7 {
                    pts.push(wp(-15.0 + 5.0 * i as f64, 2.0 + j as f64, 4.0 + 1.5 * k as f64));
                }
            }
        }
        let outcome = builder(50).build(&pts, Provenance::default()).unwrap();
        let poly = &outcome.polyhedron;
        assert_eq!(outcome.status, HullStatus::Peeled);
        let layers = poly.peel_layers.len();
        assert!((2..50).contains(&layers), "layers={layers}");
        for pair in poly.peel_layers.windows(2) {
            assert_eq!(pair[0].points_after, pair[1].points_before);
        }
        let last = poly.peel_layers[layers - 1];
        assert_eq!(poly.point_count, last.points_after);
        assert!(poly.point_count >= 4);
        assert!(last.points_removed > 0);
    }

    #[test]
    fn polyhedron_contains_its_centroid() {
        let pts = seam_box();
        let outcome = builder(1).build(&pts, Provenance::default()).unwrap();
        let poly = &outcome.polyhedron;
        assert!(poly.contains(&poly.centroid_hvc));
        assert!(!poly.contains(&HueValueChroma::new(180.0, 5.0, 8.0).unwrap()));
    }
}
