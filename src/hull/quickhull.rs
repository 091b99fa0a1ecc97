//! Incremental 3D convex hull.
//!
//! The hull starts from the largest non-degenerate tetrahedron found by
//! extreme-point search, then inserts the remaining points one at a time:
//! faces visible from a point are removed and the horizon is re-closed with
//! new faces fanning out to the point. Points within `tolerance × extent` of
//! the current surface are treated as on or inside the hull, so near-duplicate
//! points never become vertices.

use crate::error::Degeneracy;
use nalgebra::Vector3;
use std::collections::HashSet;

/// Convex hull over a borrowed point slice.
#[derive(Clone, Debug)]
pub struct ConvexHull {
    /// Input indices of hull vertices, ascending.
    pub vertices: Vec<usize>,
    /// Outward-oriented triangles as input indices.
    pub faces: Vec<[usize; 3]>,
    pub volume: f64,
}

#[derive(Clone, Debug)]
struct Face {
    v: [usize; 3],
    normal: Vector3<f64>,
    alive: bool,
}

impl Face {
    fn new(v: [usize; 3], points: &[Vector3<f64>]) -> Self {
        let [a, b, c] = v;
        let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
        let norm = n.norm();
        let normal = if norm > 0.0 { n / norm } else { n };
        Self {
            v,
            normal,
            alive: true,
        }
    }

    fn signed_distance(&self, p: &Vector3<f64>, points: &[Vector3<f64>]) -> f64 {
        self.normal.dot(&(p - points[self.v[0]]))
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// Largest axis extent of the point cloud's bounding box.
pub fn extent(points: &[Vector3<f64>]) -> f64 {
    let mut lo = Vector3::repeat(f64::INFINITY);
    let mut hi = Vector3::repeat(f64::NEG_INFINITY);
    for p in points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    if points.is_empty() {
        0.0
    } else {
        (hi - lo).max()
    }
}

fn initial_simplex(points: &[Vector3<f64>], eps: f64) -> Result<[usize; 4], Degeneracy> {
    let i0 = (0..points.len())
        .min_by(|&a, &b| {
            points[a]
                .x
                .partial_cmp(&points[b].x)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or(Degeneracy::TooFewPoints)?;
    let p0 = points[i0];

    let (i1, d1) = farthest(points, |p| (p - p0).norm());
    if d1 <= eps {
        return Err(Degeneracy::Coincident);
    }
    let dir = (points[i1] - p0) / d1;

    let (i2, d2) = farthest(points, |p| (p - p0).cross(&dir).norm());
    if d2 <= eps {
        return Err(Degeneracy::Collinear);
    }
    let n = (points[i1] - p0).cross(&(points[i2] - p0));
    let n = n / n.norm();

    let (i3, d3) = farthest(points, |p| n.dot(&(p - p0)).abs());
    if d3 <= eps {
        return Err(Degeneracy::Coplanar);
    }
    Ok([i0, i1, i2, i3])
}

fn farthest<F>(points: &[Vector3<f64>], metric: F) -> (usize, f64)
where
    F: Fn(&Vector3<f64>) -> f64,
{
    let mut best = (0usize, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let d = metric(p);
        if d > best.1 {
            best = (i, d);
        }
    }
    best
}

/// Computes the convex hull of `points`.
///
/// Returns the kind of degeneracy when the points do not span a solid:
/// fewer than four points, or all points coincident, collinear or coplanar
/// within `tolerance` relative to the cloud extent.
pub fn convex_hull(points: &[Vector3<f64>], tolerance: f64) -> Result<ConvexHull, Degeneracy> {
    if points.len() < 4 {
        return Err(Degeneracy::TooFewPoints);
    }
    let scale = extent(points);
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Degeneracy::Coincident);
    }
    let eps = tolerance * scale;
    let simplex = initial_simplex(points, eps)?;
    let interior = simplex
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + points[i])
        / 4.0;

    let mut faces: Vec<Face> = Vec::new();
    for tri in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
        let mut v = [simplex[tri[0]], simplex[tri[1]], simplex[tri[2]]];
        let face = Face::new(v, points);
        if face.signed_distance(&interior, points) > 0.0 {
            v.swap(1, 2);
        }
        faces.push(Face::new(v, points));
    }

    for (idx, p) in points.iter().enumerate() {
        if simplex.contains(&idx) {
            continue;
        }
        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.signed_distance(p, points) > eps)
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let mut visible_edges: HashSet<(usize, usize)> = HashSet::new();
        for &fi in &visible {
            for e in faces[fi].edges() {
                visible_edges.insert(e);
            }
        }
        let mut horizon: Vec<(usize, usize)> = Vec::new();
        for &fi in &visible {
            for (a, b) in faces[fi].edges() {
                if !visible_edges.contains(&(b, a)) {
                    horizon.push((a, b));
                }
            }
            faces[fi].alive = false;
        }
        faces.retain(|f| f.alive);
        for (a, b) in horizon {
            faces.push(Face::new([a, b, idx], points));
        }
    }

    let mut vertex_set: Vec<usize> = faces.iter().flat_map(|f| f.v).collect();
    vertex_set.sort_unstable();
    vertex_set.dedup();

    let volume = faces
        .iter()
        .map(|f| {
            let [a, b, c] = f.v;
            (points[a] - interior).dot(&(points[b] - interior).cross(&(points[c] - interior)))
        })
        .sum::<f64>()
        .abs()
        / 6.0;

    Ok(ConvexHull {
        vertices: vertex_set,
        faces: faces.into_iter().map(|f| f.v).collect(),
        volume,
    })
}
