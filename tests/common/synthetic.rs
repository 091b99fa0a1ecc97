use color_overlays::convert::HvcTriple;
use color_overlays::types::{HueValueChroma, SampleRecord, Source, WeightedPoint};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Orthonormal frame at `center`: radial chroma direction, tangential hue
/// direction, value axis.
fn frame(center: &HueValueChroma) -> [Vector3<f64>; 3] {
    let (s, c) = center.hue.to_radians().sin_cos();
    [
        Vector3::new(c, s, 0.0),
        Vector3::new(-s, c, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ]
}

/// Points uniform inside an ellipsoid around `center`, with semi-axes
/// `radii` along the radial, tangential and value directions.
pub fn ellipsoid(
    rng: &mut StdRng,
    center: HueValueChroma,
    radii: [f64; 3],
    n: usize,
) -> Vec<HueValueChroma> {
    let origin = center.to_cartesian();
    let axes = frame(&center);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let u: [f64; 3] = [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ];
        if u.iter().map(|x| x * x).sum::<f64>() > 1.0 {
            continue;
        }
        let p = origin
            + axes[0] * (u[0] * radii[0])
            + axes[1] * (u[1] * radii[1])
            + axes[2] * (u[2] * radii[2]);
        out.push(HueValueChroma::from_cartesian(&p));
    }
    out
}

/// Like [`ellipsoid`], but every point is paired with its reflection through
/// `center`, so any peeled hull of the cloud is centred on `center`.
pub fn mirrored_ellipsoid(
    rng: &mut StdRng,
    center: HueValueChroma,
    radii: [f64; 3],
    pairs: usize,
) -> Vec<HueValueChroma> {
    let origin = center.to_cartesian();
    let axes = frame(&center);
    let mut out = Vec::with_capacity(2 * pairs);
    while out.len() < 2 * pairs {
        let u: [f64; 3] = [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ];
        if u.iter().map(|x| x * x).sum::<f64>() > 1.0 {
            continue;
        }
        let d = axes[0] * (u[0] * radii[0])
            + axes[1] * (u[1] * radii[1])
            + axes[2] * (u[2] * radii[2]);
        out.push(HueValueChroma::from_cartesian(&(origin + d)));
        out.push(HueValueChroma::from_cartesian(&(origin - d)));
    }
    out
}

/// Points on a sphere of `radius` around `center`, restricted to the
/// outward (higher chroma) hemisphere and to `|dz| <= max_dz`.
pub fn outward_shell(
    rng: &mut StdRng,
    center: HueValueChroma,
    radius: f64,
    max_dz: f64,
    n: usize,
) -> Vec<HueValueChroma> {
    let origin = center.to_cartesian();
    let axes = frame(&center);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let d: Vector3<f64> = Vector3::new(
            rng.gen_range(0.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let norm = d.norm();
        if norm < 1e-3 || norm > 1.0 {
            continue;
        }
        let d = d / norm;
        if d.z.abs() > max_dz {
            continue;
        }
        let p = origin + (axes[0] * d.x + axes[1] * d.y + axes[2] * d.z) * radius;
        out.push(HueValueChroma::from_cartesian(&p));
    }
    out
}

/// Rigid rotation of every point's hue by `deg`.
pub fn shift_hue(points: &[HueValueChroma], deg: f64) -> Vec<HueValueChroma> {
    points
        .iter()
        .map(|p| HueValueChroma::clamped(p.hue + deg, p.value, p.chroma))
        .collect()
}

pub fn weighted(points: &[HueValueChroma], weight: f64) -> Vec<WeightedPoint> {
    points
        .iter()
        .map(|&coord| WeightedPoint { coord, weight })
        .collect()
}

pub fn records(
    name: &str,
    source: Source,
    points: &[HueValueChroma],
    weight: f64,
) -> Vec<SampleRecord<HvcTriple>> {
    points
        .iter()
        .map(|p| SampleRecord {
            name: name.to_string(),
            source,
            coordinate: HvcTriple([p.hue, p.value, p.chroma]),
            weight,
        })
        .collect()
}

pub fn cartesian_mean(points: &[HueValueChroma]) -> Vector3<f64> {
    points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.to_cartesian())
        / points.len() as f64
}
