//! Paired bias test across anchors.

use crate::stats::SampleMoments;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Means and standard errors below this are treated as exactly zero.
const ZERO_TOL: f64 = 1e-9;

/// One-sample t-test of per-anchor differences against zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasTest {
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub t_statistic: f64,
    /// Two-sided p-value of the zero-bias null.
    pub p_value: f64,
    /// True when the null is rejected at the configured level.
    pub systematic: bool,
}

/// Tests whether `deltas` are centred away from zero. Needs at least two
/// observations; returns `None` otherwise.
pub fn one_sample_t_test(deltas: &[f64], significance: f64) -> Option<BiasTest> {
    let moments = SampleMoments::from_slice(deltas)?;
    if moments.n < 2 {
        return None;
    }
    let se = moments.std / (moments.n as f64).sqrt();
    let (t_statistic, p_value) = if se <= ZERO_TOL {
        // Noise-free differences: any nonzero mean is a certain offset.
        if moments.mean.abs() <= ZERO_TOL {
            (0.0, 1.0)
        } else {
            (moments.mean.signum() * f64::INFINITY, 0.0)
        }
    } else {
        let t = moments.mean / se;
        (t, two_sided_p(t, (moments.n - 1) as f64))
    };
    Some(BiasTest {
        n: moments.n,
        mean: moments.mean,
        std: moments.std,
        t_statistic,
        p_value,
        systematic: p_value < significance,
    })
}

fn two_sided_p(t: f64, dof: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        // Only reachable for invalid dof; stay conservative.
        Err(_) => 1.0,
    }
}
