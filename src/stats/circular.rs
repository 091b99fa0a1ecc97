//! Weighted circular statistics for the hue axis.
//!
//! Means and dispersions are computed from the resultant of unit vectors
//! `w·(cos θ, sin θ)`, so hues on either side of the 0/360 seam average
//! correctly. The accumulator is a plain sum and merges by addition.

use crate::angle::normalize_hue;
use serde::{Deserialize, Serialize};

/// Mean resultant lengths below this are treated as fully dispersed.
pub const MIN_RESULTANT: f64 = 1e-12;

/// Mean resultant lengths within this of one are treated as exactly one.
const UNIT_RESULTANT_TOL: f64 = 1e-12;

/// Circular standard deviation reported for a vanishing resultant,
/// i.e. `sqrt(-2 ln MIN_RESULTANT)`.
pub fn max_circular_std_deg() -> f64 {
    (-2.0 * MIN_RESULTANT.ln()).sqrt().to_degrees()
}

/// Summary of a set of weighted hue angles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HueStats {
    /// Weighted circular mean in [0, 360). `None` when no weight was seen or
    /// the resultant vanishes.
    pub mean_deg: Option<f64>,
    /// Mean resultant length in [0, 1].
    pub resultant: f64,
    /// Circular standard deviation (degrees).
    pub std_deg: f64,
    /// True when the resultant was clamped (uniformly spread hues).
    pub max_dispersion: bool,
}

/// Running sums for weighted circular statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CircularAccumulator {
    pub sum_sin: f64,
    pub sum_cos: f64,
    pub total_weight: f64,
    pub count: u64,
}

impl CircularAccumulator {
    pub fn push(&mut self, hue_deg: f64, weight: f64) {
        let (s, c) = hue_deg.to_radians().sin_cos();
        self.sum_sin += weight * s;
        self.sum_cos += weight * c;
        self.total_weight += weight;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &CircularAccumulator) {
        self.sum_sin += other.sum_sin;
        self.sum_cos += other.sum_cos;
        self.total_weight += other.total_weight;
        self.count += other.count;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.total_weight <= 0.0
    }

    /// Mean resultant length `R = |Σ w e^{iθ}| / Σ w`.
    pub fn resultant(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.sum_sin.hypot(self.sum_cos) / self.total_weight).clamp(0.0, 1.0)
    }

    pub fn mean_deg(&self) -> Option<f64> {
        if self.is_empty() || self.resultant() < MIN_RESULTANT {
            return None;
        }
        Some(normalize_hue(self.sum_sin.atan2(self.sum_cos).to_degrees()))
    }

    /// `sqrt(-2 ln R)` in degrees, with `R` clamped away from zero and
    /// snapped to one when summation error is all that separates it.
    pub fn std_deg(&self) -> f64 {
        let r = self.resultant().max(MIN_RESULTANT);
        if 1.0 - r <= UNIT_RESULTANT_TOL {
            return 0.0;
        }
        (-2.0 * r.ln()).sqrt().to_degrees()
    }

    pub fn stats(&self) -> HueStats {
        let resultant = self.resultant();
        HueStats {
            mean_deg: self.mean_deg(),
            resultant,
            std_deg: self.std_deg(),
            max_dispersion: resultant < MIN_RESULTANT,
        }
    }
}

/// Weighted circular mean of `(hue, weight)` pairs.
pub fn circular_mean(hues: &[(f64, f64)]) -> Option<f64> {
    accumulate(hues).mean_deg()
}

/// Weighted circular standard deviation of `(hue, weight)` pairs, in degrees.
pub fn circular_std(hues: &[(f64, f64)]) -> f64 {
    accumulate(hues).std_deg()
}

fn accumulate(hues: &[(f64, f64)]) -> CircularAccumulator {
    let mut acc = CircularAccumulator::default();
    for &(h, w) in hues {
        acc.push(h, w);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn mean_across_seam_is_zero() {
        let mean = circular_mean(&[(10.0, 1.0), (350.0, 1.0)]).unwrap();
        assert!(
            approx_eq(mean, 0.0, 1e-9) || approx_eq(mean, 360.0, 1e-9),
            "mean={mean}"
        );
    }

    #[test]
    fn weights_pull_the_mean() {
        let mean = circular_mean(&[(0.0, 3.0), (90.0, 1.0)]).unwrap();
        let expected = (1.0f64).atan2(3.0).to_degrees();
        assert!(approx_eq(mean, expected, 1e-9));
    }

    #[test]
    fn identical_hues_have_zero_std() {
        for hue in [0.0, 10.0, 123.0, 271.5, 359.9] {
            let std = circular_std(&vec![(hue, 2.0); 10]);
            assert_eq!(std, 0.0, "hue={hue}");
            assert!(std.is_sign_positive(), "hue={hue} gave -0");
        }
    }

    #[test]
    fn small_spread_is_not_snapped_to_zero() {
        let std = circular_std(&[(10.0, 1.0), (10.5, 1.0)]);
        assert!(approx_eq(std, 0.25, 1e-3), "std={std}");
    }

    #[test]
    fn uniform_hues_reach_max_dispersion_without_error() {
        let hues: Vec<(f64, f64)> = (0..12).map(|i| (i as f64 * 30.0, 1.0)).collect();
        let acc = accumulate(&hues);
        let stats = acc.stats();
        assert!(stats.mean_deg.is_none());
        assert!(stats.std_deg.is_finite());
        assert!(stats.std_deg > 300.0);
        assert!(stats.std_deg <= max_circular_std_deg() + 1e-9);
    }

    #[test]
    fn merge_matches_single_pass() {
        let hues = [(5.0, 1.0), (350.0, 2.0), (20.0, 0.5), (340.0, 1.5)];
        let mut a = accumulate(&hues[..2]);
        let b = accumulate(&hues[2..]);
        a.merge(&b);
        let all = accumulate(&hues);
        assert!(approx_eq(a.mean_deg().unwrap(), all.mean_deg().unwrap(), 1e-9));
        assert!(approx_eq(a.std_deg(), all.std_deg(), 1e-9));
    }

    #[test]
    fn empty_accumulator_has_no_mean() {
        let acc = CircularAccumulator::default();
        assert!(acc.mean_deg().is_none());
        assert!(acc.std_deg().is_finite());
    }
}
