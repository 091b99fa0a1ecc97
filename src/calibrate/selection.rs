//! Complexity-ordered model selection for correction functions.
//!
//! Candidates are nested: a constant offset, then harmonic series in hue of
//! increasing order. Each step up the ladder must earn its extra terms through
//! a nested-model F-test at the configured significance level. The first
//! candidate that fails ends the search and is reported as rejected; a lower
//! residual alone never promotes a model.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

const RSS_TOL: f64 = 1e-12;

/// A correction model class, ordered by complexity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "order")]
pub enum ModelClass {
    /// `f(h) = a0`
    Constant,
    /// `f(h) = a0 + Σ_{j=1..k} (b_j cos jh + c_j sin jh)`
    Harmonic(usize),
}

impl ModelClass {
    pub fn parameter_count(&self) -> usize {
        match self {
            ModelClass::Constant => 1,
            ModelClass::Harmonic(k) => 1 + 2 * k,
        }
    }

    /// Constant followed by harmonics `1..=max_order`.
    pub fn ladder(max_order: usize) -> Vec<ModelClass> {
        std::iter::once(ModelClass::Constant)
            .chain((1..=max_order).map(ModelClass::Harmonic))
            .collect()
    }

    fn order(&self) -> usize {
        match self {
            ModelClass::Constant => 0,
            ModelClass::Harmonic(k) => *k,
        }
    }

    fn design_row(&self, hue_deg: f64) -> Vec<f64> {
        let h = hue_deg.to_radians();
        let mut row = Vec::with_capacity(self.parameter_count());
        row.push(1.0);
        for j in 1..=self.order() {
            let (s, c) = (j as f64 * h).sin_cos();
            row.push(c);
            row.push(s);
        }
        row
    }
}

/// Least-squares fit of one candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFit {
    pub class: ModelClass,
    /// `[a0, b1, c1, b2, c2, ...]`
    pub coefficients: Vec<f64>,
    pub rss: f64,
}

impl CandidateFit {
    /// Evaluates the fitted function at `hue_deg`.
    pub fn evaluate(&self, hue_deg: f64) -> f64 {
        self.class
            .design_row(hue_deg)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, b)| x * b)
            .sum()
    }
}

/// A more complex candidate that failed its significance test.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedModel {
    pub class: ModelClass,
    pub f_statistic: Option<f64>,
    /// `None` when the candidate had too few residual degrees of freedom.
    pub p_value: Option<f64>,
    pub rss: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub chosen: CandidateFit,
    pub rejected: Vec<RejectedModel>,
}

/// Fits `class` to `(hue, target)` observations by SVD least squares.
pub fn fit_candidate(class: ModelClass, hues: &[f64], targets: &[f64]) -> Option<CandidateFit> {
    let n = hues.len();
    let p = class.parameter_count();
    if n == 0 || n != targets.len() || n < p {
        return None;
    }
    let rows: Vec<f64> = hues.iter().flat_map(|&h| class.design_row(h)).collect();
    let x = DMatrix::from_row_slice(n, p, &rows);
    let y = DVector::from_column_slice(targets);
    let beta = x.clone().svd(true, true).solve(&y, 1e-12).ok()?;
    let residual = &y - &x * &beta;
    Some(CandidateFit {
        class,
        coefficients: beta.iter().copied().collect(),
        rss: residual.norm_squared(),
    })
}

/// Walks `candidates` (simplest first) and returns the most complex model
/// reached through a chain of justified extensions.
pub fn select_model(
    candidates: &[ModelClass],
    hues: &[f64],
    targets: &[f64],
    significance: f64,
) -> Option<Selection> {
    let (first, rest) = candidates.split_first()?;
    let mut chosen = fit_candidate(*first, hues, targets)?;
    let mut rejected = Vec::new();
    let n = hues.len();

    for &class in rest {
        let p_complex = class.parameter_count();
        // need at least two residual degrees of freedom to judge the fit
        if n < p_complex + 2 {
            rejected.push(RejectedModel {
                class,
                f_statistic: None,
                p_value: None,
                rss: None,
            });
            break;
        }
        let Some(fit) = fit_candidate(class, hues, targets) else {
            break;
        };
        let df1 = (p_complex - chosen.class.parameter_count()) as f64;
        let df2 = (n - p_complex) as f64;
        let (f_stat, p_value) = nested_f_test(chosen.rss, fit.rss, df1, df2);
        if p_value < significance {
            chosen = fit;
        } else {
            rejected.push(RejectedModel {
                class,
                f_statistic: Some(f_stat),
                p_value: Some(p_value),
                rss: Some(fit.rss),
            });
            break;
        }
    }
    Some(Selection { chosen, rejected })
}

/// F-test of a nested simpler model against a more complex one.
pub fn nested_f_test(rss_simple: f64, rss_complex: f64, df1: f64, df2: f64) -> (f64, f64) {
    let gain = (rss_simple - rss_complex).max(0.0);
    if rss_complex <= RSS_TOL {
        return if gain > RSS_TOL {
            (f64::INFINITY, 0.0)
        } else {
            (0.0, 1.0)
        };
    }
    let f = (gain / df1) / (rss_complex / df2);
    let p = match FisherSnedecor::new(df1, df2) {
        Ok(dist) => (1.0 - dist.cdf(f)).clamp(0.0, 1.0),
        Err(_) => 1.0,
    };
    (f, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hues(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 360.0 / n as f64 + 7.0).collect()
    }

    #[test]
    fn constant_fit_recovers_mean() {
        let h = hues(5);
        let fit = fit_candidate(ModelClass::Constant, &h, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((fit.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((fit.rss - 10.0).abs() < 1e-9);
    }

    #[test]
    fn harmonic_signal_promotes_first_order() {
        let h = hues(24);
        let noise = [0.3, -0.2, 0.1, -0.4, 0.2, 0.0];
        let y: Vec<f64> = h
            .iter()
            .enumerate()
            .map(|(i, &hh)| 5.0 + 6.0 * hh.to_radians().cos() + noise[i % noise.len()])
            .collect();
        let sel = select_model(&ModelClass::ladder(2), &h, &y, 0.05).unwrap();
        assert_eq!(sel.chosen.class, ModelClass::Harmonic(1));
        assert_eq!(sel.rejected.len(), 1);
        assert_eq!(sel.rejected[0].class, ModelClass::Harmonic(2));
        assert!((sel.chosen.evaluate(0.0) - 11.0).abs() < 0.5);
    }

    #[test]
    fn pure_offset_stays_constant() {
        // period-8 noise over 24 even hues only has harmonics of order 3k
        let h = hues(24);
        let noise = [0.5, -0.3, 0.2, -0.6, 0.1, 0.4, -0.2, -0.1];
        let y: Vec<f64> = (0..24).map(|i| 15.0 + noise[i % noise.len()]).collect();
        let sel = select_model(&ModelClass::ladder(2), &h, &y, 0.05).unwrap();
        assert_eq!(sel.chosen.class, ModelClass::Constant);
        assert_eq!(sel.rejected.len(), 1);
        assert!(sel.rejected[0].p_value.unwrap() >= 0.05);
    }

    #[test]
    fn too_few_points_for_harmonics() {
        let h = hues(3);
        let sel = select_model(&ModelClass::ladder(2), &h, &[10.0, 10.0, 10.0], 0.05).unwrap();
        assert_eq!(sel.chosen.class, ModelClass::Constant);
        assert!(sel.rejected[0].p_value.is_none());
    }

    #[test]
    fn exact_constant_does_not_overfit() {
        let (f, p) = nested_f_test(0.0, 0.0, 2.0, 5.0);
        assert_eq!(f, 0.0);
        assert_eq!(p, 1.0);
    }
}
