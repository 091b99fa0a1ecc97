//! Weighted linear moments for the value and chroma axes, plus small
//! unweighted helpers used by the calibrator.

use serde::{Deserialize, Serialize};

/// Running weighted sums `Σw`, `Σw·x`, `Σw·x²`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearAccumulator {
    pub sum_w: f64,
    pub sum_wx: f64,
    pub sum_wxx: f64,
}

impl LinearAccumulator {
    pub fn push(&mut self, x: f64, weight: f64) {
        self.sum_w += weight;
        self.sum_wx += weight * x;
        self.sum_wxx += weight * x * x;
    }

    pub fn merge(&mut self, other: &LinearAccumulator) {
        self.sum_w += other.sum_w;
        self.sum_wx += other.sum_wx;
        self.sum_wxx += other.sum_wxx;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.sum_w > 0.0).then(|| self.sum_wx / self.sum_w)
    }

    /// Weighted population variance, floored at zero against cancellation.
    pub fn variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        Some((self.sum_wxx / self.sum_w - mean * mean).max(0.0))
    }

    pub fn std(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

/// Mean and unbiased sample standard deviation of a slice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SampleMoments {
    pub n: usize,
    pub mean: f64,
    pub std: f64,
}

impl SampleMoments {
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        Some(Self { n, mean, std })
    }
}
