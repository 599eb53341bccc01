//! Quadratic least-squares fit via SVD.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::debug;

use crate::TakeoffError;

const SVD_MAX_ITERATIONS: usize = 500;
/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// `y = a·x² + b·x + c` with fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub samples: usize,
    pub rms_residual: f64,
    pub max_residual: f64,
}

impl QuadraticFit {
    /// Least-squares fit of `y` on `x`. Requires at least three samples.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, TakeoffError> {
        if x.len() != y.len() {
            return Err(TakeoffError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        let n = x.len();
        if n < 3 {
            return Err(TakeoffError::InsufficientSamples { found: n });
        }

        // Scale the abscissa so the columns of the design matrix are O(1).
        let scale = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return Err(TakeoffError::RankDeficient { rank: 1 });
        }
        let design = DMatrix::from_fn(n, 3, |i, j| {
            let u = x[i] / scale;
            match j {
                0 => u * u,
                1 => u,
                _ => 1.0,
            }
        });
        let rhs = DVector::from_column_slice(y);

        let svd = design
            .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(|| {
                TakeoffError::NotConverged(format!("SVD exceeded {SVD_MAX_ITERATIONS} iterations"))
            })?;
        let threshold = svd.singular_values.max() * RANK_TOLERANCE;
        let rank = svd.rank(threshold);
        if rank < 3 {
            return Err(TakeoffError::RankDeficient { rank });
        }
        let scaled = svd
            .solve(&rhs, threshold)
            .map_err(|msg| TakeoffError::NotConverged(msg.to_string()))?;

        let mut fit = Self {
            a: scaled[0] / (scale * scale),
            b: scaled[1] / scale,
            c: scaled[2],
            samples: n,
            rms_residual: 0.0,
            max_residual: 0.0,
        };
        let mut sum_sq = 0.0;
        for (xi, yi) in x.iter().zip(y) {
            let r = (yi - fit.evaluate(*xi)).abs();
            sum_sq += r * r;
            fit.max_residual = fit.max_residual.max(r);
        }
        fit.rms_residual = (sum_sq / n as f64).sqrt();
        debug!(
            a = fit.a,
            b = fit.b,
            c = fit.c,
            rms = fit.rms_residual,
            "quadratic fit"
        );
        Ok(fit)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        (self.a * x + self.b) * x + self.c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exact_quadratic_is_recovered() {
        let x: Vec<f64> = (1..=8).map(|i| i as f64 * 750.0).collect();
        let y: Vec<f64> = x.iter().map(|d| 2.0e-6 * d * d + 0.03 * d + 4.0).collect();
        let fit = QuadraticFit::fit(&x, &y).unwrap();
        assert_relative_eq!(fit.a, 2.0e-6, max_relative = 1e-6);
        assert_relative_eq!(fit.b, 0.03, max_relative = 1e-6);
        assert_relative_eq!(fit.c, 4.0, max_relative = 1e-6);
        assert!(fit.rms_residual < 1e-8);
    }

    #[test]
    fn noisy_samples_are_reproduced_within_residual() {
        let x = [400.0, 900.0, 1_500.0, 2_200.0, 3_000.0, 3_900.0];
        let y = [48.0, 101.0, 152.0, 199.0, 251.0, 298.0];
        let fit = QuadraticFit::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y) {
            assert!((fit.evaluate(*xi) - yi).abs() <= fit.max_residual + 1e-9);
        }
        assert!(fit.max_residual < 10.0);
    }

    #[test]
    fn two_samples_are_not_enough() {
        let err = QuadraticFit::fit(&[1.0, 2.0], &[1.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            TakeoffError::InsufficientSamples { found: 2 }
        ));
    }

    #[test]
    fn unequal_sample_columns_are_rejected() {
        let x = [400.0, 900.0, 1_500.0, 2_200.0];
        let y = [48.0, 101.0, 152.0];
        let err = QuadraticFit::fit(&x, &y).unwrap_err();
        assert!(matches!(err, TakeoffError::LengthMismatch { x: 4, y: 3 }));
    }

    #[test]
    fn repeated_abscissa_is_rank_deficient() {
        let err = QuadraticFit::fit(&[5.0, 5.0, 5.0, 5.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(err, TakeoffError::RankDeficient { .. }));
    }
}
