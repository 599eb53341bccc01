//! Exact solver for the two-variable quadratic subproblem
//!
//! ```text
//! minimise ½·dᵀ·B·d + cᵀ·d   subject to   aᵢ·d ≥ bᵢ
//! ```
//!
//! With two unknowns at most two constraints can be independently active,
//! so every active set of size zero, one and two is enumerated and the
//! feasible candidate with the lowest objective wins. `B` must be positive
//! definite, which makes that candidate the global optimum.

use nalgebra::{Matrix2, Vector2};

/// Determinants below this are treated as singular.
const SINGULAR: f64 = 1e-14;

/// `a·d ≥ b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConstraint {
    pub a: Vector2<f64>,
    pub b: f64,
}

impl LinearConstraint {
    pub fn new(a: Vector2<f64>, b: f64) -> Self {
        Self { a, b }
    }

    fn residual(&self, d: &Vector2<f64>) -> f64 {
        self.a.dot(d) - self.b
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    pub step: Vector2<f64>,
    /// One non-negative multiplier per constraint, zero when inactive.
    pub multipliers: Vec<f64>,
    pub objective: f64,
}

/// Solve the subproblem, or `None` when the constraints admit no step.
pub fn solve(
    hessian: &Matrix2<f64>,
    gradient: &Vector2<f64>,
    constraints: &[LinearConstraint],
    tolerance: f64,
) -> Option<QpSolution> {
    let inverse = hessian.try_inverse()?;
    let objective = |d: &Vector2<f64>| 0.5 * d.dot(&(hessian * d)) + gradient.dot(d);
    let feasible = |d: &Vector2<f64>| {
        constraints
            .iter()
            .all(|c| c.residual(d) >= -tolerance * (1.0 + c.b.abs()))
    };

    let mut best: Option<(Vector2<f64>, Vec<(usize, f64)>)> = None;
    let mut best_value = f64::INFINITY;
    let mut consider = |d: Vector2<f64>, active: Vec<(usize, f64)>| {
        if !d.iter().all(|v| v.is_finite()) || !feasible(&d) {
            return;
        }
        let value = objective(&d);
        if value < best_value {
            best_value = value;
            best = Some((d, active));
        }
    };

    consider(-(inverse * gradient), Vec::new());

    for (i, ci) in constraints.iter().enumerate() {
        let binv_a = inverse * ci.a;
        let curvature = ci.a.dot(&binv_a);
        if curvature <= SINGULAR {
            continue;
        }
        let lambda = (ci.b + ci.a.dot(&(inverse * gradient))) / curvature;
        let d = inverse * (ci.a * lambda - gradient);
        consider(d, vec![(i, lambda)]);
    }

    for i in 0..constraints.len() {
        for j in (i + 1)..constraints.len() {
            let (ci, cj) = (&constraints[i], &constraints[j]);
            let rows = Matrix2::new(ci.a[0], ci.a[1], cj.a[0], cj.a[1]);
            if rows.determinant().abs() <= SINGULAR {
                continue;
            }
            let Some(rows_inv) = rows.try_inverse() else {
                continue;
            };
            let d = rows_inv * Vector2::new(ci.b, cj.b);
            // Stationarity: B·d + c = λᵢ·aᵢ + λⱼ·aⱼ.
            let lambdas = rows_inv.transpose() * (hessian * d + gradient);
            consider(d, vec![(i, lambdas[0]), (j, lambdas[1])]);
        }
    }

    let (step, active) = best?;
    let mut multipliers = vec![0.0; constraints.len()];
    for (index, lambda) in active {
        multipliers[index] = lambda.max(0.0);
    }
    Some(QpSolution {
        step,
        multipliers,
        objective: best_value,
    })
}
