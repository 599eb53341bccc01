//! Sequential quadratic programming over a box, with a damped BFGS
//! Lagrangian Hessian and an L1 merit line search.

use nalgebra::{Matrix2, Vector2};
use tracing::{debug, warn};

use crate::qp::{self, LinearConstraint};
use crate::{Bounds, Objective, OptimizerSettings, Predicate};

/// Relaxation factors tried when the linearised constraints are inconsistent.
/// At zero the null step is always admissible.
const RELAXATION: [f64; 5] = [1.0, 0.5, 0.25, 0.1, 0.0];
const ARMIJO: f64 = 1e-4;
const MIN_STEP_LENGTH: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqpOutcome {
    pub x: Vector2<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Largest constraint violation at `x`, zero when feasible.
    pub violation: f64,
}

pub(crate) struct Sqp<'p, 'a> {
    pub predicates: &'p [Predicate<'a>],
    pub objective: Objective,
    pub bounds: Bounds,
    pub settings: OptimizerSettings,
}

impl Sqp<'_, '_> {
    pub fn run(&self, start: Vector2<f64>) -> SqpOutcome {
        let tol = self.settings.tolerance;
        let mut x = self.bounds.clamp(&start);
        let mut hessian = Matrix2::identity();
        let mut penalty = 1.0_f64;
        let mut margins = self.margins(&x);
        let mut jacobian = self.jacobian(&x);

        for iteration in 0..self.settings.max_iterations {
            let gradient = self.objective.gradient(&x);
            let Some(sub) = self.subproblem(&x, &hessian, &gradient, &margins, &jacobian) else {
                warn!(iteration, "quadratic subproblem has no solution");
                return self.outcome(x, iteration, false);
            };
            let step = sub.step;
            let violation = max_violation(&margins);
            debug!(
                iteration,
                wing_loading = x[0],
                power_loading = x[1],
                step = step.norm(),
                violation,
                "sqp iterate"
            );
            if step.amax() <= tol * (1.0 + x.amax()) && violation <= tol {
                return self.outcome(x, iteration, true);
            }

            let lambdas = &sub.multipliers[..self.predicates.len()];
            let largest = lambdas.iter().copied().fold(0.0, f64::max);
            penalty = penalty.max(largest + 1.0);

            let merit_here = self.merit(&x, &margins, penalty);
            let slope = gradient.dot(&step) - penalty * total_violation(&margins);
            let mut alpha = 1.0;
            let (next, next_margins) = loop {
                let candidate = self.bounds.clamp(&(x + step * alpha));
                let candidate_margins = self.margins(&candidate);
                let merit = self.merit(&candidate, &candidate_margins, penalty);
                if merit <= merit_here + ARMIJO * alpha * slope.min(0.0) {
                    break (candidate, candidate_margins);
                }
                alpha *= 0.5;
                if alpha < MIN_STEP_LENGTH {
                    debug!(iteration, "line search exhausted, taking the shortest step");
                    break (candidate, candidate_margins);
                }
            };

            let next_jacobian = self.jacobian(&next);
            let s = next - x;
            let grad_lagrangian = |grad: Vector2<f64>, jac: &[Vector2<f64>]| {
                jac.iter()
                    .zip(lambdas)
                    .fold(grad, |acc, (row, lambda)| acc - row * *lambda)
            };
            let y = grad_lagrangian(self.objective.gradient(&next), &next_jacobian)
                - grad_lagrangian(gradient, &jacobian);
            damped_bfgs_update(&mut hessian, &s, &y);

            x = next;
            margins = next_margins;
            jacobian = next_jacobian;
        }

        self.outcome(x, self.settings.max_iterations, false)
    }

    fn subproblem(
        &self,
        x: &Vector2<f64>,
        hessian: &Matrix2<f64>,
        gradient: &Vector2<f64>,
        margins: &[f64],
        jacobian: &[Vector2<f64>],
    ) -> Option<qp::QpSolution> {
        let lower = self.bounds.lower - x;
        let upper = self.bounds.upper - x;
        let box_rows = [
            LinearConstraint::new(Vector2::new(1.0, 0.0), lower[0]),
            LinearConstraint::new(Vector2::new(0.0, 1.0), lower[1]),
            LinearConstraint::new(Vector2::new(-1.0, 0.0), -upper[0]),
            LinearConstraint::new(Vector2::new(0.0, -1.0), -upper[1]),
        ];
        RELAXATION.iter().find_map(|&tau| {
            let rows: Vec<LinearConstraint> = margins
                .iter()
                .zip(jacobian)
                .map(|(&g, grad)| {
                    let required = if g < 0.0 { -tau * g } else { -g };
                    LinearConstraint::new(*grad, required)
                })
                .chain(box_rows)
                .collect();
            qp::solve(hessian, gradient, &rows, 1e-10)
        })
    }

    fn outcome(&self, x: Vector2<f64>, iterations: usize, converged: bool) -> SqpOutcome {
        SqpOutcome {
            violation: max_violation(&self.margins(&x)),
            x,
            iterations,
            converged,
        }
    }

    pub fn margins(&self, x: &Vector2<f64>) -> Vec<f64> {
        self.predicates.iter().map(|p| p.margin(x)).collect()
    }

    /// Central-difference gradients of every predicate.
    fn jacobian(&self, x: &Vector2<f64>) -> Vec<Vector2<f64>> {
        self.predicates
            .iter()
            .map(|p| {
                let mut grad = Vector2::zeros();
                for axis in 0..2 {
                    let h = self.settings.finite_difference_step * x[axis].abs().max(1.0);
                    let mut forward = *x;
                    let mut backward = *x;
                    forward[axis] += h;
                    backward[axis] -= h;
                    grad[axis] = (p.margin(&forward) - p.margin(&backward)) / (2.0 * h);
                }
                grad
            })
            .collect()
    }

    fn merit(&self, x: &Vector2<f64>, margins: &[f64], penalty: f64) -> f64 {
        self.objective.value(x) + penalty * total_violation(margins)
    }
}

pub(crate) fn max_violation(margins: &[f64]) -> f64 {
    margins.iter().fold(0.0, |worst, &g| worst.max(-g))
}

fn total_violation(margins: &[f64]) -> f64 {
    margins.iter().map(|&g| (-g).max(0.0)).sum()
}

/// Powell-damped BFGS update. Keeps `hessian` positive definite even when
/// the curvature condition fails.
fn damped_bfgs_update(hessian: &mut Matrix2<f64>, s: &Vector2<f64>, y: &Vector2<f64>) {
    let bs = *hessian * s;
    let sbs = s.dot(&bs);
    if sbs <= f64::EPSILON {
        return;
    }
    let sy = s.dot(y);
    let theta = if sy >= 0.2 * sbs {
        1.0
    } else {
        0.8 * sbs / (sbs - sy)
    };
    let r = y * theta + bs * (1.0 - theta);
    let sr = s.dot(&r);
    if sr <= f64::EPSILON {
        return;
    }
    *hessian += r * r.transpose() / sr - bs * bs.transpose() / sbs;
}
