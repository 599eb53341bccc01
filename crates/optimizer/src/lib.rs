//! Design-point search on the matching chart.
//!
//! The design variables are wing loading `x` (lb/ft²) and power loading `y`
//! (lb/hp). Each requirement is handed in as a [`Predicate`] whose margin is
//! non-negative where the requirement holds. The optimiser runs SQP from
//! the middle of the box and again from the best feasible point of a coarse
//! grid, then keeps the better converged result.

pub mod qp;
mod sqp;

use std::fmt;

use nalgebra::Vector2;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::sqp::{Sqp, SqpOutcome, max_violation};

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("invalid search box: lower {lower:?} must be finite and below upper {upper:?}")]
    InvalidBounds { lower: [f64; 2], upper: [f64; 2] },
    #[error("invalid optimiser setting {name} = {value}")]
    InvalidSetting { name: &'static str, value: f64 },
    #[error("no feasible design point: '{predicate}' is violated by {violation:.4} at best")]
    Infeasible { predicate: String, violation: f64 },
    #[error("optimiser did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// Named inequality `margin(x, y) >= 0`.
pub struct Predicate<'a> {
    name: String,
    margin: Box<dyn Fn(f64, f64) -> f64 + 'a>,
}

impl<'a> Predicate<'a> {
    pub fn new(name: impl Into<String>, margin: impl Fn(f64, f64) -> f64 + 'a) -> Self {
        Self {
            name: name.into(),
            margin: Box::new(margin),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn margin(&self, x: &Vector2<f64>) -> f64 {
        (self.margin)(x[0], x[1])
    }
}

impl fmt::Debug for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .finish()
    }
}

/// What the design point should maximise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Distance from the origin, `sqrt(x² + y²)`.
    #[default]
    MaximizeNorm,
    /// Weighted sum `wx·x + wy·y`.
    MaximizeWeighted {
        wing_loading: f64,
        power_loading: f64,
    },
}

impl Objective {
    /// Value to minimise.
    pub fn value(&self, x: &Vector2<f64>) -> f64 {
        match *self {
            Objective::MaximizeNorm => -x.norm(),
            Objective::MaximizeWeighted {
                wing_loading,
                power_loading,
            } => -(wing_loading * x[0] + power_loading * x[1]),
        }
    }

    pub fn gradient(&self, x: &Vector2<f64>) -> Vector2<f64> {
        match *self {
            Objective::MaximizeNorm => {
                let norm = x.norm();
                if norm > 0.0 {
                    -x / norm
                } else {
                    -Vector2::repeat(std::f64::consts::FRAC_1_SQRT_2)
                }
            }
            Objective::MaximizeWeighted {
                wing_loading,
                power_loading,
            } => -Vector2::new(wing_loading, power_loading),
        }
    }
}

/// Axis-aligned search box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: Vector2<f64>,
    pub upper: Vector2<f64>,
}

impl Bounds {
    pub fn new(lower: [f64; 2], upper: [f64; 2]) -> Result<Self, OptimizerError> {
        let valid = lower.iter().chain(&upper).all(|v| v.is_finite())
            && lower[0] < upper[0]
            && lower[1] < upper[1];
        if !valid {
            return Err(OptimizerError::InvalidBounds { lower, upper });
        }
        Ok(Self {
            lower: Vector2::from(lower),
            upper: Vector2::from(upper),
        })
    }

    pub fn midpoint(&self) -> Vector2<f64> {
        (self.lower + self.upper) * 0.5
    }

    pub fn clamp(&self, x: &Vector2<f64>) -> Vector2<f64> {
        x.zip_zip_map(&self.lower, &self.upper, |v, lo, hi| v.clamp(lo, hi))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: Vector2::new(1.0, 1.0),
            upper: Vector2::new(50.0, 50.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    pub max_iterations: usize,
    /// Step and feasibility tolerance.
    pub tolerance: f64,
    /// Points per axis of the seeding grid. Zero or one disables it.
    pub grid_points: usize,
    /// Relative finite-difference step for predicate gradients.
    pub finite_difference_step: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            grid_points: 41,
            finite_difference_step: 1e-6,
        }
    }
}

impl OptimizerSettings {
    fn validate(&self) -> Result<(), OptimizerError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(OptimizerError::InvalidSetting {
                name: "tolerance",
                value: self.tolerance,
            });
        }
        if !(self.finite_difference_step.is_finite() && self.finite_difference_step > 0.0) {
            return Err(OptimizerError::InvalidSetting {
                name: "finite_difference_step",
                value: self.finite_difference_step,
            });
        }
        if self.max_iterations == 0 {
            return Err(OptimizerError::InvalidSetting {
                name: "max_iterations",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Where the winning SQP run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPoint {
    Midpoint,
    GridSeed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateMargin {
    pub name: String,
    pub margin: f64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignPoint {
    pub wing_loading: f64,
    pub power_loading: f64,
    /// Value of the maximised quantity (not negated).
    pub objective: f64,
    pub iterations: usize,
    pub start: StartPoint,
    pub margins: Vec<PredicateMargin>,
}

impl DesignPoint {
    /// Names of the predicates that bind at the optimum.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.margins
            .iter()
            .filter(|m| m.active)
            .map(|m| m.name.as_str())
    }
}

/// Box-bounded maximiser over the predicates added to it.
#[derive(Debug, Default)]
pub struct DesignPointOptimizer<'a> {
    predicates: Vec<Predicate<'a>>,
    objective: Objective,
    bounds: Bounds,
    settings: OptimizerSettings,
}

impl<'a> DesignPointOptimizer<'a> {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_settings(mut self, settings: OptimizerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn add(&mut self, predicate: Predicate<'a>) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate<'a>] {
        &self.predicates
    }

    pub fn solve(&self) -> Result<DesignPoint, OptimizerError> {
        self.settings.validate()?;
        let sqp = Sqp {
            predicates: &self.predicates,
            objective: self.objective,
            bounds: self.bounds,
            settings: self.settings,
        };

        let mut runs = vec![(StartPoint::Midpoint, sqp.run(self.bounds.midpoint()))];
        let scan = self.scan_grid(&sqp);
        if let Some(seed) = scan.best_feasible {
            debug!(wing_loading = seed[0], power_loading = seed[1], "grid seed");
            runs.push((StartPoint::GridSeed, sqp.run(seed)));
        }

        let tol = self.settings.tolerance;
        let best = runs
            .iter()
            .filter(|(_, run)| run.converged && run.violation <= tol)
            .min_by(|a, b| {
                self.objective
                    .value(&a.1.x)
                    .total_cmp(&self.objective.value(&b.1.x))
            });

        match best {
            Some((start, run)) => {
                if *start == StartPoint::GridSeed {
                    debug!("grid-seeded run beat the midpoint run");
                }
                let point = self.design_point(*start, run);
                info!(
                    wing_loading = point.wing_loading,
                    power_loading = point.power_loading,
                    iterations = point.iterations,
                    "design point found"
                );
                Ok(point)
            }
            None if scan.best_feasible.is_none() && runs.iter().all(|(_, r)| r.violation > tol) => {
                let closest = runs
                    .iter()
                    .map(|(_, r)| r.x)
                    .chain(scan.least_violated)
                    .min_by(|a, b| {
                        max_violation(&sqp.margins(a)).total_cmp(&max_violation(&sqp.margins(b)))
                    })
                    .unwrap_or_else(|| self.bounds.midpoint());
                let (predicate, violation) = self.worst(&sqp.margins(&closest));
                Err(OptimizerError::Infeasible {
                    predicate,
                    violation,
                })
            }
            None => Err(OptimizerError::NotConverged {
                iterations: self.settings.max_iterations,
            }),
        }
    }

    fn scan_grid(&self, sqp: &Sqp<'_, 'a>) -> GridScan {
        let n = self.settings.grid_points;
        let mut scan = GridScan::default();
        if n < 2 {
            return scan;
        }
        let span = self.bounds.upper - self.bounds.lower;
        let mut best_value = f64::INFINITY;
        let mut least = f64::INFINITY;
        for i in 0..n {
            for j in 0..n {
                let x = self.bounds.lower
                    + span.component_mul(&Vector2::new(
                        i as f64 / (n - 1) as f64,
                        j as f64 / (n - 1) as f64,
                    ));
                let violation = max_violation(&sqp.margins(&x));
                if violation <= 0.0 {
                    let value = self.objective.value(&x);
                    if value < best_value {
                        best_value = value;
                        scan.best_feasible = Some(x);
                    }
                } else if violation < least {
                    least = violation;
                    scan.least_violated = Some(x);
                }
            }
        }
        scan
    }

    fn design_point(&self, start: StartPoint, run: &SqpOutcome) -> DesignPoint {
        let active_tol = self.settings.tolerance.sqrt();
        let margins = self
            .predicates
            .iter()
            .map(|p| {
                let margin = p.margin(&run.x);
                PredicateMargin {
                    name: p.name().to_string(),
                    margin,
                    active: margin.abs() <= active_tol * (1.0 + run.x.amax()),
                }
            })
            .collect();
        DesignPoint {
            wing_loading: run.x[0],
            power_loading: run.x[1],
            objective: -self.objective.value(&run.x),
            iterations: run.iterations,
            start,
            margins,
        }
    }

    fn worst(&self, margins: &[f64]) -> (String, f64) {
        self.predicates
            .iter()
            .zip(margins)
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(p, g)| (p.name().to_string(), -g))
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct GridScan {
    best_feasible: Option<Vector2<f64>>,
    least_violated: Option<Vector2<f64>>,
}
