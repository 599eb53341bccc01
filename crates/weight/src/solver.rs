//! Takeoff-weight fixed-point iteration on `W0 = W_fixed / (1 − Wf/W0 − We/W0)`.

use serde::Serialize;
use sizing_core::validate;
use tracing::{debug, info};

use crate::WeightError;
use crate::mission::{FlightPerformance, MissionProfile, SegmentFraction, fuel_fraction};

const VARIABLE_SWEEP_FACTOR: f64 = 1.04;

/// Statistical empty-weight fraction `We/W0 = A · W0^C · Kvs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmptyWeightModel {
    pub a: f64,
    pub c: f64,
    pub variable_sweep: bool,
}

impl EmptyWeightModel {
    pub fn new(a: f64, c: f64, variable_sweep: bool) -> Result<Self, WeightError> {
        Ok(Self {
            a: validate::positive("empty_weight_a", a)?,
            c: validate::finite("empty_weight_c", c)?,
            variable_sweep,
        })
    }

    pub fn fraction(&self, takeoff_weight: f64) -> f64 {
        let kvs = if self.variable_sweep {
            VARIABLE_SWEEP_FACTOR
        } else {
            1.0
        };
        self.a * takeoff_weight.powf(self.c) * kvs
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSolverSettings {
    /// Convergence threshold on `|W0 − W0_calc|` (lb).
    pub tolerance_lb: f64,
    pub max_iterations: usize,
}

impl Default for WeightSolverSettings {
    fn default() -> Self {
        Self {
            tolerance_lb: 1.0,
            max_iterations: 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightRequest {
    pub profile: MissionProfile,
    pub performance: FlightPerformance,
    pub empty_weight: EmptyWeightModel,
    pub crew_weight_lb: f64,
    pub payload_weight_lb: f64,
    /// Starting guess; higher guesses converge more reliably.
    pub initial_takeoff_weight_lb: f64,
    pub settings: WeightSolverSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightEstimate {
    pub takeoff_weight_lb: f64,
    pub empty_weight_lb: f64,
    pub empty_weight_fraction: f64,
    pub fuel_fraction: f64,
    pub fuel_weight_lb: f64,
    pub iterations: usize,
    pub segments: Vec<SegmentFraction>,
}

/// One update of the iteration: returns `W0_calc` for the current guess.
pub fn fixed_point_step(
    takeoff_weight: f64,
    fuel_fraction: f64,
    empty_weight: &EmptyWeightModel,
    fixed_weight: f64,
) -> Result<f64, WeightError> {
    let denominator = 1.0 - fuel_fraction - empty_weight.fraction(takeoff_weight);
    if !(denominator.is_finite() && denominator > 0.0) {
        return Err(WeightError::Diverged {
            takeoff_weight,
            denominator,
        });
    }
    Ok(fixed_weight / denominator)
}

/// Iterate the takeoff weight until successive guesses agree within tolerance.
pub fn solve_takeoff_weight(request: &WeightRequest) -> Result<WeightEstimate, WeightError> {
    let crew = validate::non_negative("crew_weight_lb", request.crew_weight_lb)?;
    let payload = validate::non_negative("payload_weight_lb", request.payload_weight_lb)?;
    let initial = request.initial_takeoff_weight_lb;
    let mut w0 = validate::positive("initial_takeoff_weight_lb", initial)?;
    let tolerance = validate::positive("tolerance_lb", request.settings.tolerance_lb)?;
    let fixed_weight = crew + payload;

    let segments = request.profile.segment_fractions(&request.performance)?;
    let fractions: Vec<f64> = segments.iter().map(|s| s.fraction).collect();
    let fuel = fuel_fraction(&fractions);
    debug!(
        fuel_fraction = fuel,
        segments = segments.len(),
        "mission fuel fraction"
    );

    let mut w0_calc = fixed_point_step(w0, fuel, &request.empty_weight, fixed_weight)?;
    let mut iterations = 0;
    while (w0 - w0_calc).abs() > tolerance {
        if iterations >= request.settings.max_iterations {
            return Err(WeightError::NotConverged {
                iterations,
                last_change: (w0 - w0_calc).abs(),
            });
        }
        w0 = w0_calc;
        w0_calc = fixed_point_step(w0, fuel, &request.empty_weight, fixed_weight)?;
        iterations += 1;
        debug!(iteration = iterations, w0, w0_calc, "takeoff weight update");
    }

    let empty_fraction = request.empty_weight.fraction(w0);
    info!(
        takeoff_weight_lb = w0,
        iterations,
        "takeoff weight converged"
    );

    Ok(WeightEstimate {
        takeoff_weight_lb: w0,
        empty_weight_lb: empty_fraction * w0,
        empty_weight_fraction: empty_fraction,
        fuel_fraction: fuel,
        fuel_weight_lb: fuel * w0,
        iterations,
        segments,
    })
}
