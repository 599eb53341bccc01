//! Mission fuel fractions and takeoff-weight fixed-point iteration.
//!
//! Units are US customary throughout: feet, seconds, ft/s, pounds, and
//! specific fuel consumption in 1/s.

pub mod mission;
pub mod solver;

pub use mission::{
    Aerodynamics, EngineKind, FlightPerformance, MissionProfile, MissionSegment, Propulsion,
    SegmentFraction, fuel_fraction,
};
pub use solver::{
    EmptyWeightModel, WeightEstimate, WeightRequest, WeightSolverSettings, fixed_point_step,
    solve_takeoff_weight,
};

use sizing_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeightError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("segment '{segment}' produced weight fraction {fraction}, expected (0, 1]")]
    InvalidFraction {
        segment: &'static str,
        fraction: f64,
    },
    #[error(
        "takeoff weight did not converge in {iterations} iterations (last change {last_change:.3} lb)"
    )]
    NotConverged { iterations: usize, last_change: f64 },
    #[error(
        "takeoff weight diverged at W0 = {takeoff_weight:.1} lb (1 - fuel - empty fraction = {denominator:.4})"
    )]
    Diverged {
        takeoff_weight: f64,
        denominator: f64,
    },
}
