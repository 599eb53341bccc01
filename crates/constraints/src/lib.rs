//! Constraint analysis for the wing-loading / power-loading matching chart.
//!
//! All formulas work in US customary units: W/S in lb/ft², W/P in lb/hp,
//! distances in ft, speeds in ft/s and density in slug/ft³. Callers convert
//! at the boundary with [`sizing_core::units`].

pub mod condition;
pub mod requirement;
pub mod set;

pub use condition::{
    ApproachCategory, DragPolar, FlapConfiguration, FlightCondition, dynamic_pressure, takeoff_cl,
    wing_cl_max,
};
pub use requirement::{
    BestLiftToDrag, InstantTurn, Landing, SpeedObjective, Stall, Takeoff, ThrustMatched,
    WingLoadingBand, load_factor_for_turn_rate, stall_wing_loading, thrust_to_weight,
};
pub use set::{Constraint, ConstraintCurve, ConstraintSet, CurvePoint, power_loading_grid};

use sizing_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("no wing loading satisfies the requirement at W/P = {power_loading} lb/hp")]
    NoSolution { power_loading: f64 },
    #[error("unknown flap configuration '{0}'")]
    UnknownFlap(String),
    #[error("unknown approach category '{0}'")]
    UnknownApproach(String),
}
