//! Takeoff-parameter (TOP) tables and the quadratic fit used to read them.
//!
//! The empirical charts give takeoff distance as a function of TOP. Sizing
//! needs the inverse, so the fit regresses TOP on distance:
//! `TOP = a·d² + b·d + c`.

pub mod fit;
pub mod table;

pub use fit::QuadraticFit;
pub use table::{TakeoffCriterion, TakeoffDataTable, TakeoffSample};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TakeoffError {
    #[error("failed to read takeoff data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}, column {column}: '{value}' is not a number")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },
    #[error("unknown takeoff criterion '{0}'")]
    UnknownCriterion(String),
    #[error("sample columns differ in length ({x} distances, {y} TOP values)")]
    LengthMismatch { x: usize, y: usize },
    #[error("need at least 3 valid samples for a quadratic fit, found {found}")]
    InsufficientSamples { found: usize },
    #[error("target distance {0} ft must be finite and positive")]
    InvalidDistance(f64),
    #[error("least-squares fit is rank deficient (rank {rank} of 3)")]
    RankDeficient { rank: usize },
    #[error("least-squares solve did not converge: {0}")]
    NotConverged(String),
}

/// TOP read from a fitted chart at one target distance.
#[derive(Debug, Clone, Serialize)]
pub struct TakeoffParameter {
    pub criterion: TakeoffCriterion,
    pub distance_ft: f64,
    pub value: f64,
    pub fit: QuadraticFit,
}

/// Fit the selected criterion and evaluate TOP at `distance_ft`.
pub fn takeoff_parameter(
    table: &TakeoffDataTable,
    criterion: TakeoffCriterion,
    distance_ft: f64,
) -> Result<TakeoffParameter, TakeoffError> {
    if !(distance_ft.is_finite() && distance_ft > 0.0) {
        return Err(TakeoffError::InvalidDistance(distance_ft));
    }
    let (distances, tops): (Vec<f64>, Vec<f64>) = table.pairs(criterion).into_iter().unzip();
    let fit = QuadraticFit::fit(&distances, &tops)?;
    Ok(TakeoffParameter {
        criterion,
        distance_ft,
        value: fit.evaluate(distance_ft),
        fit,
    })
}
