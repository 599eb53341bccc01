//! Unified error type for the sizing pipeline.

use std::fmt;

use sizing_config::ConfigError;
use sizing_constraints::ConstraintError;
use sizing_core::DomainError;
use sizing_optimizer::OptimizerError;
use sizing_takeoff::TakeoffError;
use sizing_weight::WeightError;

/// Coarse classification shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input outside the range where a model is valid.
    Domain,
    /// Iteration budget exceeded or a singular solve.
    Convergence,
    /// Unknown catalog key, too few samples, or a malformed file.
    Data,
    /// No design point satisfies every requirement in the box.
    Infeasible,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Domain => "domain",
            ErrorKind::Convergence => "convergence",
            ErrorKind::Data => "data",
            ErrorKind::Infeasible => "infeasible",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SizingError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("weight estimate failed: {0}")]
    Weight(#[from] WeightError),
    #[error("takeoff parameter failed: {0}")]
    Takeoff(#[from] TakeoffError),
    #[error("constraint analysis failed: {0}")]
    Constraint(#[from] ConstraintError),
    #[error("design point search failed: {0}")]
    Optimizer(#[from] OptimizerError),
    #[error("case '{case}' is missing {what}")]
    MissingInput { case: String, what: &'static str },
}

impl SizingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SizingError::Domain(_) => ErrorKind::Domain,
            SizingError::Config(_) | SizingError::MissingInput { .. } => ErrorKind::Data,
            SizingError::Weight(err) => match err {
                WeightError::Domain(_) | WeightError::InvalidFraction { .. } => ErrorKind::Domain,
                WeightError::NotConverged { .. } | WeightError::Diverged { .. } => {
                    ErrorKind::Convergence
                }
            },
            SizingError::Takeoff(err) => match err {
                TakeoffError::InvalidDistance(_) => ErrorKind::Domain,
                TakeoffError::RankDeficient { .. } | TakeoffError::NotConverged(_) => {
                    ErrorKind::Convergence
                }
                TakeoffError::Csv(_)
                | TakeoffError::Parse { .. }
                | TakeoffError::UnknownCriterion(_)
                | TakeoffError::LengthMismatch { .. }
                | TakeoffError::InsufficientSamples { .. } => ErrorKind::Data,
            },
            SizingError::Constraint(err) => match err {
                ConstraintError::Domain(_) | ConstraintError::NoSolution { .. } => {
                    ErrorKind::Domain
                }
                ConstraintError::UnknownFlap(_) | ConstraintError::UnknownApproach(_) => {
                    ErrorKind::Data
                }
            },
            SizingError::Optimizer(err) => match err {
                OptimizerError::InvalidBounds { .. } | OptimizerError::InvalidSetting { .. } => {
                    ErrorKind::Domain
                }
                OptimizerError::Infeasible { .. } => ErrorKind::Infeasible,
                OptimizerError::NotConverged { .. } => ErrorKind::Convergence,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_source_component() {
        let domain: SizingError = DomainError::new("speed", -1.0, "> 0").into();
        assert_eq!(domain.kind(), ErrorKind::Domain);

        let diverged: SizingError = WeightError::Diverged {
            takeoff_weight: 1.0,
            denominator: -0.1,
        }
        .into();
        assert_eq!(diverged.kind(), ErrorKind::Convergence);

        let samples: SizingError = TakeoffError::InsufficientSamples { found: 2 }.into();
        assert_eq!(samples.kind(), ErrorKind::Data);

        let infeasible: SizingError = OptimizerError::Infeasible {
            predicate: "stall".into(),
            violation: 3.0,
        }
        .into();
        assert_eq!(infeasible.kind(), ErrorKind::Infeasible);
        assert_eq!(infeasible.kind().to_string(), "infeasible");
    }
}
