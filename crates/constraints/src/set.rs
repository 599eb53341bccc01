//! The full set of requirements drawn on one matching chart.

use serde::Serialize;
use sizing_core::validate;

use crate::ConstraintError;
use crate::requirement::{
    BestLiftToDrag, InstantTurn, Landing, Stall, Takeoff, ThrustMatched, WingLoadingBand,
};

/// One requirement on the (W/S, W/P) plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    Stall(Stall),
    Takeoff(Takeoff),
    Landing(Landing),
    Cruise(BestLiftToDrag),
    Loiter(BestLiftToDrag),
    Climb(ThrustMatched),
    Ceiling(ThrustMatched),
    InstantTurn(InstantTurn),
    SustainedTurn(ThrustMatched),
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Stall(_) => "stall",
            Constraint::Takeoff(_) => "takeoff",
            Constraint::Landing(_) => "landing",
            Constraint::Cruise(_) => "cruise",
            Constraint::Loiter(_) => "loiter",
            Constraint::Climb(_) => "climb",
            Constraint::Ceiling(_) => "ceiling",
            Constraint::InstantTurn(_) => "instant_turn",
            Constraint::SustainedTurn(_) => "sustained_turn",
        }
    }

    /// Whether the limiting W/S changes with W/P.
    pub fn depends_on_power_loading(&self) -> bool {
        matches!(
            self,
            Constraint::Takeoff(_)
                | Constraint::Climb(_)
                | Constraint::Ceiling(_)
                | Constraint::SustainedTurn(_)
        )
    }

    /// Limiting wing loading at `power_loading`. For thrust-matched
    /// requirements this is the upper root.
    pub fn wing_loading(&self, power_loading: f64) -> Result<f64, ConstraintError> {
        let power_loading = validate::positive("power_loading", power_loading)?;
        Ok(match self {
            Constraint::Stall(c) => c.wing_loading(),
            Constraint::Takeoff(c) => c.wing_loading(power_loading)?,
            Constraint::Landing(c) => c.wing_loading(),
            Constraint::Cruise(c) | Constraint::Loiter(c) => c.wing_loading(),
            Constraint::InstantTurn(c) => c.wing_loading(),
            Constraint::Climb(c) | Constraint::Ceiling(c) | Constraint::SustainedTurn(c) => {
                c.wing_loading(power_loading)?
            }
        })
    }

    /// Both roots for thrust-matched requirements, `None` for the others.
    pub fn band(&self, power_loading: f64) -> Option<Result<WingLoadingBand, ConstraintError>> {
        match self {
            Constraint::Climb(c) | Constraint::Ceiling(c) | Constraint::SustainedTurn(c) => {
                Some(c.wing_loading_band(power_loading))
            }
            _ => None,
        }
    }

    /// Signed satisfaction at a design point; `>= 0` means satisfied.
    pub fn margin(&self, wing_loading: f64, power_loading: f64) -> f64 {
        match self {
            Constraint::Stall(c) => c.wing_loading() - wing_loading,
            Constraint::Landing(c) => c.wing_loading() - wing_loading,
            Constraint::Cruise(c) | Constraint::Loiter(c) => c.wing_loading() - wing_loading,
            Constraint::InstantTurn(c) => c.wing_loading() - wing_loading,
            Constraint::Takeoff(c) => {
                c.top * c.condition.sigma() * c.cl_takeoff / power_loading.max(f64::MIN_POSITIVE)
                    - wing_loading
            }
            Constraint::Climb(c) | Constraint::Ceiling(c) | Constraint::SustainedTurn(c) => {
                c.margin(wing_loading, power_loading)
            }
        }
    }

    /// Curve samples at each power loading. Points where the requirement
    /// has no solution are left out.
    pub fn curve(&self, power_loadings: &[f64]) -> ConstraintCurve {
        let points = power_loadings
            .iter()
            .filter_map(|&wp| {
                self.wing_loading(wp).ok().map(|ws| CurvePoint {
                    wing_loading: ws,
                    power_loading: wp,
                })
            })
            .collect();
        ConstraintCurve {
            name: self.name().to_string(),
            points,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub wing_loading: f64,
    pub power_loading: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintCurve {
    pub name: String,
    pub points: Vec<CurvePoint>,
}

/// Evenly spaced power loadings over `[lo, hi]`, inclusive.
pub fn power_loading_grid(lo: f64, hi: f64, count: usize) -> Result<Vec<f64>, ConstraintError> {
    let lo = validate::positive("power_loading_min", lo)?;
    let hi = validate::positive("power_loading_max", hi)?;
    if hi < lo {
        return Err(ConstraintError::Domain(sizing_core::DomainError::new(
            "power_loading_max",
            hi,
            format!(">= {lo}"),
        )));
    }
    Ok(match count {
        0 => Vec::new(),
        1 => vec![lo],
        n => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    })
}

/// Ordered collection of active requirements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a requirement, replacing an existing one of the same kind.
    pub fn insert(&mut self, constraint: Constraint) {
        match self
            .constraints
            .iter_mut()
            .find(|c| c.name() == constraint.name())
        {
            Some(slot) => *slot = constraint,
            None => self.constraints.push(constraint),
        }
    }

    /// Drop a requirement by name. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.constraints.len();
        self.constraints.retain(|c| !c.name().eq_ignore_ascii_case(name));
        before != self.constraints.len()
    }

    pub fn get(&self, name: &str) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Smallest margin over the set, with the name of the binding requirement.
    pub fn worst_margin(
        &self,
        wing_loading: f64,
        power_loading: f64,
    ) -> Option<(&'static str, f64)> {
        self.constraints
            .iter()
            .map(|c| (c.name(), c.margin(wing_loading, power_loading)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn is_feasible(&self, wing_loading: f64, power_loading: f64) -> bool {
        self.constraints
            .iter()
            .all(|c| c.margin(wing_loading, power_loading) >= 0.0)
    }

    pub fn curves(&self, power_loadings: &[f64]) -> Vec<ConstraintCurve> {
        self.constraints
            .iter()
            .map(|c| c.curve(power_loadings))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
