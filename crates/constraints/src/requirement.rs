//! Individual performance requirements on wing loading (W/S, lb/ft²) and
//! power loading (W/P, lb/hp).
//!
//! Every requirement is validated when it is built, so the wing-loading
//! evaluations below only fail when the requirement has no solution at the
//! requested power loading.

use serde::Serialize;
use sizing_core::constants::{G0_FT_S2, HORSEPOWER_FT_LBF_S, PROPELLER_EFFICIENCY};
use sizing_core::{DomainError, validate};

use crate::ConstraintError;
use crate::condition::{DragPolar, FlightCondition, dynamic_pressure};

/// Landing-distance denominator for the empirical `(S − Sa)·σ·CLmax / 80` fit.
const LANDING_DIVISOR: f64 = 80.0;
/// Service ceiling is where the best rate of climb drops to 100 ft/min.
const CEILING_CLIMB_RATE_FT_S: f64 = 100.0 / 60.0;
/// Floor applied to loadings before they reach a denominator.
const LOADING_FLOOR: f64 = 1e-6;

/// Wing loading at which the wing stalls at `stall_speed`.
///
/// Unit-coherent: SI inputs give N/m², slug/ft³ with ft/s gives lb/ft².
pub fn stall_wing_loading(density: f64, stall_speed: f64, cl_max: f64) -> Result<f64, DomainError> {
    let density = validate::positive("density", density)?;
    let stall_speed = validate::positive("stall_speed", stall_speed)?;
    let cl_max = validate::positive("cl_max", cl_max)?;
    Ok(dynamic_pressure(density, stall_speed) * cl_max)
}

/// Thrust-to-weight from power loading for a propeller at `speed_ft_s`.
pub fn thrust_to_weight(power_loading: f64, speed_ft_s: f64) -> f64 {
    HORSEPOWER_FT_LBF_S * PROPELLER_EFFICIENCY / (speed_ft_s * power_loading.max(LOADING_FLOOR))
}

/// Stall speed at the runway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stall {
    pub condition: FlightCondition,
    pub speed_ft_s: f64,
    pub cl_max: f64,
    limit: f64,
}

impl Stall {
    pub fn new(
        condition: FlightCondition,
        speed_ft_s: f64,
        cl_max: f64,
    ) -> Result<Self, DomainError> {
        let limit = stall_wing_loading(condition.density_slug_ft3(), speed_ft_s, cl_max)?;
        Ok(Self {
            condition,
            speed_ft_s,
            cl_max,
            limit,
        })
    }

    pub fn wing_loading(&self) -> f64 {
        self.limit
    }
}

/// Takeoff distance through the takeoff parameter: `W/S = TOP·σ·CLTO / (W/P)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Takeoff {
    pub condition: FlightCondition,
    pub top: f64,
    pub cl_takeoff: f64,
}

impl Takeoff {
    pub fn new(condition: FlightCondition, top: f64, cl_takeoff: f64) -> Result<Self, DomainError> {
        Ok(Self {
            condition,
            top: validate::positive("top", top)?,
            cl_takeoff: validate::positive("cl_takeoff", cl_takeoff)?,
        })
    }

    pub fn wing_loading(&self, power_loading: f64) -> Result<f64, DomainError> {
        let power_loading = validate::positive("power_loading", power_loading)?;
        Ok(self.numerator() / power_loading)
    }

    fn numerator(&self) -> f64 {
        self.top * self.condition.sigma() * self.cl_takeoff
    }
}

/// Landing distance: `W/S = (S_land − S_a)·σ·CLmax / 80`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub condition: FlightCondition,
    pub distance_ft: f64,
    pub obstacle_allowance_ft: f64,
    pub cl_max: f64,
    limit: f64,
}

impl Landing {
    pub fn new(
        condition: FlightCondition,
        distance_ft: f64,
        obstacle_allowance_ft: f64,
        cl_max: f64,
    ) -> Result<Self, DomainError> {
        let obstacle_allowance_ft =
            validate::non_negative("obstacle_allowance_ft", obstacle_allowance_ft)?;
        let distance_ft = validate::positive("landing_distance_ft", distance_ft)?;
        if distance_ft <= obstacle_allowance_ft {
            return Err(DomainError::new(
                "landing_distance_ft",
                distance_ft,
                format!("> obstacle allowance of {obstacle_allowance_ft} ft"),
            ));
        }
        let cl_max = validate::positive("cl_max", cl_max)?;
        let run_ft = distance_ft - obstacle_allowance_ft;
        let limit = run_ft * condition.sigma() * cl_max / LANDING_DIVISOR;
        Ok(Self {
            condition,
            distance_ft,
            obstacle_allowance_ft,
            cl_max,
            limit,
        })
    }

    pub fn wing_loading(&self) -> f64 {
        self.limit
    }
}

/// Which lift-to-drag optimum a speed requirement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedObjective {
    /// Maximum range for a propeller aircraft: `CD0 = CDi`.
    Range,
    /// Maximum endurance for a propeller aircraft: `3·CD0 = CDi`.
    Endurance,
}

impl SpeedObjective {
    fn induced_ratio(self) -> f64 {
        match self {
            SpeedObjective::Range => 1.0,
            SpeedObjective::Endurance => 3.0,
        }
    }
}

/// Best-L/D wing loading at a given speed and altitude: `q·sqrt(k·π·AR·e·CD0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestLiftToDrag {
    pub condition: FlightCondition,
    pub speed_ft_s: f64,
    pub polar: DragPolar,
    pub objective: SpeedObjective,
    limit: f64,
}

impl BestLiftToDrag {
    pub fn new(
        condition: FlightCondition,
        speed_ft_s: f64,
        polar: DragPolar,
        objective: SpeedObjective,
    ) -> Result<Self, DomainError> {
        let speed_ft_s = validate::positive("speed_ft_s", speed_ft_s)?;
        let q = condition.dynamic_pressure(speed_ft_s);
        let limit = q * (objective.induced_ratio() * polar.induced_factor() * polar.cd0).sqrt();
        Ok(Self {
            condition,
            speed_ft_s,
            polar,
            objective,
            limit,
        })
    }

    pub fn wing_loading(&self) -> f64 {
        self.limit
    }
}

/// Instantaneous turn rate: `n = sqrt((ψ·V/g)² + 1)`, `W/S = q·CLmax / n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantTurn {
    pub condition: FlightCondition,
    pub speed_ft_s: f64,
    pub turn_rate_rad_s: f64,
    pub cl_max: f64,
    limit: f64,
}

impl InstantTurn {
    pub fn new(
        condition: FlightCondition,
        speed_ft_s: f64,
        turn_rate_rad_s: f64,
        cl_max: f64,
    ) -> Result<Self, DomainError> {
        let speed_ft_s = validate::positive("speed_ft_s", speed_ft_s)?;
        let turn_rate_rad_s = validate::non_negative("turn_rate_rad_s", turn_rate_rad_s)?;
        let cl_max = validate::positive("cl_max_combat", cl_max)?;
        let n = load_factor_for_turn_rate(turn_rate_rad_s, speed_ft_s);
        let limit = condition.dynamic_pressure(speed_ft_s) * cl_max / n;
        Ok(Self {
            condition,
            speed_ft_s,
            turn_rate_rad_s,
            cl_max,
            limit,
        })
    }

    pub fn load_factor(&self) -> f64 {
        load_factor_for_turn_rate(self.turn_rate_rad_s, self.speed_ft_s)
    }

    pub fn wing_loading(&self) -> f64 {
        self.limit
    }
}

/// Load factor of a level turn at `turn_rate_rad_s` and `speed_ft_s`.
pub fn load_factor_for_turn_rate(turn_rate_rad_s: f64, speed_ft_s: f64) -> f64 {
    let x = turn_rate_rad_s * speed_ft_s / G0_FT_S2;
    (x * x + 1.0).sqrt()
}

/// Both wing loadings at which available thrust exactly matches the drag of
/// a thrust-matched requirement. Any W/S between them is feasible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WingLoadingBand {
    pub lower: f64,
    pub upper: f64,
}

/// Requirements of the form `T/W = q·CD0/(W/S) + (W/S)·n²/(q·π·AR·e) + G`.
///
/// Climb uses `n = 1` and the given gradient (negative for a glide), ceiling
/// uses `n = 1` with a 100 ft/min climb, and a sustained turn uses the load
/// factor with `G = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustMatched {
    pub condition: FlightCondition,
    pub speed_ft_s: f64,
    pub polar: DragPolar,
    pub load_factor: f64,
    pub climb_gradient: f64,
}

impl ThrustMatched {
    pub fn climb(
        condition: FlightCondition,
        speed_ft_s: f64,
        polar: DragPolar,
        gradient: f64,
    ) -> Result<Self, DomainError> {
        let gradient = validate::finite("climb_gradient", gradient)?;
        Self::new(condition, speed_ft_s, polar, 1.0, gradient)
    }

    pub fn ceiling(
        condition: FlightCondition,
        speed_ft_s: f64,
        polar: DragPolar,
    ) -> Result<Self, DomainError> {
        let speed_ft_s = validate::positive("speed_ft_s", speed_ft_s)?;
        let gradient = CEILING_CLIMB_RATE_FT_S / speed_ft_s;
        Self::new(condition, speed_ft_s, polar, 1.0, gradient)
    }

    pub fn sustained_turn(
        condition: FlightCondition,
        speed_ft_s: f64,
        polar: DragPolar,
        load_factor: f64,
    ) -> Result<Self, DomainError> {
        let load_factor = validate::at_least("load_factor", load_factor, 1.0)?;
        Self::new(condition, speed_ft_s, polar, load_factor, 0.0)
    }

    fn new(
        condition: FlightCondition,
        speed_ft_s: f64,
        polar: DragPolar,
        load_factor: f64,
        climb_gradient: f64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            condition,
            speed_ft_s: validate::positive("speed_ft_s", speed_ft_s)?,
            polar,
            load_factor,
            climb_gradient,
        })
    }

    fn dynamic_pressure(&self) -> f64 {
        self.condition.dynamic_pressure(self.speed_ft_s)
    }

    /// `n²/(q·π·AR·e)`, the coefficient of the W/S term.
    fn induced_coefficient(&self) -> f64 {
        let n2 = self.load_factor * self.load_factor;
        n2 / (self.dynamic_pressure() * self.polar.induced_factor())
    }

    /// Thrust-to-weight needed at `wing_loading`.
    pub fn required_thrust_to_weight(&self, wing_loading: f64) -> f64 {
        let ws = wing_loading.max(LOADING_FLOOR);
        self.dynamic_pressure() * self.polar.cd0 / ws
            + ws * self.induced_coefficient()
            + self.climb_gradient
    }

    /// Thrust-to-weight available from a propeller at `power_loading`.
    pub fn available_thrust_to_weight(&self, power_loading: f64) -> f64 {
        thrust_to_weight(power_loading, self.speed_ft_s)
    }

    /// Roots of the thrust-matching quadratic in W/S at `power_loading`.
    pub fn wing_loading_band(
        &self,
        power_loading: f64,
    ) -> Result<WingLoadingBand, ConstraintError> {
        let power_loading = validate::positive("power_loading", power_loading)?;
        let net = self.available_thrust_to_weight(power_loading) - self.climb_gradient;
        let a = self.induced_coefficient();
        let discriminant = net * net - 4.0 * a * self.dynamic_pressure() * self.polar.cd0;
        if net <= 0.0 || discriminant < 0.0 {
            return Err(ConstraintError::NoSolution { power_loading });
        }
        let root = discriminant.sqrt();
        Ok(WingLoadingBand {
            lower: (net - root) / (2.0 * a),
            upper: (net + root) / (2.0 * a),
        })
    }

    /// Upper root of [`Self::wing_loading_band`].
    pub fn wing_loading(&self, power_loading: f64) -> Result<f64, ConstraintError> {
        Ok(self.wing_loading_band(power_loading)?.upper)
    }

    /// Excess thrust-to-weight at the design point. Non-negative is feasible.
    pub fn margin(&self, wing_loading: f64, power_loading: f64) -> f64 {
        self.available_thrust_to_weight(power_loading)
            - self.required_thrust_to_weight(wing_loading)
    }
}
