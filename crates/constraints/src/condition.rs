//! Flight conditions, drag polar, and lift-coefficient helpers.

use std::fmt;
use std::str::FromStr;

use sizing_core::{AtmosphereState, DomainError, density_at_feet, validate};

use crate::ConstraintError;

/// Finite-wing CLmax is ~90 % of the airfoil value before sweep.
const WING_CL_FACTOR: f64 = 0.9;
/// Takeoff flap setting derating: CLTO = CLmax / 1.21.
const TAKEOFF_CL_DIVISOR: f64 = 1.21;

/// Altitude and temperature offset, with the atmosphere evaluated once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightCondition {
    pub altitude_ft: f64,
    pub atmosphere: AtmosphereState,
}

impl FlightCondition {
    pub fn new(altitude_ft: f64, delta_t_k: f64) -> Result<Self, DomainError> {
        let altitude_ft = validate::non_negative("altitude_ft", altitude_ft)?;
        Ok(Self {
            altitude_ft,
            atmosphere: density_at_feet(altitude_ft, delta_t_k)?,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.atmosphere.sigma
    }

    pub fn density_slug_ft3(&self) -> f64 {
        self.atmosphere.density_slug_ft3()
    }

    /// `q = ½ρV²` in lb/ft² for a speed in ft/s.
    pub fn dynamic_pressure(&self, speed_ft_s: f64) -> f64 {
        dynamic_pressure(self.density_slug_ft3(), speed_ft_s)
    }
}

/// `½ρV²` in whatever coherent unit system the inputs use.
#[inline]
pub fn dynamic_pressure(density: f64, speed: f64) -> f64 {
    0.5 * density * speed * speed
}

/// Parabolic drag polar `CD = CD0 + CL²/(π·AR·e)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPolar {
    pub aspect_ratio: f64,
    pub oswald_efficiency: f64,
    pub cd0: f64,
}

impl DragPolar {
    pub fn new(aspect_ratio: f64, oswald_efficiency: f64, cd0: f64) -> Result<Self, DomainError> {
        let e = validate::in_range("oswald_efficiency", oswald_efficiency, 1e-6, 1.0)?;
        Ok(Self {
            aspect_ratio: validate::positive("aspect_ratio", aspect_ratio)?,
            oswald_efficiency: e,
            cd0: validate::positive("cd0", cd0)?,
        })
    }

    /// `π·AR·e`.
    pub fn induced_factor(&self) -> f64 {
        std::f64::consts::PI * self.aspect_ratio * self.oswald_efficiency
    }
}

/// Wing CLmax from the airfoil value and quarter-chord sweep: `0.9·Cl·cos Λ`.
pub fn wing_cl_max(airfoil_cl_max: f64, sweep_deg: f64) -> Result<f64, DomainError> {
    let airfoil_cl_max = validate::positive("airfoil_cl_max", airfoil_cl_max)?;
    let sweep_deg = validate::in_range("sweep_deg", sweep_deg, 0.0, 89.0)?;
    let cos_sweep = sweep_deg.to_radians().cos();
    Ok(WING_CL_FACTOR * airfoil_cl_max * cos_sweep)
}

/// Takeoff lift coefficient for a given wing CLmax.
pub fn takeoff_cl(cl_max: f64) -> Result<f64, DomainError> {
    Ok(validate::positive("cl_max", cl_max)? / TAKEOFF_CL_DIVISOR)
}

/// Typical airfoil Clmax by high-lift system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlapConfiguration {
    None,
    Plain,
    Slotted,
    Fowler,
    DoubleSlotted,
    DoubleSlottedSlat,
    TripleSlottedSlat,
}

impl FlapConfiguration {
    pub const ALL: [FlapConfiguration; 7] = [
        FlapConfiguration::None,
        FlapConfiguration::Plain,
        FlapConfiguration::Slotted,
        FlapConfiguration::Fowler,
        FlapConfiguration::DoubleSlotted,
        FlapConfiguration::DoubleSlottedSlat,
        FlapConfiguration::TripleSlottedSlat,
    ];

    pub fn airfoil_cl_max(self) -> f64 {
        match self {
            FlapConfiguration::None => 1.5,
            FlapConfiguration::Plain => 1.8,
            FlapConfiguration::Slotted => 2.2,
            FlapConfiguration::Fowler => 2.5,
            FlapConfiguration::DoubleSlotted => 2.7,
            FlapConfiguration::DoubleSlottedSlat => 3.0,
            FlapConfiguration::TripleSlottedSlat => 3.4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlapConfiguration::None => "none",
            FlapConfiguration::Plain => "plain",
            FlapConfiguration::Slotted => "slotted",
            FlapConfiguration::Fowler => "fowler",
            FlapConfiguration::DoubleSlotted => "double_slotted",
            FlapConfiguration::DoubleSlottedSlat => "double_slotted_slat",
            FlapConfiguration::TripleSlottedSlat => "triple_slotted_slat",
        }
    }
}

impl fmt::Display for FlapConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlapConfiguration {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_");
        FlapConfiguration::ALL
            .into_iter()
            .find(|flap| flap.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ConstraintError::UnknownFlap(s.to_string()))
    }
}

/// Approach type, which sets the landing obstacle-clearance allowance `S_a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachCategory {
    /// 7° glideslope.
    Stol,
    /// Power-off approach.
    GeneralAviation,
    /// 3° glideslope.
    Airliner,
}

impl ApproachCategory {
    pub fn obstacle_allowance_ft(self) -> f64 {
        match self {
            ApproachCategory::Stol => 450.0,
            ApproachCategory::GeneralAviation => 600.0,
            ApproachCategory::Airliner => 1_000.0,
        }
    }
}

impl FromStr for ApproachCategory {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "stol" => Ok(ApproachCategory::Stol),
            "general_aviation" | "ga" => Ok(ApproachCategory::GeneralAviation),
            "airliner" | "transport" => Ok(ApproachCategory::Airliner),
            _ => Err(ConstraintError::UnknownApproach(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn swept_wing_loses_lift() {
        assert_abs_diff_eq!(wing_cl_max(1.8, 0.0).unwrap(), 1.62, epsilon = 1e-12);
        let swept = wing_cl_max(1.8, 35.0).unwrap();
        assert_abs_diff_eq!(swept, 1.62 * 35.0_f64.to_radians().cos(), epsilon = 1e-12);
        assert!(wing_cl_max(1.8, 95.0).is_err());
    }

    #[test]
    fn flap_names_round_trip() {
        for flap in FlapConfiguration::ALL {
            assert_eq!(flap.name().parse::<FlapConfiguration>().unwrap(), flap);
        }
        let double: FlapConfiguration = "Double Slotted".parse().unwrap();
        assert_eq!(double.airfoil_cl_max(), 2.7);
    }

    #[test]
    fn approach_allowances() {
        let stol: ApproachCategory = "STOL".parse().unwrap();
        assert_eq!(stol.obstacle_allowance_ft(), 450.0);
        let airliner: ApproachCategory = "airliner".parse().unwrap();
        assert_eq!(airliner.obstacle_allowance_ft(), 1_000.0);
        assert!("seaplane".parse::<ApproachCategory>().is_err());
    }

    #[test]
    fn condition_rejects_negative_altitude() {
        assert!(FlightCondition::new(-10.0, 0.0).is_err());
        assert!(FlightCondition::new(37_000.0, 0.0).is_err());
        let sea_level = FlightCondition::new(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(sea_level.density_slug_ft3(), 0.002_376_9, epsilon = 1e-6);
    }

    #[test]
    fn drag_polar_rejects_unphysical_inputs() {
        assert!(DragPolar::new(8.0, 0.8, 0.025).is_ok());
        let flat = DragPolar::new(0.0, 0.8, 0.025).unwrap_err();
        assert_eq!(flat.quantity, "aspect_ratio");
        assert!(DragPolar::new(-4.0, 0.8, 0.025).is_err());
        let no_span = DragPolar::new(8.0, 0.0, 0.025).unwrap_err();
        assert_eq!(no_span.quantity, "oswald_efficiency");
        assert!(DragPolar::new(8.0, 1.2, 0.025).is_err());
        let clean = DragPolar::new(8.0, 0.8, 0.0).unwrap_err();
        assert_eq!(clean.quantity, "cd0");
        assert!(DragPolar::new(8.0, 0.8, -0.01).is_err());
        assert!(DragPolar::new(f64::NAN, 0.8, 0.025).is_err());
    }
}
