//! Core units, constants, and shared primitives for the aircraft sizing workspace.

pub mod atmosphere;

pub use atmosphere::{AtmosphereState, density, density_at_feet};

use thiserror::Error;

/// Physical constants. SI unless the name says otherwise.
pub mod constants {
    /// Standard gravity (m/s²).
    pub const G0: f64 = 9.80665;
    /// Standard gravity in US customary units (ft/s²).
    pub const G0_FT_S2: f64 = 32.174;
    /// Specific gas constant for dry air (J/(kg·K)).
    pub const R_AIR: f64 = 287.053;
    /// ISA sea-level temperature (K).
    pub const ISA_SEA_LEVEL_TEMPERATURE_K: f64 = 288.15;
    /// ISA sea-level density (kg/m³).
    pub const ISA_SEA_LEVEL_DENSITY_KG_M3: f64 = 1.225;
    /// Troposphere lapse rate (K/m).
    pub const TROPOSPHERE_LAPSE_RATE_K_M: f64 = 6.5 / 1_000.0;
    /// Upper altitude limit of the troposphere model (m).
    pub const TROPOPAUSE_ALTITUDE_M: f64 = 11_000.0;
    /// kg/m³ → slug/ft³.
    pub const KG_M3_TO_SLUG_FT3: f64 = 0.001_940_320_3;
    /// One horsepower in ft·lbf/s.
    pub const HORSEPOWER_FT_LBF_S: f64 = 550.0;
    /// Propeller efficiency assumed throughout conceptual sizing.
    pub const PROPELLER_EFFICIENCY: f64 = 0.8;
}

/// Unit conversion helpers used at the crate boundaries.
pub mod units {
    /// Metres per foot.
    pub const M_PER_FT: f64 = 0.3048;
    /// Feet per metre.
    pub const FT_PER_M: f64 = 3.280_84;
    /// Feet per second per knot.
    pub const FT_S_PER_KNOT: f64 = 1.687_664;
    /// Metres per second per knot.
    pub const M_S_PER_KNOT: f64 = 0.514_444;
    /// Feet per nautical mile.
    pub const FT_PER_NMI: f64 = 6_076.115;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * M_PER_FT
    }

    /// Convert metres to feet.
    #[inline]
    pub fn m_to_ft(v: f64) -> f64 {
        v * FT_PER_M
    }

    /// Convert knots to feet per second.
    #[inline]
    pub fn knots_to_ft_s(v: f64) -> f64 {
        v * FT_S_PER_KNOT
    }

    /// Convert knots to metres per second.
    #[inline]
    pub fn knots_to_m_s(v: f64) -> f64 {
        v * M_S_PER_KNOT
    }

    /// Convert nautical miles to feet.
    #[inline]
    pub fn nmi_to_ft(v: f64) -> f64 {
        v * FT_PER_NMI
    }

    /// Convert hours to seconds.
    #[inline]
    pub fn hours_to_seconds(v: f64) -> f64 {
        v * SECONDS_PER_HOUR
    }

    /// Convert a per-hour rate (e.g. SFC in 1/hr) to a per-second rate.
    #[inline]
    pub fn per_hour_to_per_second(v: f64) -> f64 {
        v / SECONDS_PER_HOUR
    }

    /// Convert degrees per second to radians per second.
    #[inline]
    pub fn deg_s_to_rad_s(v: f64) -> f64 {
        v.to_radians()
    }
}

/// An input lies outside the range where a model is valid.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{quantity} = {value} is out of range (expected {expected})")]
pub struct DomainError {
    pub quantity: &'static str,
    pub value: f64,
    pub expected: String,
}

impl DomainError {
    pub fn new(quantity: &'static str, value: f64, expected: impl Into<String>) -> Self {
        Self {
            quantity,
            value,
            expected: expected.into(),
        }
    }
}

/// Boundary checks shared by every component.
pub mod validate {
    use super::DomainError;

    /// Finite and strictly positive.
    pub fn positive(quantity: &'static str, value: f64) -> Result<f64, DomainError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(DomainError::new(quantity, value, "> 0"))
        }
    }

    /// Finite and not negative.
    pub fn non_negative(quantity: &'static str, value: f64) -> Result<f64, DomainError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(DomainError::new(quantity, value, ">= 0"))
        }
    }

    /// Finite and not below `lo`.
    pub fn at_least(quantity: &'static str, value: f64, lo: f64) -> Result<f64, DomainError> {
        if value.is_finite() && value >= lo {
            Ok(value)
        } else {
            Err(DomainError::new(quantity, value, format!(">= {lo}")))
        }
    }

    /// Finite, any sign.
    pub fn finite(quantity: &'static str, value: f64) -> Result<f64, DomainError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DomainError::new(quantity, value, "a finite number"))
        }
    }

    /// Finite and inside the closed interval `[lo, hi]`.
    pub fn in_range(
        quantity: &'static str,
        value: f64,
        lo: f64,
        hi: f64,
    ) -> Result<f64, DomainError> {
        if value.is_finite() && (lo..=hi).contains(&value) {
            Ok(value)
        } else {
            Err(DomainError::new(quantity, value, format!("[{lo}, {hi}]")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn knots_round_trip_through_ft_s() {
        assert_abs_diff_eq!(units::knots_to_ft_s(100.0), 168.7664, epsilon = 1e-9);
        assert_abs_diff_eq!(units::knots_to_m_s(50.0), 25.7222, epsilon = 1e-9);
    }

    #[test]
    fn validation_rejects_nan_and_zero() {
        assert!(validate::positive("speed", 0.0).is_err());
        assert!(validate::positive("speed", f64::NAN).is_err());
        assert!(validate::non_negative("payload", 0.0).is_ok());
        let err = validate::in_range("altitude", 12_000.0, 0.0, 11_000.0).unwrap_err();
        assert_eq!(err.quantity, "altitude");
        assert!(err.to_string().contains("[0, 11000]"));
    }

    #[test]
    fn lower_bound_is_inclusive_and_reported_plainly() {
        assert_eq!(validate::at_least("load_factor", 1.0, 1.0), Ok(1.0));
        let err = validate::at_least("load_factor", 0.5, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "load_factor = 0.5 is out of range (expected >= 1)"
        );
        let unbounded = validate::at_least("load_factor", f64::INFINITY, 1.0);
        assert!(unbounded.is_err());
    }
}
