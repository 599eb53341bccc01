//! ISA troposphere density model.
//!
//! Valid from sea level to the tropopause (11 000 m / 36 089 ft). Altitudes
//! above that are rejected rather than extrapolated.

use crate::constants::{
    G0, ISA_SEA_LEVEL_DENSITY_KG_M3, ISA_SEA_LEVEL_TEMPERATURE_K, KG_M3_TO_SLUG_FT3, R_AIR,
    TROPOPAUSE_ALTITUDE_M, TROPOSPHERE_LAPSE_RATE_K_M,
};
use crate::units::ft_to_m;
use crate::{DomainError, validate};

/// Air properties at a given altitude and temperature offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereState {
    pub altitude_m: f64,
    /// Offset from the ISA sea-level temperature (K, equivalently °C).
    pub delta_t_k: f64,
    pub sea_level_density_kg_m3: f64,
    pub density_kg_m3: f64,
    /// Density ratio ρ/ρ₀.
    pub sigma: f64,
}

impl AtmosphereState {
    /// Local density in slug/ft³ for the US-customary sizing formulas.
    pub fn density_slug_ft3(&self) -> f64 {
        self.density_kg_m3 * KG_M3_TO_SLUG_FT3
    }
}

/// Density at `altitude_m` for a sea-level temperature offset of `delta_t_k`.
pub fn density(altitude_m: f64, delta_t_k: f64) -> Result<AtmosphereState, DomainError> {
    let altitude_m = validate::in_range("altitude_m", altitude_m, 0.0, TROPOPAUSE_ALTITUDE_M)?;
    let delta_t_k = validate::finite("delta_t_k", delta_t_k)?;

    let t0 = ISA_SEA_LEVEL_TEMPERATURE_K + delta_t_k;
    let base = 1.0 - TROPOSPHERE_LAPSE_RATE_K_M / t0 * altitude_m;
    if t0 <= 0.0 || base <= 0.0 {
        return Err(DomainError::new(
            "delta_t_k",
            delta_t_k,
            "a sea-level temperature above the lapse-rate limit",
        ));
    }

    let exponent = G0 / (R_AIR * TROPOSPHERE_LAPSE_RATE_K_M);
    let sigma = base.powf(exponent);

    Ok(AtmosphereState {
        altitude_m,
        delta_t_k,
        sea_level_density_kg_m3: ISA_SEA_LEVEL_DENSITY_KG_M3,
        density_kg_m3: sigma * ISA_SEA_LEVEL_DENSITY_KG_M3,
        sigma,
    })
}

/// Same as [`density`] with the altitude given in feet.
pub fn density_at_feet(altitude_ft: f64, delta_t_k: f64) -> Result<AtmosphereState, DomainError> {
    let altitude_ft = validate::finite("altitude_ft", altitude_ft)?;
    density(ft_to_m(altitude_ft), delta_t_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn sea_level_standard_day_is_exact() {
        let state = density(0.0, 0.0).unwrap();
        assert_eq!(state.density_kg_m3, 1.225);
        assert_eq!(state.sigma, 1.0);
        assert_eq!(state.sea_level_density_kg_m3, 1.225);
    }

    #[test]
    fn density_decreases_monotonically_with_altitude() {
        let mut previous = density(0.0, 0.0).unwrap().density_kg_m3;
        for step in 1..=110 {
            let rho = density(step as f64 * 100.0, 0.0).unwrap().density_kg_m3;
            assert!(rho < previous, "density rose at {} m", step * 100);
            previous = rho;
        }
    }

    #[test]
    fn temperature_offset_moves_the_lapse_profile() {
        // ρ₀ stays at the ISA value; the offset only changes the lapse ratio.
        let standard = density(2_000.0, 0.0).unwrap();
        let hot = density(2_000.0, 20.0).unwrap();
        let rho0 = standard.sea_level_density_kg_m3;
        assert_eq!(hot.sea_level_density_kg_m3, rho0);
        assert!(hot.sigma > standard.sigma);
        assert_eq!(density(0.0, 20.0).unwrap().sigma, 1.0);
    }

    #[test]
    fn stratosphere_is_rejected() {
        let err = density(11_000.5, 0.0).unwrap_err();
        assert_eq!(err.quantity, "altitude_m");
        assert!(density(-1.0, 0.0).is_err());
        assert!(density(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn feet_entry_point_converts_before_evaluating() {
        let from_ft = density_at_feet(10_000.0, 0.0).unwrap();
        let from_m = density(3_048.0, 0.0).unwrap();
        assert_abs_diff_eq!(from_ft.sigma, from_m.sigma, epsilon = 1e-12);
        assert_abs_diff_eq!(
            from_ft.density_slug_ft3(),
            from_m.density_kg_m3 * 0.001_940_320_3,
            epsilon = 1e-12
        );
        assert!(density_at_feet(40_000.0, 0.0).is_err());
    }
}
