//! Mission segments and their historical / Breguet weight fractions.

use serde::Serialize;
use sizing_core::constants::{HORSEPOWER_FT_LBF_S, PROPELLER_EFFICIENCY};
use sizing_core::units::per_hour_to_per_second;
use sizing_core::validate;

use crate::WeightError;

const TAKEOFF_FRACTION: f64 = 0.97;
const CLIMB_FRACTION: f64 = 0.985;
const LANDING_FRACTION: f64 = 0.995;
/// L/D penalty for the flight phase flown away from the L/D-max condition.
const OFF_OPTIMUM_LD_FACTOR: f64 = 0.866;

/// Engine family; decides the SFC conversion and which phase gets L/D max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    Jet,
    Propeller,
}

/// Thrust-specific fuel consumption for cruise and loiter (1/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propulsion {
    pub kind: EngineKind,
    pub sfc_cruise_per_s: f64,
    pub sfc_loiter_per_s: f64,
}

impl Propulsion {
    /// Jet SFC tabulated in 1/hr.
    pub fn jet(sfc_cruise_per_hr: f64, sfc_loiter_per_hr: f64) -> Result<Self, WeightError> {
        Ok(Self {
            kind: EngineKind::Jet,
            sfc_cruise_per_s: per_hour_to_per_second(validate::positive(
                "sfc_cruise",
                sfc_cruise_per_hr,
            )?),
            sfc_loiter_per_s: per_hour_to_per_second(validate::positive(
                "sfc_loiter",
                sfc_loiter_per_hr,
            )?),
        })
    }

    /// Propeller brake SFC tabulated in lb/(hr·bhp), converted to an equivalent
    /// thrust SFC at the phase speed: `C = C_bhp · V / (550 · η_p)`.
    pub fn propeller(
        bsfc_cruise: f64,
        bsfc_loiter: f64,
        cruise_speed_ft_s: f64,
        loiter_speed_ft_s: f64,
    ) -> Result<Self, WeightError> {
        let bsfc_cruise = validate::positive("sfc_cruise", bsfc_cruise)?;
        let bsfc_loiter = validate::positive("sfc_loiter", bsfc_loiter)?;
        let cruise_speed = validate::positive("cruise_speed_ft_s", cruise_speed_ft_s)?;
        let loiter_speed = validate::positive("loiter_speed_ft_s", loiter_speed_ft_s)?;
        let shaft = HORSEPOWER_FT_LBF_S * PROPELLER_EFFICIENCY;
        Ok(Self {
            kind: EngineKind::Propeller,
            sfc_cruise_per_s: per_hour_to_per_second(bsfc_cruise * cruise_speed / shaft),
            sfc_loiter_per_s: per_hour_to_per_second(bsfc_loiter * loiter_speed / shaft),
        })
    }
}

/// Cruise and loiter lift-to-drag ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub ld_max: f64,
    pub ld_cruise: f64,
    pub ld_loiter: f64,
}

impl Aerodynamics {
    /// `L/D_max = K_LD · sqrt(AR / (S_wet/S_ref))`. Jets cruise off-optimum and
    /// loiter at L/D max; propeller aircraft do the reverse.
    pub fn estimate(
        k_ld: f64,
        aspect_ratio: f64,
        wetted_area_ratio: f64,
        kind: EngineKind,
    ) -> Result<Self, WeightError> {
        let k_ld = validate::positive("k_ld", k_ld)?;
        let aspect_ratio = validate::positive("aspect_ratio", aspect_ratio)?;
        let wetted_area_ratio = validate::positive("wetted_area_ratio", wetted_area_ratio)?;
        let ld_max = k_ld * (aspect_ratio / wetted_area_ratio).sqrt();
        let (ld_cruise, ld_loiter) = match kind {
            EngineKind::Jet => (OFF_OPTIMUM_LD_FACTOR * ld_max, ld_max),
            EngineKind::Propeller => (ld_max, OFF_OPTIMUM_LD_FACTOR * ld_max),
        };
        Ok(Self {
            ld_max,
            ld_cruise,
            ld_loiter,
        })
    }
}

/// Everything the Breguet segments need besides their own length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPerformance {
    pub cruise_speed_ft_s: f64,
    pub propulsion: Propulsion,
    pub aerodynamics: Aerodynamics,
}

/// One leg of the sizing mission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissionSegment {
    Takeoff,
    Climb,
    Cruise { range_ft: f64 },
    Loiter { endurance_s: f64 },
    Landing,
}

impl MissionSegment {
    pub fn name(&self) -> &'static str {
        match self {
            MissionSegment::Takeoff => "takeoff",
            MissionSegment::Climb => "climb",
            MissionSegment::Cruise { .. } => "cruise",
            MissionSegment::Loiter { .. } => "loiter",
            MissionSegment::Landing => "landing",
        }
    }

    /// End weight over start weight for this leg.
    pub fn weight_fraction(&self, performance: &FlightPerformance) -> Result<f64, WeightError> {
        let fraction = match *self {
            MissionSegment::Takeoff => TAKEOFF_FRACTION,
            MissionSegment::Climb => CLIMB_FRACTION,
            MissionSegment::Landing => LANDING_FRACTION,
            MissionSegment::Cruise { range_ft } => {
                let range = validate::non_negative("range_ft", range_ft)?;
                let speed = validate::positive("cruise_speed_ft_s", performance.cruise_speed_ft_s)?;
                let c = validate::positive("sfc_cruise", performance.propulsion.sfc_cruise_per_s)?;
                let ld = validate::positive("ld_cruise", performance.aerodynamics.ld_cruise)?;
                (-range * c / (speed * ld)).exp()
            }
            MissionSegment::Loiter { endurance_s } => {
                let endurance = validate::non_negative("endurance_s", endurance_s)?;
                let c = validate::positive("sfc_loiter", performance.propulsion.sfc_loiter_per_s)?;
                let ld = validate::positive("ld_loiter", performance.aerodynamics.ld_loiter)?;
                (-endurance * c / ld).exp()
            }
        };
        if fraction > 0.0 && fraction <= 1.0 {
            Ok(fraction)
        } else {
            Err(WeightError::InvalidFraction {
                segment: self.name(),
                fraction,
            })
        }
    }
}

/// A segment together with its computed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentFraction {
    pub segment: MissionSegment,
    pub fraction: f64,
}

/// Ordered mission legs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionProfile {
    pub segments: Vec<MissionSegment>,
}

impl MissionProfile {
    pub fn new(segments: Vec<MissionSegment>) -> Self {
        Self { segments }
    }

    pub fn segment_fractions(
        &self,
        performance: &FlightPerformance,
    ) -> Result<Vec<SegmentFraction>, WeightError> {
        self.segments
            .iter()
            .map(|segment| {
                Ok(SegmentFraction {
                    segment: *segment,
                    fraction: segment.weight_fraction(performance)?,
                })
            })
            .collect()
    }
}

/// Mission fuel fraction `1 − Π fractions`.
pub fn fuel_fraction(fractions: &[f64]) -> f64 {
    1.0 - fractions.iter().product::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn jet_performance() -> FlightPerformance {
        let propulsion = Propulsion::jet(0.5, 0.4).unwrap();
        let aerodynamics = Aerodynamics::estimate(15.5, 9.0, 6.0, EngineKind::Jet).unwrap();
        FlightPerformance {
            cruise_speed_ft_s: 800.0,
            propulsion,
            aerodynamics,
        }
    }

    #[test]
    fn unity_fractions_burn_no_fuel() {
        assert_eq!(fuel_fraction(&[1.0]), 0.0);
        let zero_range = MissionSegment::Cruise { range_ft: 0.0 };
        let fraction = zero_range.weight_fraction(&jet_performance()).unwrap();
        assert_eq!(fraction, 1.0);
        assert_eq!(fuel_fraction(&[fraction]), 0.0);
        let zero_loiter = MissionSegment::Loiter { endurance_s: 0.0 };
        assert_eq!(zero_loiter.weight_fraction(&jet_performance()).unwrap(), 1.0);
    }

    #[test]
    fn historical_fractions_match_table() {
        let perf = jet_performance();
        let takeoff = MissionSegment::Takeoff.weight_fraction(&perf).unwrap();
        assert_eq!(takeoff, 0.97);
        let climb = MissionSegment::Climb.weight_fraction(&perf).unwrap();
        assert_eq!(climb, 0.985);
        let landing = MissionSegment::Landing.weight_fraction(&perf).unwrap();
        assert_eq!(landing, 0.995);
    }

    #[test]
    fn breguet_cruise_fraction() {
        let perf = jet_performance();
        let range_ft = 1_500.0 * 6_076.115;
        let fraction = MissionSegment::Cruise { range_ft }
            .weight_fraction(&perf)
            .unwrap();
        let ld_cruise = 0.866 * 15.5 * (9.0_f64 / 6.0).sqrt();
        let expected = (-range_ft * (0.5 / 3_600.0) / (800.0 * ld_cruise)).exp();
        assert_abs_diff_eq!(fraction, expected, epsilon = 1e-12);
        assert!(fraction > 0.0 && fraction < 1.0);
    }

    #[test]
    fn engine_kind_swaps_off_optimum_phase() {
        let jet = Aerodynamics::estimate(14.0, 4.0, 4.0, EngineKind::Jet).unwrap();
        assert_eq!(jet.ld_loiter, 14.0);
        assert_abs_diff_eq!(jet.ld_cruise, 0.866 * 14.0, epsilon = 1e-12);

        let prop = Aerodynamics::estimate(14.0, 4.0, 4.0, EngineKind::Propeller).unwrap();
        assert_eq!(prop.ld_cruise, 14.0);
        assert_abs_diff_eq!(prop.ld_loiter, 0.866 * 14.0, epsilon = 1e-12);
    }

    #[test]
    fn propeller_sfc_uses_phase_speed() {
        let prop = Propulsion::propeller(0.4, 0.5, 250.0, 150.0).unwrap();
        assert_abs_diff_eq!(
            prop.sfc_cruise_per_s,
            0.4 * 250.0 / 440.0 / 3_600.0,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            prop.sfc_loiter_per_s,
            0.5 * 150.0 / 440.0 / 3_600.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn negative_loiter_is_a_domain_error() {
        let err = MissionSegment::Loiter { endurance_s: -1.0 }
            .weight_fraction(&jet_performance())
            .unwrap_err();
        assert!(matches!(err, WeightError::Domain(_)));
    }
}
