//! End-to-end sizing of one design case.
//!
//! The weight estimate and the matching chart are independent: the weight
//! estimate is reported alongside the constraint analysis but does not feed
//! it. Each stage runs only when its section is present in the case.

use serde::Serialize;
use sizing_config::{
    ConstraintsConfig, DesignCase, EngineConfig, LandingConfig, MissionConfig, OptimizerConfig,
    SegmentConfig, SizingCatalog,
};
use sizing_constraints::{
    ApproachCategory, BestLiftToDrag, Constraint, ConstraintCurve, ConstraintSet, DragPolar,
    FlapConfiguration, FlightCondition, InstantTurn, Landing, SpeedObjective, Stall, Takeoff,
    ThrustMatched, power_loading_grid, takeoff_cl, wing_cl_max,
};
use sizing_core::units::{deg_s_to_rad_s, hours_to_seconds, knots_to_ft_s, nmi_to_ft};
use sizing_optimizer::{Bounds, DesignPoint, DesignPointOptimizer, OptimizerSettings, Predicate};
use sizing_takeoff::{TakeoffCriterion, TakeoffDataTable, TakeoffParameter, takeoff_parameter};
use sizing_weight::{
    Aerodynamics, EmptyWeightModel, EngineKind, FlightPerformance, MissionProfile, MissionSegment,
    Propulsion, WeightEstimate, WeightRequest, WeightSolverSettings, solve_takeoff_weight,
};
use tracing::{debug, info};

use crate::error::SizingError;

/// Power-loading samples per curve on the matching chart.
pub const CURVE_SAMPLES: usize = 50;

/// Everything computed for one case.
#[derive(Debug, Clone, Serialize)]
pub struct SizingReport {
    pub case: String,
    pub weight: Option<WeightEstimate>,
    pub takeoff_parameter: Option<TakeoffParameter>,
    pub wing_cl_max: Option<f64>,
    pub curves: Vec<ConstraintCurve>,
    pub design_point: Option<DesignPoint>,
}

/// Constraint set built from a case, with the intermediate quantities that
/// the report shows.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis {
    pub set: ConstraintSet,
    pub wing_cl_max: f64,
    pub takeoff_parameter: Option<TakeoffParameter>,
}

/// Translate a mission section into solver inputs, resolving catalog keys.
pub fn weight_request(
    mission: &MissionConfig,
    catalog: &SizingCatalog,
) -> Result<WeightRequest, SizingError> {
    let cruise_speed = knots_to_ft_s(mission.cruise_speed_kt);
    let loiter_speed = knots_to_ft_s(mission.loiter_speed_kt);
    let (kind, propulsion) = match mission.engine {
        EngineConfig::Jet => {
            let sfc = catalog.jet_sfc(&mission.engine_key)?;
            (EngineKind::Jet, Propulsion::jet(sfc.cruise, sfc.loiter)?)
        }
        EngineConfig::Prop => {
            let sfc = catalog.prop_sfc(&mission.engine_key)?;
            (
                EngineKind::Propeller,
                Propulsion::propeller(sfc.cruise, sfc.loiter, cruise_speed, loiter_speed)?,
            )
        }
    };
    let k_ld = catalog.k_ld(&mission.configuration)?;
    let aerodynamics =
        Aerodynamics::estimate(k_ld, mission.aspect_ratio, mission.wetted_area_ratio, kind)?;
    let coefficients = catalog.empty_weight(&mission.aircraft_type)?;

    let segments = mission
        .segments
        .iter()
        .map(|segment| match *segment {
            SegmentConfig::Takeoff => MissionSegment::Takeoff,
            SegmentConfig::Climb => MissionSegment::Climb,
            SegmentConfig::Cruise { range_nmi } => MissionSegment::Cruise {
                range_ft: nmi_to_ft(range_nmi),
            },
            SegmentConfig::Loiter { duration_hr } => MissionSegment::Loiter {
                endurance_s: hours_to_seconds(duration_hr),
            },
            SegmentConfig::Landing => MissionSegment::Landing,
        })
        .collect();

    Ok(WeightRequest {
        profile: MissionProfile::new(segments),
        performance: FlightPerformance {
            cruise_speed_ft_s: cruise_speed,
            propulsion,
            aerodynamics,
        },
        empty_weight: EmptyWeightModel::new(
            coefficients.a,
            coefficients.c,
            mission.variable_sweep,
        )?,
        crew_weight_lb: mission.crew_weight_lb,
        payload_weight_lb: mission.payload_weight_lb,
        initial_takeoff_weight_lb: mission.initial_takeoff_weight_lb,
        settings: WeightSolverSettings::default(),
    })
}

pub fn estimate_weight(
    mission: &MissionConfig,
    catalog: &SizingCatalog,
) -> Result<WeightEstimate, SizingError> {
    Ok(solve_takeoff_weight(&weight_request(mission, catalog)?)?)
}

/// Airfoil Clmax from the explicit value, or the flap preset when absent.
fn airfoil_cl_max(case: &str, config: &ConstraintsConfig) -> Result<f64, SizingError> {
    match (config.airfoil_cl_max, config.flap.as_deref()) {
        (Some(value), _) => Ok(value),
        (None, Some(flap)) => Ok(flap.parse::<FlapConfiguration>()?.airfoil_cl_max()),
        (None, None) => Err(SizingError::MissingInput {
            case: case.to_string(),
            what: "airfoil_cl_max or flap",
        }),
    }
}

/// Obstacle-clearance allowance: explicit value, then the approach preset,
/// then the airliner allowance.
fn landing_allowance(landing: &LandingConfig) -> Result<f64, SizingError> {
    match (landing.obstacle_allowance_ft, landing.approach.as_deref()) {
        (Some(feet), _) => Ok(feet),
        (None, Some(approach)) => {
            let category: ApproachCategory = approach.parse()?;
            Ok(category.obstacle_allowance_ft())
        }
        (None, None) => Ok(ApproachCategory::Airliner.obstacle_allowance_ft()),
    }
}

/// Build every requirement present in `config`.
///
/// A takeoff requirement needs `takeoff_data` to read TOP from.
pub fn build_constraints(
    case: &str,
    config: &ConstraintsConfig,
    takeoff_data: Option<&TakeoffDataTable>,
) -> Result<ConstraintAnalysis, SizingError> {
    let delta_t = config.delta_t_k;
    let at = |altitude_ft: f64| FlightCondition::new(altitude_ft, delta_t);
    let runway = at(config.runway_altitude_ft)?;
    let cl_max = wing_cl_max(airfoil_cl_max(case, config)?, config.sweep_deg)?;
    let polar = DragPolar::new(config.aspect_ratio, config.oswald_efficiency, config.cd0)?;
    let mut set = ConstraintSet::new();
    let mut top = None;

    if let Some(stall) = &config.stall {
        let speed = knots_to_ft_s(stall.speed_kt);
        let stall = Stall::new(at(stall.altitude_ft)?, speed, cl_max)?;
        set.insert(Constraint::Stall(stall));
    }

    if let Some(takeoff) = &config.takeoff {
        let table = takeoff_data.ok_or_else(|| SizingError::MissingInput {
            case: case.to_string(),
            what: "takeoff data table",
        })?;
        let criterion: TakeoffCriterion = takeoff.criterion.parse()?;
        let parameter = takeoff_parameter(table, criterion, takeoff.distance_ft)?;
        debug!(criterion = %criterion, top = parameter.value, "takeoff parameter");
        let takeoff = Takeoff::new(runway, parameter.value, takeoff_cl(cl_max)?)?;
        set.insert(Constraint::Takeoff(takeoff));
        top = Some(parameter);
    }

    if let Some(landing) = &config.landing {
        let allowance = landing_allowance(landing)?;
        let landing = Landing::new(runway, landing.distance_ft, allowance, cl_max)?;
        set.insert(Constraint::Landing(landing));
    }

    if let Some(cruise) = &config.cruise {
        let speed = knots_to_ft_s(cruise.speed_kt);
        let condition = at(cruise.altitude_ft)?;
        let cruise = BestLiftToDrag::new(condition, speed, polar, SpeedObjective::Range)?;
        set.insert(Constraint::Cruise(cruise));
    }

    if let Some(loiter) = &config.loiter {
        let speed = knots_to_ft_s(loiter.speed_kt);
        let condition = at(loiter.altitude_ft)?;
        let loiter = BestLiftToDrag::new(condition, speed, polar, SpeedObjective::Endurance)?;
        set.insert(Constraint::Loiter(loiter));
    }

    if let Some(climb) = &config.climb {
        let speed = knots_to_ft_s(climb.speed_kt);
        let condition = at(climb.altitude_ft)?;
        let climb = ThrustMatched::climb(condition, speed, polar, climb.gradient)?;
        set.insert(Constraint::Climb(climb));
    }

    if let Some(ceiling) = &config.ceiling {
        let speed = knots_to_ft_s(ceiling.speed_kt);
        let ceiling = ThrustMatched::ceiling(at(ceiling.altitude_ft)?, speed, polar)?;
        set.insert(Constraint::Ceiling(ceiling));
    }

    if let Some(turn) = &config.instant_turn {
        let speed = knots_to_ft_s(turn.speed_kt);
        let rate = deg_s_to_rad_s(turn.turn_rate_deg_s);
        let condition = at(turn.altitude_ft)?;
        let turn = InstantTurn::new(condition, speed, rate, turn.cl_max_combat)?;
        set.insert(Constraint::InstantTurn(turn));
    }

    if let Some(turn) = &config.sustained_turn {
        let speed = knots_to_ft_s(turn.speed_kt);
        let condition = at(turn.altitude_ft)?;
        let turn = ThrustMatched::sustained_turn(condition, speed, polar, turn.load_factor)?;
        set.insert(Constraint::SustainedTurn(turn));
    }

    Ok(ConstraintAnalysis {
        set,
        wing_cl_max: cl_max,
        takeoff_parameter: top,
    })
}

/// Maximise the design point over the active requirements.
pub fn design_point(
    set: &ConstraintSet,
    config: &OptimizerConfig,
) -> Result<DesignPoint, SizingError> {
    let [ws_lo, ws_hi] = config.wing_loading_bounds;
    let [wp_lo, wp_hi] = config.power_loading_bounds;
    let bounds = Bounds::new([ws_lo, wp_lo], [ws_hi, wp_hi])?;
    let mut settings = OptimizerSettings::default();
    if let Some(max_iterations) = config.max_iterations {
        settings.max_iterations = max_iterations;
    }
    let mut optimizer = DesignPointOptimizer::new(bounds).with_settings(settings);
    for constraint in set {
        if config
            .inactive
            .iter()
            .any(|name| name.eq_ignore_ascii_case(constraint.name()))
        {
            debug!(constraint = constraint.name(), "inactive, not enforced");
            continue;
        }
        let margin = move |ws, wp| constraint.margin(ws, wp);
        optimizer.add(Predicate::new(constraint.name(), margin));
    }
    Ok(optimizer.solve()?)
}

/// Run every stage the case asks for.
pub fn run_case(
    case: &DesignCase,
    catalog: &SizingCatalog,
    takeoff_data: Option<&TakeoffDataTable>,
) -> Result<SizingReport, SizingError> {
    let weight = case
        .mission
        .as_ref()
        .map(|mission| estimate_weight(mission, catalog))
        .transpose()?;

    let mut report = SizingReport {
        case: case.name.clone(),
        weight,
        takeoff_parameter: None,
        wing_cl_max: None,
        curves: Vec::new(),
        design_point: None,
    };

    if let Some(constraints) = &case.constraints {
        let analysis = build_constraints(&case.name, constraints, takeoff_data)?;
        let [lo, hi] = case.optimizer.power_loading_bounds;
        let power_loadings = power_loading_grid(lo, hi, CURVE_SAMPLES)?;
        report.curves = analysis.set.curves(&power_loadings);
        report.design_point = Some(design_point(&analysis.set, &case.optimizer)?);
        report.wing_cl_max = Some(analysis.wing_cl_max);
        report.takeoff_parameter = analysis.takeoff_parameter;
    }

    info!(case = %case.name, "case complete");
    Ok(report)
}
