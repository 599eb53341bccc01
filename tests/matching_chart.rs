use aircraft_sizing::pipeline::{self, CURVE_SAMPLES};
use aircraft_sizing::sizing_config::{
    ConstraintsConfig, InstantTurnConfig, SpeedAtAltitudeConfig, SustainedTurnConfig, load_case,
    load_catalog,
};
use aircraft_sizing::sizing_constraints::{
    BestLiftToDrag, Constraint, ConstraintSet, DragPolar, FlightCondition, SpeedObjective, Stall,
};
use aircraft_sizing::sizing_core::constants::G0_FT_S2;
use aircraft_sizing::sizing_core::units::knots_to_ft_s;
use aircraft_sizing::sizing_optimizer::{
    Bounds, DesignPointOptimizer, OptimizerError, Predicate,
};
use aircraft_sizing::sizing_takeoff::TakeoffDataTable;
use aircraft_sizing::{ErrorKind, SizingError, run_case};
use approx::assert_relative_eq;

fn unit_box() -> Bounds {
    Bounds::new([1.0, 1.0], [50.0, 50.0]).unwrap()
}

#[test]
fn takeoff_curve_binds_at_the_power_loading_limit() {
    let mut optimizer = DesignPointOptimizer::new(unit_box());
    optimizer
        .add(Predicate::new("stall", |ws, _| 20.0 - ws))
        .add(Predicate::new("landing", |ws, _| 30.0 - ws))
        .add(Predicate::new("takeoff", |ws, wp| 400.0 / wp - ws));

    let point = optimizer.solve().unwrap();
    assert_relative_eq!(point.wing_loading, 8.0, epsilon = 1e-3);
    assert_relative_eq!(point.power_loading, 50.0, epsilon = 1e-6);
    let active: Vec<&str> = point.active().collect();
    assert_eq!(active, ["takeoff"]);
}

#[test]
fn stall_limit_below_the_box_is_infeasible() {
    let condition = FlightCondition::new(0.0, 0.0).unwrap();
    let stall = Stall::new(condition, 10.0, 1.62).unwrap();
    assert!(stall.wing_loading() < 1.0);

    let mut set = ConstraintSet::new();
    set.insert(Constraint::Stall(stall));
    let mut optimizer = DesignPointOptimizer::new(unit_box());
    for constraint in &set {
        let margin = move |ws, wp| constraint.margin(ws, wp);
        optimizer.add(Predicate::new(constraint.name(), margin));
    }

    let err = optimizer.solve().unwrap_err();
    match &err {
        OptimizerError::Infeasible { predicate, violation } => {
            assert_eq!(predicate, "stall");
            assert!(*violation > 0.5);
        }
        other => panic!("expected infeasible, got {other:?}"),
    }
    assert_eq!(SizingError::from(err).kind(), ErrorKind::Infeasible);
}

#[test]
fn contradictory_wing_loading_limits_are_infeasible() {
    let mut optimizer = DesignPointOptimizer::new(unit_box());
    optimizer
        .add(Predicate::new("floor", |ws, _| ws - 30.0))
        .add(Predicate::new("ceiling", |ws, _| 20.0 - ws));
    assert!(matches!(
        optimizer.solve(),
        Err(OptimizerError::Infeasible { .. })
    ));
}

#[test]
fn light_single_case_sizes_end_to_end() {
    let catalog = load_catalog("data/sizing_data.toml").unwrap();
    let table = TakeoffDataTable::from_path("data/top.csv").unwrap();
    let case = load_case("data/cases/light_single.toml").unwrap();

    let report = run_case(&case, &catalog, Some(&table)).unwrap();
    assert_eq!(report.curves.len(), 6);
    let stall = report.curves.iter().find(|c| c.name == "stall").unwrap();
    assert_eq!(stall.points.len(), CURVE_SAMPLES);
    assert_relative_eq!(report.wing_cl_max.unwrap(), 1.62, epsilon = 1e-12);
    assert!(report.takeoff_parameter.is_some());
    assert!(report.weight.is_some());

    let point = report.design_point.unwrap();
    assert!((1.0..=50.0).contains(&point.wing_loading));
    assert!((1.0..=50.0).contains(&point.power_loading));
    for margin in &point.margins {
        let violated = margin.margin < -1e-6;
        assert!(!violated, "{} violated by {}", margin.name, margin.margin);
    }
}

#[test]
fn inactive_constraints_stay_on_the_chart() {
    let catalog = load_catalog("data/sizing_data.toml").unwrap();
    let table = TakeoffDataTable::from_path("data/top.csv").unwrap();
    let mut case = load_case("data/cases/light_single.toml").unwrap();
    case.optimizer.inactive = vec!["ceiling".to_string()];

    let report = run_case(&case, &catalog, Some(&table)).unwrap();
    assert!(report.curves.iter().any(|c| c.name == "ceiling"));
    let point = report.design_point.unwrap();
    assert!(point.margins.iter().all(|m| m.name != "ceiling"));
}

#[test]
fn stall_curve_is_vertical() {
    let condition = FlightCondition::new(0.0, 0.0).unwrap();
    let stall = Stall::new(condition, knots_to_ft_s(55.0), 1.62).unwrap();
    let stall = Constraint::Stall(stall);
    let curve = stall.curve(&[2.0, 10.0, 40.0]);
    let first = curve.points[0].wing_loading;
    assert!(curve.points.iter().all(|p| p.wing_loading == first));
    assert!(!stall.depends_on_power_loading());
}

#[test]
fn cruise_wing_loading_scales_with_root_of_zero_lift_drag() {
    let condition = FlightCondition::new(8_000.0, 0.0).unwrap();
    let speed = knots_to_ft_s(130.0);
    let clean = DragPolar::new(7.5, 0.8, 0.02).unwrap();
    let dirty = DragPolar::new(7.5, 0.8, 0.04).unwrap();
    let base = BestLiftToDrag::new(condition, speed, clean, SpeedObjective::Range).unwrap();
    let draggy = BestLiftToDrag::new(condition, speed, dirty, SpeedObjective::Range).unwrap();
    assert_relative_eq!(
        draggy.wing_loading() / base.wing_loading(),
        2.0_f64.sqrt(),
        max_relative = 1e-12
    );
}

#[test]
fn case_without_takeoff_data_reports_missing_input() {
    let catalog = load_catalog("data/sizing_data.toml").unwrap();
    let case = load_case("data/cases/light_single.toml").unwrap();
    let err = run_case(&case, &catalog, None).unwrap_err();
    assert!(matches!(err, SizingError::MissingInput { .. }));
    assert_eq!(err.kind(), ErrorKind::Data);
}

#[test]
fn constraint_analysis_exposes_takeoff_parameter() {
    let case = load_case("data/cases/light_single.toml").unwrap();
    let table = TakeoffDataTable::from_path("data/top.csv").unwrap();
    let constraints = case.constraints.as_ref().unwrap();
    let analysis = pipeline::build_constraints(&case.name, constraints, Some(&table)).unwrap();
    let top = analysis.takeoff_parameter.unwrap();
    assert!(top.value > 100.0 && top.value < 200.0);
    assert!(analysis.set.get("Takeoff").is_some());
}

/// Light-single requirements with the takeoff run swapped for combat ones.
fn fighter_constraints() -> ConstraintsConfig {
    let case = load_case("data/cases/light_single.toml").unwrap();
    let mut config = case.constraints.unwrap();
    config.takeoff = None;
    config.loiter = Some(SpeedAtAltitudeConfig {
        altitude_ft: 10_000.0,
        speed_kt: 150.0,
    });
    config.instant_turn = Some(InstantTurnConfig {
        altitude_ft: 10_000.0,
        speed_kt: 350.0,
        turn_rate_deg_s: 12.0,
        cl_max_combat: 1.2,
    });
    config.sustained_turn = Some(SustainedTurnConfig {
        altitude_ft: 10_000.0,
        speed_kt: 250.0,
        load_factor: 3.0,
    });
    config
}

#[test]
fn combat_requirements_join_the_chart() {
    let config = fighter_constraints();
    let analysis = pipeline::build_constraints("fighter", &config, None).unwrap();
    assert_eq!(analysis.set.len(), 8);

    let altitude = FlightCondition::new(10_000.0, 0.0).unwrap();
    let loiter_q = altitude.dynamic_pressure(knots_to_ft_s(150.0));
    let induced = std::f64::consts::PI * 7.5 * 0.8;
    let loiter_ws = loiter_q * (3.0 * induced * 0.03).sqrt();
    let loiter = analysis.set.get("loiter").unwrap();
    assert_relative_eq!(
        loiter.wing_loading(10.0).unwrap(),
        loiter_ws,
        max_relative = 1e-9
    );

    let speed = knots_to_ft_s(350.0);
    let turn_rate = 12.0_f64.to_radians();
    let n = ((turn_rate * speed / G0_FT_S2).powi(2) + 1.0).sqrt();
    let turn_ws = altitude.dynamic_pressure(speed) * 1.2 / n;
    let instant = analysis.set.get("instant_turn").unwrap();
    assert_relative_eq!(
        instant.wing_loading(5.0).unwrap(),
        turn_ws,
        max_relative = 1e-9
    );
    assert!(!instant.depends_on_power_loading());

    let sustained = analysis.set.get("sustained_turn").unwrap();
    assert!(sustained.depends_on_power_loading());
}

#[test]
fn sub_one_g_sustained_turn_is_a_domain_error() {
    let mut config = fighter_constraints();
    if let Some(turn) = config.sustained_turn.as_mut() {
        turn.load_factor = 0.5;
    }
    let err = pipeline::build_constraints("fighter", &config, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert!(err.to_string().contains("load_factor"));
}
