use aircraft_sizing::sizing_takeoff::{
    TakeoffCriterion, TakeoffDataTable, TakeoffError, takeoff_parameter,
};
use aircraft_sizing::{ErrorKind, SizingError};

fn chart() -> TakeoffDataTable {
    TakeoffDataTable::from_path("data/top.csv").expect("takeoff chart")
}

#[test]
fn every_criterion_can_be_fitted() {
    let table = chart();
    for criterion in TakeoffCriterion::ALL {
        let pairs = table.pairs(criterion);
        assert!(pairs.len() >= 3, "{criterion} has {} samples", pairs.len());
        let (distance, _) = pairs[pairs.len() / 2];
        let top = takeoff_parameter(&table, criterion, distance).unwrap();
        assert!(top.value.is_finite());
    }
}

#[test]
fn fit_reproduces_samples_within_residual() {
    let table = chart();
    let top = takeoff_parameter(&table, TakeoffCriterion::Prop50Ft, 1_500.0).unwrap();
    for (distance, expected) in table.pairs(TakeoffCriterion::Prop50Ft) {
        let predicted = top.fit.evaluate(distance);
        assert!(
            (predicted - expected).abs() <= top.fit.max_residual + 1e-9,
            "TOP {expected} at {distance} ft predicted as {predicted}"
        );
    }
    assert!(top.value > 100.0 && top.value < 200.0, "TOP {}", top.value);
}

#[test]
fn missing_cells_are_skipped() {
    let table = chart();
    let ground_roll = table.pairs(TakeoffCriterion::JetGroundRoll);
    let fifty_ft = table.pairs(TakeoffCriterion::Jet50Ft);
    assert_eq!(ground_roll.len() + 1, fifty_ft.len());
    let finite = |(d, top): &(f64, f64)| d.is_finite() && top.is_finite();
    assert!(ground_roll.iter().all(finite));
}

#[test]
fn longer_field_allows_higher_top() {
    let table = chart();
    let short = takeoff_parameter(&table, TakeoffCriterion::JetBfl2Engine, 5_000.0).unwrap();
    let long = takeoff_parameter(&table, TakeoffCriterion::JetBfl2Engine, 8_000.0).unwrap();
    assert!(long.value > short.value);
}

#[test]
fn sparse_chart_is_a_data_error() {
    let csv = "TOP,a,b,c,d,e,f,g\n50,0.3,,,,,,\n100,0.6,,,,,,\n";
    let table = TakeoffDataTable::from_reader(csv.as_bytes()).unwrap();
    let err = takeoff_parameter(&table, TakeoffCriterion::PropGroundRoll, 500.0).unwrap_err();
    assert!(matches!(
        err,
        TakeoffError::InsufficientSamples { found: 2 }
    ));
    assert_eq!(SizingError::from(err).kind(), ErrorKind::Data);
}

#[test]
fn non_positive_distance_is_a_domain_error() {
    let err = takeoff_parameter(&chart(), TakeoffCriterion::Prop50Ft, 0.0).unwrap_err();
    assert_eq!(SizingError::from(err).kind(), ErrorKind::Domain);
}
