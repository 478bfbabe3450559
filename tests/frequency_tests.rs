use headway::{
    scenario::{FrequencyModel, estimate_frequency_minutes},
    shared::Distance,
};

#[test]
fn empty_route_has_no_frequency() {
    assert_eq!(estimate_frequency_minutes(Distance::ZERO, 0), None);
}

#[test]
fn travel_time_alone_is_positive() {
    let minutes = estimate_frequency_minutes(Distance::from_kilometers(5.0), 0).unwrap();
    assert!(minutes > 0.0);
    // 5 km at 321.868 m/min over round(3.1 / 1.8) = 2 buses.
    assert!((minutes - 5000.0 / 321.868 / 2.0).abs() < 1e-9);
}

#[test]
fn dwell_only_when_length_is_zero() {
    let minutes = estimate_frequency_minutes(Distance::ZERO, 4).unwrap();
    assert!((minutes - 1.0).abs() < 1e-12);
}

#[test]
fn short_route_still_has_one_bus() {
    let model = FrequencyModel::default();
    assert_eq!(model.buses_in_service(Distance::from_meters(100.0)), 1.0);
    let minutes = model
        .estimate_minutes(Distance::from_meters(100.0), 2)
        .unwrap();
    let expected = 100.0 / model.speed_meters_per_minute() + 0.5;
    assert!((minutes - expected).abs() < 1e-12);
}

#[test]
fn more_stops_mean_longer_headway() {
    let length = Distance::from_miles(10.0);
    let base = estimate_frequency_minutes(length, 10).unwrap();
    let adjusted = estimate_frequency_minutes(length, 13).unwrap();
    assert!((base - 8.75).abs() < 1e-9);
    assert!((adjusted - 8.875).abs() < 1e-9);
}

#[test]
fn model_is_tunable() {
    let model = FrequencyModel {
        average_speed_mph: 24.0,
        ..Default::default()
    };
    let default = FrequencyModel::default();
    let length = Distance::from_miles(10.0);
    assert!(model.estimate_minutes(length, 10) < default.estimate_minutes(length, 10));
}
