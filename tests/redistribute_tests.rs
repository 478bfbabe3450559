use headway::{
    feature::{StopFeature, StopFeatureCollection, StopProperties},
    scenario::{MAX_ADJUSTED_STOPS, redistribute},
    shared::{Coordinate, Geometry},
};
use std::collections::HashSet;

fn stop(id: &str, longitude: f64, latitude: f64) -> StopFeature {
    StopFeature::new(
        id,
        Coordinate::new(longitude, latitude),
        StopProperties {
            name: id.to_string(),
            ..Default::default()
        },
    )
}

fn line() -> Geometry {
    Geometry::LineString(vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 0.05),
        Coordinate::new(0.0, 0.1),
    ])
}

/// Stops every 0.01 degrees along the test line.
fn base(count: usize) -> StopFeatureCollection {
    (0..count)
        .map(|i| stop(&format!("s{i}"), 0.0, i as f64 * 0.01))
        .collect::<Vec<_>>()
        .into()
}

fn ids(collection: &StopFeatureCollection) -> Vec<&str> {
    collection.iter().map(|stop| stop.id.as_str()).collect()
}

#[test]
fn returns_exactly_the_target_count() {
    for base_count in [0, 1, 2, 5, 11] {
        let base = base(base_count);
        for target in [1, 2, 3, 7, 11, 25, 60] {
            let result = redistribute(&base, &line(), target);
            assert_eq!(
                result.len(),
                target,
                "base {base_count} target {target} gave {}",
                result.len()
            );
        }
    }
}

#[test]
fn target_is_capped() {
    let result = redistribute(&base(3), &line(), MAX_ADJUSTED_STOPS + 50);
    assert_eq!(result.len(), MAX_ADJUSTED_STOPS);
}

#[test]
fn zero_target_is_empty() {
    assert!(redistribute(&base(4), &line(), 0).is_empty());
}

#[test]
fn same_count_returns_base_unchanged() {
    let base = base(6);
    assert_eq!(redistribute(&base, &line(), 6), base);
    let single = self::base(1);
    assert_eq!(redistribute(&single, &line(), 1), single);
}

#[test]
fn reduction_keeps_endpoints_and_order() {
    let base = base(10);
    let result = redistribute(&base, &line(), 4);
    // interval 9 / 3 = 3
    assert_eq!(ids(&result), vec!["s0", "s3", "s6", "s9"]);

    let result = redistribute(&base, &line(), 2);
    assert_eq!(ids(&result), vec!["s0", "s9"]);

    let result = redistribute(&base, &line(), 1);
    assert_eq!(ids(&result), vec!["s0"]);
}

#[test]
fn no_base_stops_samples_the_route() {
    let result = redistribute(&StopFeatureCollection::new(), &line(), 3);
    assert_eq!(result.len(), 3);
    assert!(result.iter().all(StopFeature::is_synthetic));
    let latitudes: Vec<f64> = result
        .iter()
        .filter_map(|stop| stop.coordinate())
        .map(|coordinate| coordinate.latitude)
        .collect();
    assert!((latitudes[0] - 0.0).abs() < 1e-9);
    assert!((latitudes[1] - 0.05).abs() < 1e-9);
    assert!((latitudes[2] - 0.1).abs() < 1e-9);
}

#[test]
fn single_base_stop_is_kept_first() {
    let base: StopFeatureCollection = vec![stop("only", 0.0, 0.05)].into();
    let result = redistribute(&base, &line(), 4);
    assert_eq!(result.features[0].id, "only");
    assert_eq!(result.synthetic_count(), 3);
}

#[test]
fn growth_fills_gaps_by_length() {
    // Gap lengths 3:1, four new stops split 3 and 1.
    let base: StopFeatureCollection = vec![
        stop("a", 0.0, 0.0),
        stop("b", 0.0, 0.03),
        stop("c", 0.0, 0.04),
    ]
    .into();
    let result = redistribute(&base, &line(), 7);
    let synthetic: Vec<bool> = result.iter().map(StopFeature::is_synthetic).collect();
    assert_eq!(
        synthetic,
        vec![false, true, true, true, false, true, false]
    );
    assert_eq!(result.features[0].id, "a");
    assert_eq!(result.features[4].id, "b");
    assert_eq!(result.features[6].id, "c");

    // Evenly placed inside the first gap.
    let inserted: Vec<f64> = result.features[1..4]
        .iter()
        .filter_map(|stop| stop.coordinate())
        .map(|coordinate| coordinate.latitude)
        .collect();
    for (latitude, expected) in inserted.iter().zip([0.0075, 0.015, 0.0225]) {
        assert!((latitude - expected).abs() < 1e-12);
    }
    assert!((result.features[5].coordinate().unwrap().latitude - 0.035).abs() < 1e-12);
}

#[test]
fn synthetic_ids_increase_and_avoid_base_ids() {
    let base: StopFeatureCollection = vec![
        stop("synthetic-1", 0.0, 0.0),
        stop("synthetic-3", 0.0, 0.1),
    ]
    .into();
    let result = redistribute(&base, &line(), 6);
    let synthetic: Vec<&str> = result
        .iter()
        .filter(|stop| stop.is_synthetic())
        .map(|stop| stop.id.as_str())
        .collect();
    assert_eq!(
        synthetic,
        vec!["synthetic-2", "synthetic-4", "synthetic-5", "synthetic-6"]
    );
    let unique: HashSet<&str> = ids(&result).into_iter().collect();
    assert_eq!(unique.len(), result.len());
}

#[test]
fn synthetic_count_is_monotonic() {
    let base = base(5);
    let mut previous_synthetic = 0;
    let mut previous_len = 0;
    for target in 1..40 {
        let result = redistribute(&base, &line(), target);
        assert!(result.synthetic_count() >= previous_synthetic);
        assert!(result.len() >= previous_len);
        previous_synthetic = result.synthetic_count();
        previous_len = result.len();
    }
}

#[test]
fn redistribution_is_deterministic() {
    let base = base(4);
    assert_eq!(
        redistribute(&base, &line(), 17),
        redistribute(&base, &line(), 17)
    );
}

#[test]
fn non_point_features_are_ignored() {
    let mut base = base(2);
    base.features.push(StopFeature {
        id: "area".to_string(),
        geometry: line(),
        properties: StopProperties::default(),
    });
    let result = redistribute(&base, &line(), 2);
    assert_eq!(ids(&result), vec!["s0", "s1"]);
}
