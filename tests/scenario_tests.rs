use headway::{
    feature::{RouteFeature, RouteProperties, StopFeature, StopFeatureCollection, StopProperties},
    scenario::{self, Config, Direction, ScenarioStore, SelectOutcome, Selection, StopScenario},
    shared::{Coordinate, Distance, Geometry},
    source,
};

// Degrees of latitude covering ten miles on a 6,371 km sphere.
const TEN_MILES_DEGREES: f64 = 16_093.4 / 6_371_000.0 * 180.0 / std::f64::consts::PI;

fn route(id: &str, longitude: f64) -> RouteFeature {
    RouteFeature {
        id: id.to_string(),
        geometry: Geometry::LineString(vec![
            Coordinate::new(longitude, 0.0),
            Coordinate::new(longitude, TEN_MILES_DEGREES),
        ]),
        properties: RouteProperties::new(id, format!("Route {id}")),
    }
}

fn stops(count: usize, longitude: f64) -> StopFeatureCollection {
    let spacing = TEN_MILES_DEGREES / count.max(2).saturating_sub(1) as f64;
    (0..count)
        .map(|i| {
            StopFeature::new(
                format!("{longitude}-{i}"),
                Coordinate::new(longitude, i as f64 * spacing),
                StopProperties {
                    name: format!("Stop {i}"),
                    ..Default::default()
                },
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn store() -> ScenarioStore {
    let mut store = ScenarioStore::new(Config::default());
    store.begin_routes_load();
    store.set_routes(Ok(vec![route("A", 0.0), route("B", 1.0)].into()));
    store
}

fn fetch_token(outcome: SelectOutcome) -> u64 {
    match outcome {
        SelectOutcome::Fetch { token, .. } => token,
        other => panic!("expected a fetch, got {other:?}"),
    }
}

fn ready_store(base_count: usize) -> ScenarioStore {
    let mut store = store();
    let token = fetch_token(store.select_route("A").unwrap());
    assert!(store.complete_stop_fetch("A", token, Ok(stops(base_count, 0.0))));
    store
}

#[test]
fn route_lengths_are_cached_on_load() {
    let store = store();
    let length = store.route_length("A").unwrap();
    assert!((length.as_meters() - 16_093.4).abs() < 1e-6);
    assert!(!store.snapshot().loading_flags.routes);
}

#[test]
fn selecting_loads_base_scenario() {
    let store = ready_store(10);
    assert_eq!(store.selection(), &Selection::Ready("A".to_string()));
    let scenario = store.scenario();
    assert_eq!(scenario.base_count, 10);
    assert_eq!(scenario.adjusted_count, 10);
    assert_eq!(scenario.factor, 1.0);

    let expected = Config::default()
        .frequency
        .estimate_minutes(store.route_length("A").unwrap(), 10);
    assert_eq!(scenario.base_frequency_minutes, expected);
    // 50 min travel, 2.5 min dwell, 6 buses.
    assert!((scenario.base_frequency_minutes.unwrap() - 8.75).abs() < 1e-6);
    assert_eq!(store.stops().len(), 10);
}

#[test]
fn increase_then_decrease() {
    let mut store = ready_store(10);
    let scenario = *store.adjust_stops(Direction::Increase).unwrap();
    assert_eq!(scenario.adjusted_count, 13);
    assert!((scenario.factor - 1.3).abs() < 1e-12);
    assert_eq!(store.stops().len(), 13);
    assert_eq!(store.stops().synthetic_count(), 3);

    let length = store.route_length("A").unwrap();
    let expected = Config::default().frequency.estimate_minutes(length, 13);
    assert_eq!(scenario.adjusted_frequency_minutes, expected);
    assert!(scenario.adjusted_frequency_minutes > scenario.base_frequency_minutes);

    let scenario = *store.adjust_stops(Direction::Decrease).unwrap();
    assert_eq!(scenario.adjusted_count, (13.0_f64 * 0.75).round() as usize);
    assert_eq!(store.stops().len(), scenario.adjusted_count);
}

#[test]
fn adjustment_nudges_when_rounding_stalls() {
    let mut store = ready_store(1);
    // round(1 * 1.25) == 1, so the control nudges to 2.
    assert_eq!(
        store.adjust_stops(Direction::Increase).unwrap().adjusted_count,
        2
    );
    assert_eq!(
        store.adjust_stops(Direction::Decrease).unwrap().adjusted_count,
        1
    );
    // Already at the floor.
    assert_eq!(
        store.adjust_stops(Direction::Decrease).unwrap().adjusted_count,
        1
    );
}

#[test]
fn adjustment_stops_at_the_ceiling() {
    let config = Config {
        max_adjusted_stops: 12,
        ..Default::default()
    };
    let mut store = ScenarioStore::new(config);
    store.set_routes(Ok(vec![route("A", 0.0)].into()));
    let token = fetch_token(store.select_route("A").unwrap());
    store.complete_stop_fetch("A", token, Ok(stops(10, 0.0)));

    assert_eq!(
        store.adjust_stops(Direction::Increase).unwrap().adjusted_count,
        12
    );
    assert_eq!(
        store.adjust_stops(Direction::Increase).unwrap().adjusted_count,
        12
    );
    assert_eq!(store.stops().len(), 12);
}

#[test]
fn route_without_stops_grows_from_one() {
    let mut store = store();
    let token = fetch_token(store.select_route("A").unwrap());
    store.complete_stop_fetch("A", token, Ok(StopFeatureCollection::new()));
    assert_eq!(store.scenario().base_count, 0);
    assert!(store.scenario().base_frequency_minutes.is_some());

    let scenario = *store.adjust_stops(Direction::Increase).unwrap();
    assert_eq!(scenario.adjusted_count, 1);
    assert_eq!(scenario.factor, 1.0);
    let scenario = *store.adjust_stops(Direction::Increase).unwrap();
    assert_eq!(scenario.adjusted_count, 2);
    assert_eq!(store.stops().synthetic_count(), 2);
}

#[test]
fn stale_response_is_cached_but_not_applied() {
    let mut store = store();
    let token_a = fetch_token(store.select_route("A").unwrap());
    let token_b = fetch_token(store.select_route("B").unwrap());

    assert!(!store.complete_stop_fetch("A", token_a, Ok(stops(4, 0.0))));
    assert_eq!(store.selection(), &Selection::Loading("B".to_string()));
    assert!(store.stops().is_empty());
    assert!(store.cached_stops("A").is_some());

    assert!(store.complete_stop_fetch("B", token_b, Ok(stops(6, 1.0))));
    assert_eq!(store.selection(), &Selection::Ready("B".to_string()));
    assert_eq!(store.scenario().base_count, 6);

    // Cached now, no second fetch.
    assert_eq!(store.select_route("A").unwrap(), SelectOutcome::Ready);
    assert_eq!(store.scenario().base_count, 4);
}

#[test]
fn reselecting_during_fetch_does_not_refetch() {
    let mut store = store();
    let token = fetch_token(store.select_route("A").unwrap());
    fetch_token(store.select_route("B").unwrap());
    assert_eq!(store.select_route("A").unwrap(), SelectOutcome::Pending);
    assert!(store.is_fetching("A"));
    assert!(store.snapshot().loading_flags.stops);

    assert!(store.complete_stop_fetch("A", token, Ok(stops(3, 0.0))));
    assert_eq!(store.selection(), &Selection::Ready("A".to_string()));
    assert!(!store.is_fetching("A"));
}

#[test]
fn unknown_token_is_ignored() {
    let mut store = store();
    let token = fetch_token(store.select_route("A").unwrap());
    assert!(!store.complete_stop_fetch("A", token + 100, Ok(stops(3, 0.0))));
    assert!(store.cached_stops("A").is_none());
    assert!(store.is_fetching("A"));
}

#[test]
fn failure_is_scoped_to_the_route() {
    let mut store = store();
    let token_b = fetch_token(store.select_route("B").unwrap());
    store.complete_stop_fetch("B", token_b, Ok(stops(5, 1.0)));

    let token_a = fetch_token(store.select_route("A").unwrap());
    let failure = source::Error::UpstreamRequestFailed {
        status: 503,
        body: "unavailable".to_string(),
    };
    assert!(store.complete_stop_fetch("A", token_a, Err(failure.clone())));
    assert_eq!(store.selection(), &Selection::Failed("A".to_string()));
    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.error_messages.stops,
        Some(failure.to_string().as_str())
    );
    assert!(store.cached_stops("B").is_some());
    assert_eq!(
        store.adjust_stops(Direction::Increase),
        Err(scenario::Error::NotReady("A".to_string()))
    );

    // Reselecting retries.
    let retry = fetch_token(store.select_route("A").unwrap());
    assert!(retry > token_a);
    assert_eq!(store.stop_error("A"), None);
}

#[test]
fn clearing_keeps_the_cache() {
    let mut store = ready_store(8);
    store.adjust_stops(Direction::Increase).unwrap();
    store.clear_selection();
    assert_eq!(store.selection(), &Selection::Idle);
    assert_eq!(store.scenario(), &StopScenario::default());
    assert!(store.stops().is_empty());
    assert_eq!(
        store.adjust_stops(Direction::Increase),
        Err(scenario::Error::NoSelection)
    );

    assert_eq!(store.select_route("A").unwrap(), SelectOutcome::Ready);
    assert_eq!(store.scenario().adjusted_count, 8);
}

#[test]
fn unknown_route_is_rejected() {
    let mut store = store();
    assert_eq!(
        store.select_route("Z"),
        Err(scenario::Error::UnknownRoute("Z".to_string()))
    );
}

#[test]
fn failed_route_load_is_reported() {
    let mut store = ScenarioStore::new(Config::default());
    store.begin_routes_load();
    assert!(store.snapshot().loading_flags.routes);
    store.set_routes(Err(source::Error::PaginationExceeded { ceiling: 10_000 }));
    let snapshot = store.snapshot();
    assert!(!snapshot.loading_flags.routes);
    assert!(snapshot.error_messages.routes.is_some());
    assert!(store.routes().is_empty());
}

#[test]
fn snapshot_serializes_for_the_map() {
    let store = ready_store(3);
    let value = serde_json::to_value(store.snapshot()).unwrap();
    assert_eq!(value["routesCollection"]["type"], "FeatureCollection");
    assert_eq!(value["stopsCollection"]["features"].as_array().unwrap().len(), 3);
    assert_eq!(value["scenario"]["baseCount"], 3);
    assert_eq!(value["selection"]["state"], "ready");
    assert_eq!(value["selection"]["routeId"], "A");
}

#[test]
fn route_length_is_zero_for_unknown_geometry() {
    let mut store = ScenarioStore::new(Config::default());
    let mut point_route = route("P", 0.0);
    point_route.geometry = Geometry::Point(Coordinate::new(0.0, 0.0));
    store.set_routes(Ok(vec![point_route].into()));
    assert_eq!(store.route_length("P"), Some(Distance::ZERO));
}

#[test]
fn reload_refreshes_ready_scenario() {
    let mut store = ready_store(10);
    store.adjust_stops(Direction::Increase).unwrap();
    assert_eq!(store.scenario().adjusted_count, 13);

    let mut longer = route("A", 0.0);
    longer.geometry = Geometry::LineString(vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 2.0 * TEN_MILES_DEGREES),
    ]);
    store.begin_routes_load();
    store.set_routes(Ok(vec![longer, route("B", 1.0)].into()));

    assert_eq!(store.selection(), &Selection::Ready("A".to_string()));
    let length = store.route_length("A").unwrap();
    assert!((length.as_meters() - 2.0 * 16_093.4).abs() < 1e-6);
    let expected = Config::default().frequency.estimate_minutes(length, 10);
    let scenario = store.scenario();
    assert_eq!(scenario.base_count, 10);
    assert_eq!(scenario.adjusted_count, 10);
    assert_eq!(scenario.base_frequency_minutes, expected);
    assert_eq!(scenario.adjusted_frequency_minutes, expected);
    assert_eq!(store.stops().len(), 10);
}
