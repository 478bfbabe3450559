use rayon::prelude::*;
use serde_json::Value;
use std::{collections::HashSet, time::Instant};
use tracing::debug;

use crate::{
    feature::{
        RouteFeature, RouteFeatureCollection, RouteProperties, StopFeature, StopFeatureCollection,
        StopProperties,
    },
    shared::{Coordinate, Geometry, coerce_f64, coerce_string},
    source::{self, RawFeature, RawRecord, parse_records},
};

pub const DEFAULT_STOP_NAME: &str = "Unnamed stop";

/// Canonical route feature from a feature-like record, or `None` when it has
/// no usable line geometry.
pub fn normalize_route(raw: &RawFeature, index: usize) -> Option<RouteFeature> {
    let geometry = clean_line_geometry(raw.geometry.as_ref()?)?;

    let route_number = coerce_string(raw.property("route_num"))
        .or_else(|| coerce_string(raw.property("route_id")));
    let route_name = coerce_string(raw.property("route_desc"))
        .or_else(|| coerce_string(raw.property("name")));

    let fallback_id = route_number
        .clone()
        .unwrap_or_else(|| format!("route-{index}"));
    let id = coerce_string(raw.id.as_ref())
        .or_else(|| coerce_string(raw.property("shape_id")))
        .or_else(|| coerce_string(raw.property("OBJECTID")))
        .unwrap_or_else(|| fallback_id.clone());

    let name = match (route_name, &route_number) {
        (Some(name), _) => name,
        (None, Some(number)) => format!("Route {number}"),
        (None, None) => format!("Route {}", index + 1),
    };
    let route_id = route_number.unwrap_or(fallback_id);

    Some(RouteFeature {
        id,
        geometry,
        properties: RouteProperties::new(route_id, name),
    })
}

/// Keeps only finite vertices, drops consecutive duplicates and parts left
/// with fewer than two points.
fn clean_line_geometry(geometry: &Geometry) -> Option<Geometry> {
    fn clean(line: &[Coordinate]) -> Option<Vec<Coordinate>> {
        let mut cleaned: Vec<Coordinate> = Vec::with_capacity(line.len());
        line.iter()
            .filter(|coordinate| coordinate.is_finite())
            .for_each(|coordinate| {
                if cleaned.last() != Some(coordinate) {
                    cleaned.push(*coordinate);
                }
            });
        if cleaned.len() >= 2 { Some(cleaned) } else { None }
    }

    match geometry {
        Geometry::LineString(line) => clean(line).map(Geometry::LineString),
        Geometry::MultiLineString(lines) => {
            let lines: Vec<_> = lines.iter().filter_map(|line| clean(line)).collect();
            if lines.is_empty() {
                None
            } else {
                Some(Geometry::MultiLineString(lines))
            }
        }
        _ => None,
    }
}

/// Canonical stop feature, or `None` when latitude or longitude is not a finite number.
pub fn normalize_stop(raw: &RawRecord, index: usize) -> Option<StopFeature> {
    let latitude = coerce_f64(raw.attribute("latitude"))?;
    let longitude = coerce_f64(raw.attribute("longitude"))?;

    let id = coerce_string(raw.id.as_ref())
        .or_else(|| coerce_string(raw.attribute("stop_id")))
        .unwrap_or_else(|| format!("stop-{index}"));

    let properties = StopProperties {
        name: coerce_string(raw.attribute("name"))
            .unwrap_or_else(|| DEFAULT_STOP_NAME.to_string()),
        description: coerce_string(raw.attribute("description")),
        municipality: coerce_string(raw.attribute("municipality")),
        wheelchair_boarding: coerce_string(raw.attribute("wheelchair_boarding")),
        platform_code: coerce_string(raw.attribute("platform_code")),
        on_street: coerce_string(raw.attribute("on_street")),
        at_street: coerce_string(raw.attribute("at_street")),
        is_synthetic: false,
    };

    Some(StopFeature::new(
        id,
        Coordinate::new(longitude, latitude),
        properties,
    ))
}

/// Normalizes a batch of route records, dropping the unusable ones and making
/// feature ids unique within the batch.
pub fn normalize_routes(raw: &[RawFeature]) -> Result<RouteFeatureCollection, source::Error> {
    let now = Instant::now();
    let mut routes: Vec<RouteFeature> = raw
        .par_iter()
        .enumerate()
        .filter_map(|(i, feature)| normalize_route(feature, i))
        .collect();
    if routes.is_empty() {
        return Err(source::Error::NoUsableData("routes".to_string()));
    }
    make_ids_unique(&mut routes);
    debug!(
        "Normalized {} of {} routes in {:?}",
        routes.len(),
        raw.len(),
        now.elapsed()
    );
    Ok(routes.into())
}

pub fn normalize_route_values(values: Vec<Value>) -> Result<RouteFeatureCollection, source::Error> {
    normalize_routes(&parse_records::<RawFeature>(values))
}

pub fn normalize_stops(raw: &[RawRecord]) -> Result<StopFeatureCollection, source::Error> {
    let now = Instant::now();
    let stops: Vec<StopFeature> = raw
        .par_iter()
        .enumerate()
        .filter_map(|(i, record)| normalize_stop(record, i))
        .collect();
    if stops.is_empty() {
        return Err(source::Error::NoUsableData("stops".to_string()));
    }
    debug!(
        "Normalized {} of {} stops in {:?}",
        stops.len(),
        raw.len(),
        now.elapsed()
    );
    Ok(stops.into())
}

pub fn normalize_stop_values(values: Vec<Value>) -> Result<StopFeatureCollection, source::Error> {
    normalize_stops(&parse_records::<RawRecord>(values))
}

/// Repeated ids get a `-2`, `-3`, ... suffix that no other feature uses.
fn make_ids_unique(routes: &mut [RouteFeature]) {
    let taken: HashSet<String> = routes.iter().map(|route| route.id.clone()).collect();
    let mut used: HashSet<String> = HashSet::with_capacity(routes.len());
    routes.iter_mut().for_each(|route| {
        if used.contains(&route.id) {
            let base = route.id.clone();
            let mut n = 2;
            let mut candidate = format!("{base}-{n}");
            while used.contains(&candidate) || taken.contains(&candidate) {
                n += 1;
                candidate = format!("{base}-{n}");
            }
            route.id = candidate;
        }
        used.insert(route.id.clone());
    });
}

#[test]
fn clean_line_geometry_drops_duplicates() {
    let geometry = Geometry::MultiLineString(vec![
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
        ],
        vec![Coordinate::new(5.0, 5.0), Coordinate::new(5.0, 5.0)],
    ]);
    assert_eq!(
        clean_line_geometry(&geometry),
        Some(Geometry::MultiLineString(vec![vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
        ]]))
    );
    assert_eq!(
        clean_line_geometry(&Geometry::Point(Coordinate::new(0.0, 0.0))),
        None
    );
}

#[test]
fn unique_ids_skip_existing() {
    let line = Geometry::LineString(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)]);
    let route = |id: &str| RouteFeature {
        id: id.to_string(),
        geometry: line.clone(),
        properties: RouteProperties::new(id, id),
    };
    let mut routes = vec![route("7"), route("7"), route("7-2")];
    make_ids_unique(&mut routes);
    let ids: Vec<_> = routes.iter().map(|route| route.id.as_str()).collect();
    assert_eq!(ids, vec!["7", "7-3", "7-2"]);
}
