//! Adapters for a JSON:API transit feed (routes, shapes and stops listings).

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    feature::{RouteFeatureCollection, StopFeatureCollection},
    shared::{Coordinate, Geometry},
    source::{
        self, RawFeature, RawRecord, TransitRoute, TransitShape, decode_polyline,
        normalize_routes, normalize_stops, parse_records,
    },
};

/// One feature-like record per route, built from that route's decoded shapes
/// in the order routes first appear among the shapes.
pub fn route_records(shapes: &[TransitShape], routes: &[TransitRoute]) -> Vec<RawFeature> {
    let route_lookup: HashMap<&str, &TransitRoute> = routes
        .iter()
        .map(|route| (route.id.as_str(), route))
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut lines_by_route: HashMap<&str, Vec<Vec<Coordinate>>> = HashMap::new();
    shapes.iter().for_each(|shape| {
        let Some(route_id) = shape.route_id() else {
            return;
        };
        let Some(polyline) = shape.attributes.polyline.as_deref() else {
            return;
        };
        let line = decode_polyline(polyline);
        if line.len() < 2 {
            return;
        }
        lines_by_route
            .entry(route_id)
            .or_insert_with(|| {
                order.push(route_id);
                Vec::new()
            })
            .push(line);
    });

    order
        .into_iter()
        .filter_map(|route_id| {
            let mut lines = lines_by_route.remove(route_id)?;
            let geometry = if lines.len() == 1 {
                Geometry::LineString(lines.pop()?)
            } else {
                Geometry::MultiLineString(lines)
            };
            let route = route_lookup.get(route_id).copied();
            let attributes = route.map(|route| &route.attributes);
            let number = attributes
                .and_then(|attributes| attributes.short_name.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| route_id.to_string());
            let description = attributes.and_then(|attributes| {
                attributes
                    .long_name
                    .clone()
                    .filter(|name| !name.trim().is_empty())
                    .or_else(|| attributes.description.clone())
            });

            let mut properties = Map::new();
            properties.insert("route_num".to_string(), Value::from(number));
            properties.insert("route_id".to_string(), Value::from(route_id));
            if let Some(description) = description {
                properties.insert("route_desc".to_string(), Value::from(description));
            }
            Some(RawFeature {
                id: Some(Value::from(route_id)),
                geometry: Some(geometry),
                properties: Some(properties),
            })
        })
        .collect()
}

/// Route features from raw shape listings plus route records from either the
/// route listing or the shape listing's `included` section.
pub fn routes_from_shapes(
    shapes: Vec<Value>,
    routes: Vec<Value>,
) -> Result<RouteFeatureCollection, source::Error> {
    let shapes: Vec<TransitShape> = parse_records(shapes);
    let routes: Vec<TransitRoute> = parse_records(routes);
    debug!(
        "Building route features from {} shapes and {} routes",
        shapes.len(),
        routes.len()
    );
    normalize_routes(&route_records(&shapes, &routes))
}

/// Stop features for one route. An empty listing is an empty collection; a
/// listing where nothing normalizes is an error.
pub fn stops_from_listing(stops: Vec<Value>) -> Result<StopFeatureCollection, source::Error> {
    if stops.is_empty() {
        return Ok(StopFeatureCollection::new());
    }
    let records: Vec<RawRecord> = parse_records(stops);
    normalize_stops(&records)
}

#[test]
fn shapes_are_grouped_by_route() {
    use crate::source::encode_polyline;
    use serde_json::json;

    let outbound = encode_polyline(&[Coordinate::new(-71.0, 42.0), Coordinate::new(-71.0, 42.1)]);
    let inbound = encode_polyline(&[Coordinate::new(-71.0, 42.1), Coordinate::new(-71.0, 42.0)]);
    let shapes = vec![
        json!({"attributes": {"polyline": outbound}, "relationships": {"route": {"data": {"id": "39"}}}}),
        json!({"attributes": {"polyline": inbound}, "relationships": {"route": {"data": {"id": "39"}}}}),
        json!({"attributes": {"polyline": ""}, "relationships": {"route": {"data": {"id": "1"}}}}),
    ];
    let routes = vec![json!({
        "id": "39",
        "type": "route",
        "attributes": {"short_name": "39", "long_name": "Forest Hills - Back Bay"}
    })];

    let collection = routes_from_shapes(shapes, routes).unwrap();
    assert_eq!(collection.len(), 1);
    let route = collection.by_id("39").unwrap();
    assert_eq!(route.name(), "Forest Hills - Back Bay");
    assert!(matches!(&route.geometry, Geometry::MultiLineString(lines) if lines.len() == 2));
}

#[test]
fn empty_stop_listing_is_not_an_error() {
    assert!(stops_from_listing(Vec::new()).unwrap().is_empty());
    assert!(matches!(
        stops_from_listing(vec![serde_json::json!({"id": "x", "attributes": {}})]),
        Err(source::Error::NoUsableData(_))
    ));
}
