//! Adapters for ArcGIS feature-service query results.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    shared::{Coordinate, Geometry},
    source::{self, Page, RawFeature, RawRecord},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArcGisGeometry {
    Point { x: f64, y: f64 },
    Paths { paths: Vec<Vec<Vec<f64>>> },
    Rings { rings: Vec<Vec<Vec<f64>>> },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArcGisRecord {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<ArcGisGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    features: Option<Vec<Value>>,
    #[serde(default)]
    exceeded_transfer_limit: bool,
}

/// Parses one page of a `query` response. The service signals more data
/// through `exceededTransferLimit`.
pub fn parse_page(body: &str) -> Result<Page<Value>, source::Error> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|err| source::Error::MalformedResponse(err.to_string()))?;
    let items = response.features.ok_or_else(|| {
        source::Error::MalformedResponse("query response is missing features".to_string())
    })?;
    Ok(Page {
        items,
        has_next: response.exceeded_transfer_limit,
    })
}

fn to_coordinates(points: &[Vec<f64>]) -> Vec<Coordinate> {
    points
        .iter()
        .filter_map(|point| Coordinate::try_from(point.clone()).ok())
        .filter(Coordinate::is_finite)
        .collect()
}

/// Remaps an ArcGIS geometry onto GeoJSON. Paths shorter than two vertices
/// and rings of three vertices or fewer are dropped.
pub fn to_geometry(geometry: &ArcGisGeometry) -> Option<Geometry> {
    match geometry {
        ArcGisGeometry::Point { x, y } => {
            let point = Coordinate::new(*x, *y);
            point.is_finite().then_some(Geometry::Point(point))
        }
        ArcGisGeometry::Paths { paths } => {
            let mut lines: Vec<Vec<Coordinate>> = paths
                .iter()
                .map(|path| to_coordinates(path))
                .filter(|line| line.len() >= 2)
                .collect();
            match lines.len() {
                0 => None,
                1 => lines.pop().map(Geometry::LineString),
                _ => Some(Geometry::MultiLineString(lines)),
            }
        }
        ArcGisGeometry::Rings { rings } => {
            let mut rings: Vec<Vec<Coordinate>> = rings
                .iter()
                .map(|ring| to_coordinates(ring))
                .filter(|ring| ring.len() > 3)
                .collect();
            match rings.len() {
                0 => None,
                1 => rings.pop().map(|ring| Geometry::Polygon(vec![ring])),
                _ => Some(Geometry::MultiPolygon(
                    rings.into_iter().map(|ring| vec![ring]).collect(),
                )),
            }
        }
    }
}

/// Route layer record as a feature-like record. Survey layers carry their
/// identity in `OBJECTID`, which route normalization already consults.
pub fn to_route_record(record: &ArcGisRecord) -> RawFeature {
    RawFeature {
        id: None,
        geometry: record.geometry.as_ref().and_then(to_geometry),
        properties: Some(record.attributes.clone()),
    }
}

/// Stop layer record. A point geometry fills in missing `latitude`/`longitude`.
pub fn to_stop_record(record: &ArcGisRecord) -> RawRecord {
    let mut attributes = record.attributes.clone();
    if let Some(ArcGisGeometry::Point { x, y }) = &record.geometry {
        attributes
            .entry("longitude")
            .or_insert_with(|| Value::from(*x));
        attributes
            .entry("latitude")
            .or_insert_with(|| Value::from(*y));
    }
    let id = attributes
        .get("stop_id")
        .or_else(|| attributes.get("OBJECTID"))
        .cloned();
    RawRecord {
        id,
        attributes: Some(attributes),
    }
}

#[test]
fn point_geometry() {
    let geometry = ArcGisGeometry::Point { x: -71.1, y: 42.3 };
    assert_eq!(
        to_geometry(&geometry),
        Some(Geometry::Point(Coordinate::new(-71.1, 42.3)))
    );
}

#[test]
fn short_rings_are_dropped() {
    let geometry: ArcGisGeometry = serde_json::from_value(serde_json::json!({
        "rings": [
            [[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]],
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]
        ]
    }))
    .unwrap();
    match to_geometry(&geometry) {
        Some(Geometry::Polygon(rings)) => assert_eq!(rings[0].len(), 4),
        other => panic!("expected a polygon, got {other:?}"),
    }
}
