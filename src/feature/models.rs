use serde::{Deserialize, Serialize};

use crate::shared::{Coordinate, Geometry, route_color};

/// Display metadata for a route. `route_id`, `name` and `color` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProperties {
    pub route_id: String,
    pub name: String,
    pub color: String,
}

impl RouteProperties {
    pub fn new(route_id: impl Into<String>, name: impl Into<String>) -> Self {
        let route_id = route_id.into();
        let color = route_color(&route_id).to_string();
        Self {
            route_id,
            name: name.into(),
            color,
        }
    }
}

/// One transit route: its path as a (multi) line string plus display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct RouteFeature {
    pub id: String,
    pub geometry: Geometry,
    pub properties: RouteProperties,
}

impl RouteFeature {
    pub fn route_id(&self) -> &str {
        &self.properties.route_id
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopProperties {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    /// Upstream accessibility code, kept verbatim (e.g. "0", "1", "2").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheelchair_boarding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_street: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_synthetic: bool,
}

/// A place a vehicle serves passengers, sourced upstream or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct StopFeature {
    pub id: String,
    pub geometry: Geometry,
    pub properties: StopProperties,
}

impl StopFeature {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, properties: StopProperties) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry::Point(coordinate),
            properties,
        }
    }

    pub fn synthetic(id: impl Into<String>, coordinate: Coordinate, label: usize) -> Self {
        Self::new(
            id,
            coordinate,
            StopProperties {
                name: format!("Proposed stop {label}"),
                description: Some("Added by the stop scenario".to_string()),
                is_synthetic: true,
                ..Default::default()
            },
        )
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.geometry.point()
    }

    pub fn is_synthetic(&self) -> bool {
        self.properties.is_synthetic
    }
}

#[test]
fn stop_feature_wire_format() {
    let stop = StopFeature::synthetic("synthetic-1", Coordinate::new(-71.0, 42.0), 1);
    let value = serde_json::to_value(&stop).unwrap();
    assert_eq!(value["type"], "Feature");
    assert_eq!(value["geometry"]["type"], "Point");
    assert_eq!(value["geometry"]["coordinates"][0], -71.0);
    assert_eq!(value["properties"]["isSynthetic"], true);
}

#[test]
fn route_properties_pick_color() {
    let properties = RouteProperties::new("39", "Forest Hills - Back Bay");
    assert_eq!(properties.color, route_color("39"));
}
