use headway::{feature::RouteFeature, scenario::ScenarioStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: String,
    pub route_id: String,
    pub name: String,
    pub color: String,
    pub length_meters: f64,
    pub cached_stops: Option<usize>,
}

impl RouteDto {
    pub fn from(route: &RouteFeature, store: &ScenarioStore) -> Self {
        let id = route.id.to_string();
        let route_id = route.route_id().to_string();
        let name = route.name().to_string();
        let color = route.properties.color.to_string();
        let length_meters = store
            .route_length(&route.id)
            .map(|length| length.as_meters())
            .unwrap_or_default();
        let cached_stops = store.cached_stops(&route.id).map(|stops| stops.len());
        Self {
            id,
            route_id,
            name,
            color,
            length_meters,
            cached_stops,
        }
    }
}
