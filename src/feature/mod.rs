mod models;
pub use models::*;

use serde::{Deserialize, Serialize};

/// GeoJSON `FeatureCollection`. An empty collection is the "no data" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection<F> {
    pub features: Vec<F>,
}

impl<F> Default for FeatureCollection<F> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
        }
    }
}

impl<F> From<Vec<F>> for FeatureCollection<F> {
    fn from(features: Vec<F>) -> Self {
        Self { features }
    }
}

impl<F> FeatureCollection<F> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.features.iter()
    }
}

pub type RouteFeatureCollection = FeatureCollection<RouteFeature>;
pub type StopFeatureCollection = FeatureCollection<StopFeature>;

impl RouteFeatureCollection {
    pub fn by_id(&self, id: &str) -> Option<&RouteFeature> {
        self.features.iter().find(|route| route.id == id)
    }
}

impl StopFeatureCollection {
    /// Features that carry a point geometry, in collection order.
    pub fn points(&self) -> impl Iterator<Item = (&StopFeature, crate::shared::Coordinate)> {
        self.features
            .iter()
            .filter_map(|stop| stop.geometry.point().map(|point| (stop, point)))
    }

    pub fn synthetic_count(&self) -> usize {
        self.features
            .iter()
            .filter(|stop| stop.properties.is_synthetic)
            .count()
    }
}
