//! Scenario engine for transit route maps.
//!
//! Upstream route, shape and stop listings are normalized into GeoJSON-style
//! features ([`source`]), measured ([`shared::geo`]) and then perturbed by the
//! stop scenario ([`scenario`]): stops are redistributed along the route and
//! the headway is re-estimated for the new stop count.

pub mod feature;
pub mod scenario;
pub mod shared;
pub mod source;

pub mod prelude {
    pub use crate::feature::{
        FeatureCollection, RouteFeature, RouteFeatureCollection, RouteProperties, StopFeature,
        StopFeatureCollection, StopProperties,
    };
    pub use crate::scenario::{
        Direction, FrequencyModel, MAX_ADJUSTED_STOPS, ScenarioStore, SelectOutcome, Selection,
        Snapshot, StopScenario, estimate_frequency_minutes, redistribute,
    };
    pub use crate::shared::{Coordinate, Distance, Geometry};
    pub use crate::source::{Page, PageConfig, decode_polyline, paginate};
}
