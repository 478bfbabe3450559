use rayon::prelude::*;
use serde::Serialize;
use std::{collections::HashMap, time::Instant};
use tracing::{debug, warn};

use crate::{
    feature::{RouteFeature, RouteFeatureCollection, StopFeatureCollection},
    scenario::{self, Config, Direction, StopScenario, redistribute_with_limit},
    shared::{Distance, representative_length},
    source,
};

pub type RequestToken = u64;

/// Lifecycle of the current route selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "routeId", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Idle,
    Loading(String),
    Ready(String),
    Failed(String),
}

impl Selection {
    pub fn route_id(&self) -> Option<&str> {
        match self {
            Selection::Idle => None,
            Selection::Loading(id) | Selection::Ready(id) | Selection::Failed(id) => Some(id),
        }
    }
}

/// What the caller has to do after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Stops were cached, the scenario is ready.
    Ready,
    /// Fetch stops for the route and hand the result to [`ScenarioStore::complete_stop_fetch`].
    Fetch {
        route_id: String,
        token: RequestToken,
    },
    /// A fetch for this route is already outstanding.
    Pending,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LoadingFlags {
    pub routes: bool,
    pub stops: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ErrorMessages<'a> {
    pub routes: Option<&'a str>,
    pub stops: Option<&'a str>,
}

/// Read-only view handed to presentation after every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub selection: &'a Selection,
    pub routes_collection: &'a RouteFeatureCollection,
    pub stops_collection: &'a StopFeatureCollection,
    pub scenario: &'a StopScenario,
    pub loading_flags: LoadingFlags,
    pub error_messages: ErrorMessages<'a>,
}

/// Owns everything the scenario view depends on: the route collection, the
/// per-route stop cache, in-flight fetch bookkeeping and the derived scenario.
#[derive(Debug, Default)]
pub struct ScenarioStore {
    config: Config,
    routes: RouteFeatureCollection,
    route_lookup: HashMap<String, usize>,
    route_lengths: Vec<Distance>,
    routes_loading: bool,
    routes_error: Option<String>,

    selection: Selection,
    stop_cache: HashMap<String, StopFeatureCollection>,
    in_flight: HashMap<String, RequestToken>,
    next_token: RequestToken,
    stop_errors: HashMap<String, String>,

    stops: StopFeatureCollection,
    scenario: StopScenario,
}

impl ScenarioStore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn begin_routes_load(&mut self) {
        self.routes_loading = true;
        self.routes_error = None;
    }

    /// Installs a freshly loaded route collection, or records why loading failed.
    pub fn set_routes(&mut self, result: Result<RouteFeatureCollection, source::Error>) {
        self.routes_loading = false;
        let routes = match result {
            Ok(routes) => routes,
            Err(err) => {
                warn!("Loading routes failed: {err}");
                self.routes_error = Some(err.to_string());
                return;
            }
        };

        let now = Instant::now();
        self.route_lengths = routes
            .features
            .par_iter()
            .map(|route| representative_length(&route.geometry))
            .collect();
        self.route_lookup = routes
            .iter()
            .enumerate()
            .map(|(i, route)| (route.id.clone(), i))
            .collect();
        self.routes = routes;
        self.routes_error = None;
        debug!(
            "Installed {} routes in {:?}",
            self.routes.len(),
            now.elapsed()
        );

        let Some(id) = self.selection.route_id().map(str::to_string) else {
            return;
        };
        if !self.route_lookup.contains_key(&id) {
            self.clear_selection();
        } else if matches!(self.selection, Selection::Ready(_)) {
            // Geometry and length may have changed, the scenario restarts from base.
            self.apply_base(&id);
        }
    }

    pub fn routes(&self) -> &RouteFeatureCollection {
        &self.routes
    }

    pub fn route(&self, id: &str) -> Option<&RouteFeature> {
        self.route_lookup.get(id).map(|idx| &self.routes.features[*idx])
    }

    pub fn route_length(&self, id: &str) -> Option<Distance> {
        self.route_lookup.get(id).map(|idx| self.route_lengths[*idx])
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_route(&self) -> Option<&str> {
        self.selection.route_id()
    }

    pub fn stops(&self) -> &StopFeatureCollection {
        &self.stops
    }

    pub fn scenario(&self) -> &StopScenario {
        &self.scenario
    }

    pub fn cached_stops(&self, id: &str) -> Option<&StopFeatureCollection> {
        self.stop_cache.get(id)
    }

    pub fn stop_error(&self, id: &str) -> Option<&str> {
        self.stop_errors.get(id).map(String::as_str)
    }

    pub fn is_fetching(&self, id: &str) -> bool {
        self.in_flight.contains_key(id)
    }

    /// Makes `id` the selected route. Cached stops are applied right away,
    /// otherwise at most one fetch per route is requested.
    pub fn select_route(&mut self, id: &str) -> Result<SelectOutcome, scenario::Error> {
        if !self.route_lookup.contains_key(id) {
            return Err(scenario::Error::UnknownRoute(id.to_string()));
        }

        if self.stop_cache.contains_key(id) {
            self.selection = Selection::Ready(id.to_string());
            self.apply_base(id);
            return Ok(SelectOutcome::Ready);
        }

        self.selection = Selection::Loading(id.to_string());
        self.stops = StopFeatureCollection::new();
        self.scenario = StopScenario::default();

        if self.in_flight.contains_key(id) {
            debug!("Stops for route {id} already requested");
            return Ok(SelectOutcome::Pending);
        }

        self.stop_errors.remove(id);
        self.next_token += 1;
        let token = self.next_token;
        self.in_flight.insert(id.to_string(), token);
        Ok(SelectOutcome::Fetch {
            route_id: id.to_string(),
            token,
        })
    }

    /// Records the outcome of a stop fetch. Successful results are cached for
    /// the session either way; they only change the view when `route_id` is
    /// still the selected route. Returns whether the view changed.
    pub fn complete_stop_fetch(
        &mut self,
        route_id: &str,
        token: RequestToken,
        result: Result<StopFeatureCollection, source::Error>,
    ) -> bool {
        if self.in_flight.get(route_id) != Some(&token) {
            debug!("Discarding superseded stop response for route {route_id}");
            return false;
        }
        self.in_flight.remove(route_id);

        let is_current =
            matches!(&self.selection, Selection::Loading(selected) if selected == route_id);

        match result {
            Ok(stops) => {
                debug!("Caching {} stops for route {route_id}", stops.len());
                self.stop_cache.insert(route_id.to_string(), stops);
                self.stop_errors.remove(route_id);
                if is_current {
                    self.selection = Selection::Ready(route_id.to_string());
                    self.apply_base(route_id);
                } else {
                    debug!("Route {route_id} is no longer selected, response not applied");
                }
            }
            Err(err) => {
                warn!("Loading stops for route {route_id} failed: {err}");
                self.stop_errors.insert(route_id.to_string(), err.to_string());
                if is_current {
                    self.selection = Selection::Failed(route_id.to_string());
                }
            }
        }
        is_current
    }

    /// Drops the selection and its scenario. The stop cache is kept.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::Idle;
        self.stops = StopFeatureCollection::new();
        self.scenario = StopScenario::default();
    }

    fn apply_base(&mut self, route_id: &str) {
        let base_count = self
            .stop_cache
            .get(route_id)
            .map(|stops| stops.points().count())
            .unwrap_or_default();
        let frequency = self.estimate(route_id, base_count);
        self.stops = self.stop_cache.get(route_id).cloned().unwrap_or_default();
        self.scenario = StopScenario {
            base_count,
            adjusted_count: base_count,
            factor: 1.0,
            base_frequency_minutes: frequency,
            adjusted_frequency_minutes: frequency,
        };
    }

    fn estimate(&self, route_id: &str, stop_count: usize) -> Option<f64> {
        let length = self.route_length(route_id).unwrap_or(Distance::ZERO);
        self.config.frequency.estimate_minutes(length, stop_count)
    }

    /// Stop count one adjustment step away from the current scenario.
    pub fn next_target(&self, direction: Direction) -> usize {
        let max = self.config.max_adjusted_stops.max(1);
        let base = self.scenario.base_count;
        let current = if self.scenario.adjusted_count > 0 {
            self.scenario.adjusted_count
        } else {
            base
        };
        let multiplier = direction.multiplier(self.config.adjustment_step);

        let target = if base > 0 {
            let base = base as f64;
            let factor = (current as f64 / base * multiplier).clamp(1.0 / base, max as f64 / base);
            (base * factor).round() as usize
        } else {
            (current as f64 * multiplier).round() as usize
        };
        let target = target.clamp(1, max);

        if target == current {
            direction.nudge(current).clamp(1, max)
        } else {
            target
        }
    }

    /// Moves the selected route's stop count one step and recomputes the
    /// adjusted stops and headway.
    pub fn adjust_stops(&mut self, direction: Direction) -> Result<&StopScenario, scenario::Error> {
        let route_id = match &self.selection {
            Selection::Ready(id) => id.clone(),
            Selection::Idle => return Err(scenario::Error::NoSelection),
            Selection::Loading(id) | Selection::Failed(id) => {
                return Err(scenario::Error::NotReady(id.clone()));
            }
        };
        let route = self
            .route(&route_id)
            .ok_or_else(|| scenario::Error::UnknownRoute(route_id.clone()))?;
        let base = self
            .stop_cache
            .get(&route_id)
            .ok_or_else(|| scenario::Error::NotReady(route_id.clone()))?;

        let target = self.next_target(direction);
        let now = Instant::now();
        let stops =
            redistribute_with_limit(base, &route.geometry, target, self.config.max_adjusted_stops);
        debug!(
            "Redistributed route {route_id} to {} of {target} stops in {:?}",
            stops.len(),
            now.elapsed()
        );

        let base_count = self.scenario.base_count;
        let adjusted_count = target;
        self.scenario.adjusted_count = adjusted_count;
        self.scenario.factor = if base_count > 0 {
            adjusted_count as f64 / base_count as f64
        } else {
            1.0
        };
        self.scenario.adjusted_frequency_minutes = self.estimate(&route_id, adjusted_count);
        self.stops = stops;
        Ok(&self.scenario)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let stops_error = self
            .selection
            .route_id()
            .and_then(|id| self.stop_errors.get(id))
            .map(String::as_str);
        Snapshot {
            selection: &self.selection,
            routes_collection: &self.routes,
            stops_collection: &self.stops,
            scenario: &self.scenario,
            loading_flags: LoadingFlags {
                routes: self.routes_loading,
                stops: matches!(self.selection, Selection::Loading(_)),
            },
            error_messages: ErrorMessages {
                routes: self.routes_error.as_deref(),
                stops: stops_error,
            },
        }
    }
}
