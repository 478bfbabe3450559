pub mod frequency;
pub mod redistribute;
mod store;

pub use frequency::*;
pub use redistribute::*;
pub use store::*;

use serde::Serialize;
use thiserror::Error;

pub const MAX_ADJUSTED_STOPS: usize = 400;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Route id does not match any entry: {0}")]
    UnknownRoute(String),
    #[error("No route is selected")]
    NoSelection,
    #[error("Stops for route {0} are not loaded")]
    NotReady(String),
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub max_adjusted_stops: usize,
    /// Relative change applied by one stop adjustment.
    pub adjustment_step: f64,
    pub frequency: FrequencyModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_adjusted_stops: MAX_ADJUSTED_STOPS,
            adjustment_step: 0.25,
            frequency: FrequencyModel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn multiplier(&self, step: f64) -> f64 {
        match self {
            Direction::Increase => 1.0 + step,
            Direction::Decrease => 1.0 - step,
        }
    }

    pub fn nudge(&self, count: usize) -> usize {
        match self {
            Direction::Increase => count.saturating_add(1),
            Direction::Decrease => count.saturating_sub(1),
        }
    }
}

/// The stop-count perturbation currently applied to the selected route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopScenario {
    pub base_count: usize,
    pub adjusted_count: usize,
    /// `adjusted_count / base_count`, or 1 when there is no base.
    pub factor: f64,
    pub base_frequency_minutes: Option<f64>,
    pub adjusted_frequency_minutes: Option<f64>,
}

impl Default for StopScenario {
    fn default() -> Self {
        Self {
            base_count: 0,
            adjusted_count: 0,
            factor: 1.0,
            base_frequency_minutes: None,
            adjusted_frequency_minutes: None,
        }
    }
}

impl StopScenario {
    pub fn has_adjustment(&self) -> bool {
        self.adjusted_count != self.base_count
    }
}
