//! Headway estimate from route length and stop count.
//!
//! This is a planning approximation, not a timetable: a bus runs the
//! representative length at a flat average speed, dwells a fixed time at the
//! share of stops it serves per direction, and the fleet is sized from route
//! length. Every constant is policy and can be tuned through [`FrequencyModel`].

use crate::shared::{Distance, METERS_PER_MILE};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyModel {
    pub average_speed_mph: f64,
    pub dwell_time_per_stop_seconds: f64,
    /// Miles of route one bus in service is assumed to cover.
    pub route_span_per_bus_miles: f64,
    /// Share of the stop inventory served on one directional pass.
    pub effective_stop_share: f64,
}

impl Default for FrequencyModel {
    fn default() -> Self {
        Self {
            average_speed_mph: 12.0,
            dwell_time_per_stop_seconds: 30.0,
            route_span_per_bus_miles: 1.8,
            effective_stop_share: 0.5,
        }
    }
}

impl FrequencyModel {
    pub fn speed_meters_per_minute(&self) -> f64 {
        self.average_speed_mph * METERS_PER_MILE / 60.0
    }

    pub fn effective_stops(&self, stop_count: usize) -> f64 {
        (stop_count as f64 * self.effective_stop_share).max(0.0)
    }

    pub fn travel_minutes(&self, route_length: Distance) -> f64 {
        let meters = route_length.as_meters();
        let speed = self.speed_meters_per_minute();
        if !meters.is_finite() || meters <= 0.0 || speed <= 0.0 {
            return 0.0;
        }
        meters / speed
    }

    pub fn dwell_minutes(&self, stop_count: usize) -> f64 {
        self.effective_stops(stop_count) * (self.dwell_time_per_stop_seconds / 60.0)
    }

    pub fn buses_in_service(&self, route_length: Distance) -> f64 {
        let buses = (route_length.as_miles() / self.route_span_per_bus_miles).round();
        if buses.is_finite() { buses.max(1.0) } else { 1.0 }
    }

    /// Estimated minutes between buses, `None` when neither travel nor dwell
    /// time is available.
    pub fn estimate_minutes(&self, route_length: Distance, stop_count: usize) -> Option<f64> {
        let travel = self.travel_minutes(route_length);
        let dwell = self.dwell_minutes(stop_count);
        let fallback = if dwell > 0.0 { Some(dwell) } else { None };

        let cycle = travel + dwell;
        if !cycle.is_finite() || cycle <= 0.0 {
            return fallback;
        }

        let frequency = cycle / self.buses_in_service(route_length);
        if frequency.is_finite() && frequency > 0.0 {
            Some(frequency)
        } else {
            fallback
        }
    }
}

pub fn estimate_frequency_minutes(route_length: Distance, stop_count: usize) -> Option<f64> {
    FrequencyModel::default().estimate_minutes(route_length, stop_count)
}

#[test]
fn nothing_to_estimate() {
    assert_eq!(estimate_frequency_minutes(Distance::ZERO, 0), None);
    assert_eq!(
        estimate_frequency_minutes(Distance::from_meters(f64::NAN), 0),
        None
    );
}

#[test]
fn dwell_only_when_length_is_unknown() {
    let minutes = estimate_frequency_minutes(Distance::from_meters(f64::INFINITY), 10).unwrap();
    assert!((minutes - 2.5).abs() < 1e-9);
}

#[test]
fn ten_mile_route_with_ten_stops() {
    // 50 min travel + 2.5 min dwell over round(10 / 1.8) = 6 buses.
    let minutes = estimate_frequency_minutes(Distance::from_miles(10.0), 10).unwrap();
    assert!((minutes - 8.75).abs() < 1e-9);
}
