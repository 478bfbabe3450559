use std::{cmp, collections::HashSet};

use crate::{
    feature::{StopFeature, StopFeatureCollection},
    scenario::MAX_ADJUSTED_STOPS,
    shared::{Coordinate, Geometry, sample_along},
};

/// Hands out synthetic stop ids in increasing order, skipping any id already
/// used by a base stop.
struct SyntheticIds<'a> {
    next: usize,
    taken: HashSet<&'a str>,
}

impl<'a> SyntheticIds<'a> {
    fn new(base: &'a StopFeatureCollection) -> Self {
        Self {
            next: 0,
            taken: base.iter().map(|stop| stop.id.as_str()).collect(),
        }
    }

    fn stop(&mut self, coordinate: Coordinate) -> StopFeature {
        loop {
            self.next += 1;
            let id = format!("synthetic-{}", self.next);
            if !self.taken.contains(id.as_str()) {
                return StopFeature::synthetic(id, coordinate, self.next);
            }
        }
    }
}

/// Builds a stop collection of `target_count` stops from `base`, keeping base
/// stops where it can. Deterministic for fixed input.
pub fn redistribute(
    base: &StopFeatureCollection,
    geometry: &Geometry,
    target_count: usize,
) -> StopFeatureCollection {
    redistribute_with_limit(base, geometry, target_count, MAX_ADJUSTED_STOPS)
}

pub fn redistribute_with_limit(
    base: &StopFeatureCollection,
    geometry: &Geometry,
    target_count: usize,
    max_stops: usize,
) -> StopFeatureCollection {
    let target_count = cmp::min(target_count, max_stops);
    if target_count == 0 {
        return StopFeatureCollection::new();
    }

    let points: Vec<(&StopFeature, Coordinate)> = base.points().collect();
    let base_count = points.len();
    let mut ids = SyntheticIds::new(base);

    if base_count == 0 {
        return sample_along(geometry, target_count)
            .into_iter()
            .map(|coordinate| ids.stop(coordinate))
            .collect::<Vec<_>>()
            .into();
    }

    if target_count <= base_count {
        return subsample(&points, target_count).into();
    }

    let mut stops: Vec<StopFeature> = if base_count < 2 {
        let additional = target_count - base_count;
        points
            .iter()
            .map(|(stop, _)| (*stop).clone())
            .chain(
                sample_along(geometry, additional)
                    .into_iter()
                    .map(|coordinate| ids.stop(coordinate)),
            )
            .collect()
    } else {
        fill_gaps(&points, target_count - base_count, &mut ids)
    };
    stops.truncate(target_count);
    stops.into()
}

/// Evenly spaced pick of `count` stops; both ends are kept once `count >= 2`.
fn subsample(points: &[(&StopFeature, Coordinate)], count: usize) -> Vec<StopFeature> {
    if count == 1 {
        return vec![points[0].0.clone()];
    }
    let last = points.len() - 1;
    let interval = last as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let idx = cmp::min((i as f64 * interval).round() as usize, last);
            points[idx].0.clone()
        })
        .collect()
}

/// Spreads `additional` synthetic stops over the gaps between consecutive base
/// stops, proportionally to gap length.
fn fill_gaps(
    points: &[(&StopFeature, Coordinate)],
    additional: usize,
    ids: &mut SyntheticIds,
) -> Vec<StopFeature> {
    let gaps: Vec<f64> = points
        .windows(2)
        .map(|pair| pair[0].1.haversine_distance(&pair[1].1).as_meters())
        .collect();
    let allocation = allocate_largest_remainder(&gaps, additional);

    let mut stops: Vec<StopFeature> = Vec::with_capacity(points.len() + additional);
    points.windows(2).zip(allocation).for_each(|(pair, k)| {
        let (start_stop, start) = pair[0];
        let (_, end) = pair[1];
        stops.push(start_stop.clone());
        (1..=k).for_each(|step| {
            let t = step as f64 / (k + 1) as f64;
            stops.push(ids.stop(start.interpolate(&end, t)));
        });
    });
    if let Some((last, _)) = points.last() {
        stops.push((*last).clone());
    }
    stops
}

/// Splits `units` across `weights` with largest-remainder rounding. Leftover
/// units go to the largest fractional parts first (earlier index on ties),
/// then round-robin. Degenerate weights split evenly.
pub fn allocate_largest_remainder(weights: &[f64], units: usize) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    let weights: Vec<f64> = if total > 0.0 && total.is_finite() {
        weights
            .iter()
            .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
            .collect()
    } else {
        vec![1.0; weights.len()]
    };
    let total: f64 = weights.iter().sum();

    let shares: Vec<f64> = weights
        .iter()
        .map(|w| w / total * units as f64)
        .collect();
    let mut allocation: Vec<usize> = shares.iter().map(|share| share.floor() as usize).collect();
    let assigned: usize = allocation.iter().sum();
    let mut leftover = units.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|a, b| {
        let ra = shares[*a] - shares[*a].floor();
        let rb = shares[*b] - shares[*b].floor();
        rb.partial_cmp(&ra).unwrap_or(cmp::Ordering::Equal)
    });
    for idx in order {
        if leftover == 0 {
            break;
        }
        allocation[idx] += 1;
        leftover -= 1;
    }

    let len = allocation.len();
    let mut idx = 0;
    while leftover > 0 {
        allocation[idx % len] += 1;
        leftover -= 1;
        idx += 1;
    }
    allocation
}

#[test]
fn largest_remainder_sums_to_units() {
    let allocation = allocate_largest_remainder(&[1.0, 1.0, 1.0], 4);
    assert_eq!(allocation, vec![2, 1, 1]);
    assert_eq!(allocate_largest_remainder(&[3.0, 1.0], 4), vec![3, 1]);
    assert_eq!(allocate_largest_remainder(&[0.0, 0.0], 3), vec![2, 1]);
    assert_eq!(allocate_largest_remainder(&[2.0, 1.0], 0), vec![0, 0]);
}

#[test]
fn largest_remainder_prefers_bigger_fraction() {
    // shares: 0.3 * 2 = 0.6 and 0.7 * 2 = 1.4
    assert_eq!(allocate_largest_remainder(&[0.3, 0.7], 2), vec![1, 1]);
    // shares: 0.2 * 3 = 0.6 and 0.8 * 3 = 2.4
    assert_eq!(allocate_largest_remainder(&[0.2, 0.8], 3), vec![1, 2]);
}
