use std::{
    cmp,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: Distance = Distance::from_meters(6_371_000.0);
pub const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Distance {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Distance {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|distance| distance.0).sum())
    }
}

impl From<f64> for Distance {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn from_miles(distance: f64) -> Self {
        Self(distance * METERS_PER_MILE)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    pub const fn as_miles(&self) -> f64 {
        self.0 / METERS_PER_MILE
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

/// A WGS84 position. On the wire it is always the GeoJSON pair `[lng, lat]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.longitude, self.latitude))
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    // Extra ordinates (altitude, measure) are ignored.
    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [longitude, latitude, ..] => Ok(Self::new(*longitude, *latitude)),
            _ => Err(format!(
                "expected a [lng, lat] pair, got {} values",
                value.len()
            )),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.longitude, value.latitude]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl Coordinate {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Great-circle distance using the haversine formula.
    /// Non-finite input yields a zero distance instead of NaN.
    pub fn haversine_distance(&self, coord: &Self) -> Distance {
        if !self.is_finite() || !coord.is_finite() {
            return Distance::ZERO;
        }
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        EARTH_RADIUS * c
    }

    /// Linear interpolation between two positions, `t` is clamped to `[0, 1]`.
    pub fn interpolate(&self, end: &Self, t: f64) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self {
            longitude: self.longitude + (end.longitude - self.longitude) * t,
            latitude: self.latitude + (end.latitude - self.latitude) * t,
        }
    }
}

/// GeoJSON geometry, tagged by `type` with the payload under `coordinates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
}

impl Geometry {
    pub fn point(&self) -> Option<Coordinate> {
        match self {
            Geometry::Point(coordinate) => Some(*coordinate),
            _ => None,
        }
    }

    /// The line parts of a linear geometry in listed order, empty for anything else.
    pub fn lines(&self) -> Vec<&[Coordinate]> {
        match self {
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::MultiLineString(lines) => lines.iter().map(|line| line.as_slice()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(line) => line.len(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::len))
                .sum(),
        }
    }
}

pub fn distance(a: &Coordinate, b: &Coordinate) -> Distance {
    a.haversine_distance(b)
}

pub fn line_length(coords: &[Coordinate]) -> Distance {
    coords
        .windows(2)
        .map(|pair| pair[0].haversine_distance(&pair[1]))
        .sum()
}

/// Length used for travel time. A single line is measured directly. For a
/// multi-line the two longest parts are averaged, which approximates one
/// trunk run when a route ships both directional shapes plus branch variants.
pub fn representative_length(geometry: &Geometry) -> Distance {
    match geometry {
        Geometry::LineString(line) => line_length(line),
        Geometry::MultiLineString(lines) => {
            let mut lengths: Vec<Distance> = lines.iter().map(|line| line_length(line)).collect();
            lengths.sort_by(|a, b| b.partial_cmp(a).unwrap_or(cmp::Ordering::Equal));
            let longest: Vec<Distance> = lengths.into_iter().take(2).collect();
            if longest.is_empty() {
                Distance::ZERO
            } else {
                let count = longest.len() as f64;
                longest.into_iter().sum::<Distance>() / count
            }
        }
        _ => Distance::ZERO,
    }
}

struct Segment {
    start: Coordinate,
    end: Coordinate,
    offset: Distance,
    length: Distance,
}

/// Places `count` positions evenly by arc length along the linear parts of
/// `geometry`, both ends included. Parts are walked in listed order and are
/// not bridged to each other.
pub fn sample_along(geometry: &Geometry, count: usize) -> Vec<Coordinate> {
    if count == 0 {
        return Vec::new();
    }

    let lines = geometry.lines();
    let first = match lines.iter().find_map(|line| line.first()) {
        Some(first) => *first,
        None => return geometry.point().map(|p| vec![p; count]).unwrap_or_default(),
    };
    if count == 1 {
        return vec![first];
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut total = Distance::ZERO;
    lines.iter().for_each(|line| {
        line.windows(2).for_each(|pair| {
            let length = pair[0].haversine_distance(&pair[1]);
            segments.push(Segment {
                start: pair[0],
                end: pair[1],
                offset: total,
                length,
            });
            total += length;
        });
    });

    if segments.is_empty() || total.as_meters() <= 0.0 || !total.is_finite() {
        return vec![first; count];
    }

    let step = total.as_meters() / (count - 1) as f64;
    let mut idx = 0;
    (0..count)
        .map(|i| {
            let target = step * i as f64;
            while idx + 1 < segments.len()
                && (segments[idx].offset + segments[idx].length).as_meters() < target
            {
                idx += 1;
            }
            let segment = &segments[idx];
            let t = if segment.length.as_meters() > 0.0 {
                (target - segment.offset.as_meters()) / segment.length.as_meters()
            } else {
                0.0
            };
            segment.start.interpolate(&segment.end, t)
        })
        .collect()
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn miles_test() {
    let ten_miles = Distance::from_miles(10.0);
    assert!((ten_miles.as_meters() - 16_093.4).abs() < 1e-9);
    assert!((ten_miles.as_miles() - 10.0).abs() < 1e-12);
}

#[test]
fn non_finite_distance_is_zero() {
    let a = Coordinate::new(f64::NAN, 1.0);
    let b = Coordinate::new(0.0, 0.0);
    assert_eq!(a.haversine_distance(&b), Distance::ZERO);
}

#[test]
fn interpolate_clamps() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(2.0, 4.0);
    assert_eq!(a.interpolate(&b, 0.5), Coordinate::new(1.0, 2.0));
    assert_eq!(a.interpolate(&b, -1.0), a);
    assert_eq!(a.interpolate(&b, 3.0), b);
}

#[test]
fn coordinate_wire_format() {
    let coordinate: Coordinate = serde_json::from_str("[-71.06, 42.35, 12.0]").unwrap();
    assert_eq!(coordinate, Coordinate::new(-71.06, 42.35));
    assert_eq!(serde_json::to_string(&coordinate).unwrap(), "[-71.06,42.35]");
    assert!(serde_json::from_str::<Coordinate>("[1.0]").is_err());
}
