//! Encoded polyline format (precision 1e5), as served by transit shape endpoints.

use crate::shared::Coordinate;

const PRECISION: f64 = 1e5;
// Largest step between two valid points: a full turn of longitude.
const MAX_DELTA: u64 = 360 * 100_000;

/// Decodes into `[lng, lat]` coordinates. Truncated or malformed input yields
/// the prefix that decoded cleanly.
pub fn decode_polyline(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;
    let mut coordinates = Vec::new();

    while index < bytes.len() {
        let Some(delta_lat) = next_value(bytes, &mut index) else {
            break;
        };
        let Some(delta_lon) = next_value(bytes, &mut index) else {
            break;
        };
        if delta_lat.unsigned_abs() > MAX_DELTA || delta_lon.unsigned_abs() > MAX_DELTA {
            break;
        }
        let (Some(next_lat), Some(next_lon)) = (
            latitude.checked_add(delta_lat),
            longitude.checked_add(delta_lon),
        ) else {
            break;
        };
        latitude = next_lat;
        longitude = next_lon;
        coordinates.push(Coordinate::new(
            longitude as f64 / PRECISION,
            latitude as f64 / PRECISION,
        ));
    }
    coordinates
}

fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let chunk = (*bytes.get(*index)? as i64) - 63;
        *index += 1;
        if !(0..64).contains(&chunk) || shift > 60 {
            return None;
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

pub fn encode_polyline(coordinates: &[Coordinate]) -> String {
    let mut encoded = String::new();
    let mut previous = (0i64, 0i64);
    coordinates.iter().for_each(|coordinate| {
        let latitude = (coordinate.latitude * PRECISION).round() as i64;
        let longitude = (coordinate.longitude * PRECISION).round() as i64;
        push_value(&mut encoded, latitude - previous.0);
        push_value(&mut encoded, longitude - previous.1);
        previous = (latitude, longitude);
    });
    encoded
}

fn push_value(encoded: &mut String, value: i64) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        encoded.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    encoded.push((value as u8 + 63) as char);
}

#[test]
fn decode_reference_sample() {
    let coordinates = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    let expected = [(-120.2, 38.5), (-120.95, 40.7), (-126.453, 43.252)];
    assert_eq!(coordinates.len(), expected.len());
    coordinates
        .iter()
        .zip(expected)
        .for_each(|(coordinate, (lng, lat))| {
            assert!((coordinate.longitude - lng).abs() < 1e-5);
            assert!((coordinate.latitude - lat).abs() < 1e-5);
        });
}

#[test]
fn decode_empty() {
    assert!(decode_polyline("").is_empty());
}

#[test]
fn decode_truncated_keeps_prefix() {
    // Reference sample cut in the middle of the third point.
    let coordinates = decode_polyline("_p~iF~ps|U_ulLnnqC_mqN");
    assert_eq!(coordinates.len(), 2);
    // A byte outside the alphabet stops decoding.
    let coordinates = decode_polyline("_p~iF~ps|U\u{1}\u{1}");
    assert_eq!(coordinates.len(), 1);
}

#[test]
fn decode_oversized_varints_keeps_prefix() {
    // Thirteen chunks: the longest varint accepted, worth about 2^62.
    let oversized = format!("}}{}F", "~".repeat(11));
    let point = format!("{oversized}{oversized}");
    let coordinates = decode_polyline(&format!("_p~iF~ps|U{}", point.repeat(3)));
    assert_eq!(coordinates.len(), 1);
    assert!((coordinates[0].latitude - 38.5).abs() < 1e-5);
    assert!(decode_polyline(&point.repeat(3)).is_empty());
}

#[test]
fn encode_reference_sample() {
    let coordinates = [
        Coordinate::new(-120.2, 38.5),
        Coordinate::new(-120.95, 40.7),
        Coordinate::new(-126.453, 43.252),
    ];
    assert_eq!(encode_polyline(&coordinates), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
}
