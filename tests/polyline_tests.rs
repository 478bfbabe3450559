use headway::shared::Coordinate;
use headway::source::{decode_polyline, encode_polyline};

#[test]
fn decode_documented_sample() {
    let coordinates = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    let expected = [[-120.2, 38.5], [-120.95, 40.7], [-126.453, 43.252]];
    assert_eq!(coordinates.len(), 3);
    for (coordinate, [lng, lat]) in coordinates.iter().zip(expected) {
        assert!((coordinate.longitude - lng).abs() < 1e-5);
        assert!((coordinate.latitude - lat).abs() < 1e-5);
    }
}

#[test]
fn decode_empty_input() {
    assert!(decode_polyline("").is_empty());
}

#[test]
fn decode_garbage_does_not_panic() {
    assert!(decode_polyline("~~~~~").is_empty());
    assert!(decode_polyline("\u{0}\u{0}").is_empty());
}

#[test]
fn decode_never_overflows_on_long_varints() {
    let longest = format!("}}{}F", "~".repeat(11));
    let encoded = longest.repeat(8);
    let decoded = std::panic::catch_unwind(|| decode_polyline(&encoded));
    assert!(decoded.is_ok_and(|coordinates| coordinates.is_empty()));

    let valid = encode_polyline(&[Coordinate::new(-71.05977, 42.35561)]);
    let coordinates = decode_polyline(&format!("{valid}{}", longest.repeat(8)));
    assert_eq!(coordinates.len(), 1);
    assert!((coordinates[0].longitude + 71.05977).abs() < 1e-5);
}

#[test]
fn encoded_shape_survives_decode() {
    let shape = vec![
        Coordinate::new(-71.05977, 42.35561),
        Coordinate::new(-71.06161, 42.35222),
        Coordinate::new(-71.06433, 42.34923),
    ];
    let decoded = decode_polyline(&encode_polyline(&shape));
    assert_eq!(decoded.len(), shape.len());
    for (a, b) in decoded.iter().zip(shape.iter()) {
        assert!((a.longitude - b.longitude).abs() < 1e-5);
        assert!((a.latitude - b.latitude).abs() < 1e-5);
    }
}
