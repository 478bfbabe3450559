pub const ROUTE_PALETTE: [&str; 12] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
    "#bcbd22", "#003da5", "#da291c", "#00843d",
];

pub const NEUTRAL_COLOR: &str = "#6b7280";

/// Classic 32-bit string hash (`h = c + (h << 5) - h`) over UTF-16 code units.
pub fn string_hash(value: &str) -> i32 {
    value.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Deterministic display color for a route id.
pub fn route_color(route_id: &str) -> &'static str {
    let route_id = route_id.trim();
    if route_id.is_empty() {
        return NEUTRAL_COLOR;
    }
    let hash = (string_hash(route_id) as i64).unsigned_abs() as usize;
    ROUTE_PALETTE[hash % ROUTE_PALETTE.len()]
}

#[test]
fn hash_matches_reference_values() {
    assert_eq!(string_hash(""), 0);
    assert_eq!(string_hash("a"), 97);
    // 'a' * 31 + 'b'
    assert_eq!(string_hash("ab"), 3105);
}

#[test]
fn empty_route_is_neutral() {
    assert_eq!(route_color(""), NEUTRAL_COLOR);
    assert_eq!(route_color("   "), NEUTRAL_COLOR);
}

#[test]
fn color_is_stable() {
    assert_eq!(route_color("39"), route_color("39"));
    assert!(ROUTE_PALETTE.contains(&route_color("Red")));
}
