use regex::Regex;
use std::sync::OnceLock;

/// A position as `[longitude, latitude]` (GeoJSON axis order).
pub type Coord = [f64; 2];

/// A closed polygon boundary: ordered positions with first == last.
pub type Ring = Vec<Coord>;

fn coord_pair_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s*(-?[\d.]+)\s*,\s*(-?[\d.]+)\s*\)").expect("valid regex"))
}

/// Extracts an ordered, closed ring from the registry's native polygon text.
///
/// The upstream format is a run of parenthesized `(lat,lon)` pairs with no
/// separator between pairs. The format is not contractual: a pair whose
/// components do not both parse as finite decimals is dropped (remaining
/// pairs keep their order), and anything that leaves fewer than 3 distinct
/// positions yields `None`. Absence of a polygon is a normal state, not an
/// error.
pub fn parse_polygon_text(text: Option<&str>) -> Option<Ring> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    let mut ring: Ring = Vec::new();
    for caps in coord_pair_regex().captures_iter(text) {
        let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            continue;
        };
        // Upstream encodes (lat,lon); GeoJSON axis order is [lon, lat].
        ring.push([lon, lat]);
    }

    if ring.len() < 3 {
        return None;
    }
    if ring.first() != ring.last() {
        let first = ring[0];
        ring.push(first);
    }
    if distinct_positions(&ring[..ring.len() - 1]) < 3 {
        return None;
    }
    Some(ring)
}

fn distinct_positions(coords: &[Coord]) -> usize {
    let mut distinct: Vec<Coord> = Vec::with_capacity(coords.len());
    for c in coords {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
    }
    distinct.len()
}
