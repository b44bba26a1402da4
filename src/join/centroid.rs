//! Vertex-mean centroids for degraded placement
//!
//! The centroid is the arithmetic mean of the outer ring's vertices, not
//! the area-weighted centroid. For multi-polygons the outer ring of the
//! member with the largest area is used, so islands and exclaves do not
//! drag the marker offshore.

use crate::models::{GeoPoint, Geometry, Position};

/// Mean of a ring's vertices, ignoring the closing vertex
pub fn ring_centroid(ring: &[Position]) -> Option<GeoPoint> {
    let vertices = open_ring(ring);
    if vertices.is_empty() {
        return None;
    }

    let count = vertices.len() as f64;
    let (lon_sum, lat_sum) = vertices
        .iter()
        .fold((0.0, 0.0), |(lon, lat), [x, y]| (lon + x, lat + y));

    GeoPoint::new(lat_sum / count, lon_sum / count)
}

/// Absolute planar area of a ring (shoelace formula, square degrees)
pub fn ring_area(ring: &[Position]) -> f64 {
    let vertices = open_ring(ring);
    if vertices.len() < 3 {
        return 0.0;
    }

    let twice_area: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|([x1, y1], [x2, y2])| x1 * y2 - x2 * y1)
        .sum();
    (twice_area / 2.0).abs()
}

/// Centroid of a polygon or multi-polygon
pub fn geometry_centroid(geometry: &Geometry) -> Option<GeoPoint> {
    let mut largest: Option<(&[Position], f64)> = None;
    for ring in geometry.outer_rings() {
        let area = ring_area(ring);
        // First ring wins ties so degenerate input stays deterministic
        if largest.is_none_or(|(_, best)| area > best) {
            largest = Some((ring.as_slice(), area));
        }
    }
    largest.and_then(|(ring, _)| ring_centroid(ring))
}

fn open_ring(ring: &[Position]) -> &[Position] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
