//! Tests for the geographic join engine
//!
//! Fixtures build records through the real classifier and normalizer so
//! the join sees identifiers exactly as ingestion produces them.


use crate::boundary::{BoundaryCollection, pad_county_code};
use crate::classifier::classify;
use crate::models::{BoundaryFeature, GeoPoint, Geometry, JurisdictionRecord, Position};
use crate::normalizer::normalize;

/// Create a record from raw feed values
pub fn create_test_record(name: &str, raw_id: &str, types: &str, notes: &str) -> JurisdictionRecord {
    let classification = classify(types, notes);
    let identifier = normalize(raw_id, &classification.entity_kinds).unwrap();
    JurisdictionRecord {
        name: name.to_string(),
        identifier_raw: raw_id.to_string(),
        identifier,
        entity_kinds: classification.entity_kinds,
        is_unified: classification.is_unified,
        display_label: classification.display_label,
        population_bucket: "100K-500K".to_string(),
        notes: notes.to_string(),
        portal_url: format!("https://{}.example.org", name.to_lowercase().replace(' ', "")),
        location: None,
    }
}

/// Create a city record carrying coordinates
pub fn create_located_record(name: &str, raw_id: &str, lat: f64, lon: f64) -> JurisdictionRecord {
    JurisdictionRecord {
        location: GeoPoint::new(lat, lon),
        ..create_test_record(name, raw_id, "City", "")
    }
}

/// Unit-square ring with its lower-left corner at (`lon`, `lat`)
pub fn square_ring(lon: f64, lat: f64) -> Vec<Position> {
    vec![
        [lon, lat],
        [lon + 1.0, lat],
        [lon + 1.0, lat + 1.0],
        [lon, lat + 1.0],
        [lon, lat],
    ]
}

/// County polygon at the given corner
pub fn create_test_county(code: &str, lon: f64, lat: f64) -> BoundaryFeature {
    BoundaryFeature {
        county_id: pad_county_code(code).unwrap(),
        name: Some(format!("County {}", code)),
        geometry: Geometry::Polygon(vec![square_ring(lon, lat)]),
    }
}

/// Collection of Texas and Colorado counties used across the join tests
pub fn create_test_boundaries() -> BoundaryCollection {
    BoundaryCollection::from_features(vec![
        create_test_county("48201", -96.0, 29.0),
        create_test_county("48113", -97.0, 32.0),
        create_test_county("48453", -98.0, 30.0),
        create_test_county("8031", -105.0, 39.0),
        create_test_county("8001", -104.0, 39.5),
    ])
}
