//! County boundary collection.
//!
//! Parses a GeoJSON FeatureCollection of county polygons and indexes it by
//! canonical 5-digit county code. The index is ordered, so "first county in
//! a state" is the lexicographically smallest code and does not depend on
//! the order features appear in the source file.

use crate::constants::{BOUNDARY_ID_PROPERTIES, BOUNDARY_NAME_PROPERTIES, COUNTY_ID_WIDTH};
use crate::error::{MapError, Result};
use crate::events::{DiagnosticEvent, EventSink};
use crate::models::{BoundaryFeature, CanonicalId, Geometry};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::LazyLock;
use tracing::debug;

// Census GEO_ID values look like "0500000US48113"
static GEO_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+US(\d{5})$").expect("valid GEO_ID pattern"));

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: Option<String>,
    features: Option<Vec<RawFeature>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Value>,
}

/// County polygons keyed by canonical county code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    features: BTreeMap<String, BoundaryFeature>,
}

impl BoundaryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a GeoJSON FeatureCollection.
    ///
    /// Features without a usable county code or with non-polygon geometry
    /// are skipped and reported; a document that is not a feature
    /// collection at all is an error.
    pub fn from_geojson(text: &str, sink: &dyn EventSink) -> Result<Self> {
        let raw: RawCollection = serde_json::from_str(text)
            .map_err(|e| MapError::invalid_boundaries(format!("unreadable GeoJSON: {}", e)))?;

        let features = match (raw.kind.as_deref(), raw.features) {
            (Some("FeatureCollection") | None, Some(features)) => features,
            (kind, _) => {
                return Err(MapError::invalid_boundaries(format!(
                    "expected a FeatureCollection, found {}",
                    kind.unwrap_or("a document without features")
                )));
            }
        };

        let mut collection = Self::new();
        let total = features.len();

        for (index, raw_feature) in features.into_iter().enumerate() {
            match parse_feature(raw_feature) {
                Ok(feature) => collection.insert(feature, sink),
                Err(reason) => sink.record(DiagnosticEvent::BoundarySkipped { index, reason }),
            }
        }

        debug!(
            "Loaded {} county boundaries from {} features",
            collection.len(),
            total
        );
        Ok(collection)
    }

    /// Build a collection from already parsed features
    pub fn from_features(features: impl IntoIterator<Item = BoundaryFeature>) -> Self {
        let mut collection = Self::new();
        for feature in features {
            collection
                .features
                .entry(feature.county_id.as_str().to_string())
                .or_insert(feature);
        }
        collection
    }

    fn insert(&mut self, feature: BoundaryFeature, sink: &dyn EventSink) {
        let key = feature.county_id.as_str().to_string();
        if self.features.contains_key(&key) {
            sink.record(DiagnosticEvent::DuplicateBoundary {
                county_id: feature.county_id,
            });
            return;
        }
        self.features.insert(key, feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Exact lookup by 5-digit county code
    pub fn get(&self, county_id: &str) -> Option<&BoundaryFeature> {
        self.features.get(county_id)
    }

    pub fn contains(&self, county_id: &str) -> bool {
        self.features.contains_key(county_id)
    }

    /// Counties of the given state in county-code order
    pub fn in_state<'a, 's>(
        &'a self,
        state_code: &'s str,
    ) -> impl Iterator<Item = &'a BoundaryFeature> + 's
    where
        'a: 's,
    {
        self.features
            .range::<str, _>((Bound::Included(state_code), Bound::Unbounded))
            .map(|(_, feature)| feature)
            .take_while(move |feature| feature.county_id.state_code() == state_code)
    }

    /// Lexicographically smallest county in the given state
    pub fn first_in_state(&self, state_code: &str) -> Option<&BoundaryFeature> {
        self.in_state(state_code).next()
    }

    /// Number of counties in the given state
    pub fn state_count(&self, state_code: &str) -> usize {
        self.in_state(state_code).count()
    }

    /// Features in county-code order
    pub fn iter(&self) -> impl Iterator<Item = &BoundaryFeature> {
        self.features.values()
    }
}

fn parse_feature(raw: RawFeature) -> std::result::Result<BoundaryFeature, String> {
    let county_id = county_code(&raw)?;

    let geometry_value = raw
        .geometry
        .ok_or_else(|| format!("county {} has no geometry", county_id))?;
    let geometry: Geometry = serde_json::from_value(geometry_value).map_err(|e| {
        format!(
            "county {} geometry is not a Polygon or MultiPolygon: {}",
            county_id, e
        )
    })?;

    let name = raw.properties.as_ref().and_then(|properties| {
        BOUNDARY_NAME_PROPERTIES
            .iter()
            .find_map(|key| properties.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    });

    Ok(BoundaryFeature {
        county_id,
        name,
        geometry,
    })
}

/// County code from the feature id, falling back to well-known properties
fn county_code(raw: &RawFeature) -> std::result::Result<CanonicalId, String> {
    let from_properties = || {
        raw.properties.as_ref().and_then(|properties| {
            BOUNDARY_ID_PROPERTIES
                .iter()
                .find_map(|key| properties.get(*key).filter(|value| !value.is_null()))
        })
    };

    let value = raw
        .id
        .as_ref()
        .filter(|value| !value.is_null())
        .or_else(from_properties)
        .ok_or_else(|| "feature has no identifier".to_string())?;

    let text = match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && *float >= 0.0)
                    .map(|float| float as u64)
            })
            .map(|code| code.to_string())
            .ok_or_else(|| format!("identifier {} is not a county code", number))?,
        Value::String(text) => {
            let text = text.trim();
            match GEO_ID_PATTERN.captures(text) {
                Some(captures) => captures[1].to_string(),
                None => text.to_string(),
            }
        }
        other => return Err(format!("identifier {} is not a county code", other)),
    };

    pad_county_code(&text).ok_or_else(|| format!("identifier '{}' is not a county code", text))
}

/// Zero-pad a numeric county code to 5 digits
pub fn pad_county_code(code: &str) -> Option<CanonicalId> {
    if code.is_empty()
        || code.len() > COUNTY_ID_WIDTH
        || !code.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    CanonicalId::new(format!("{:0>width$}", code, width = COUNTY_ID_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingSink, NoopSink};

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;

    fn collection_json(features: &[String]) -> String {
        format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )
    }

    fn feature_with_id(id: &str) -> String {
        format!(
            r#"{{"type":"Feature","id":{},"properties":{{"NAME":"Test"}},"geometry":{}}}"#,
            id, SQUARE
        )
    }

    #[test]
    fn test_numeric_id_is_zero_padded() {
        let text = collection_json(&[feature_with_id("8031")]);
        let collection = BoundaryCollection::from_geojson(&text, &NoopSink).unwrap();

        assert_eq!(collection.len(), 1);
        let feature = collection.get("08031").unwrap();
        assert_eq!(feature.county_id.as_str(), "08031");
        assert_eq!(feature.name.as_deref(), Some("Test"));
    }

    #[test]
    fn test_string_and_property_ids() {
        let text = collection_json(&[
            feature_with_id(r#""48113""#),
            format!(
                r#"{{"type":"Feature","properties":{{"GEO_ID":"0500000US06037"}},"geometry":{}}}"#,
                SQUARE
            ),
            format!(
                r#"{{"type":"Feature","id":null,"properties":{{"FIPS":1001}},"geometry":{}}}"#,
                SQUARE
            ),
        ]);
        let collection = BoundaryCollection::from_geojson(&text, &NoopSink).unwrap();

        assert!(collection.contains("48113"));
        assert!(collection.contains("06037"));
        assert!(collection.contains("01001"));
    }

    #[test]
    fn test_multipolygon_geometry_is_accepted() {
        let text = collection_json(&[format!(
            r#"{{"type":"Feature","id":"15001","geometry":{{"type":"MultiPolygon","coordinates":[[[[0,0],[1,0],[1,1],[0,0]]],[[[5,5],[6,5],[6,6],[5,5]]]]}}}}"#
        )]);
        let collection = BoundaryCollection::from_geojson(&text, &NoopSink).unwrap();

        let feature = collection.get("15001").unwrap();
        assert_eq!(feature.geometry.outer_rings().len(), 2);
    }

    #[test]
    fn test_positions_with_altitude_are_accepted() {
        let text = collection_json(&[
            format!(
                r#"{{"type":"Feature","id":"08031","geometry":{{"type":"Polygon","coordinates":[[[0,0,0],[1,0,0],[1,1,0],[0,0,0]]]}}}}"#
            ),
            format!(
                r#"{{"type":"Feature","id":"08001","geometry":{{"type":"MultiPolygon","coordinates":[[[[5,5,1609.3],[6,5,1609.3],[6,6],[5,5,1609.3]]]]}}}}"#
            ),
        ]);
        let sink = CollectingSink::new();
        let collection = BoundaryCollection::from_geojson(&text, &sink).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(
            collection.get("08031").unwrap().geometry,
            Geometry::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])
        );
        assert_eq!(
            collection.get("08001").unwrap().geometry.outer_rings()[0][0],
            [5.0, 5.0]
        );
        assert_eq!(
            sink.count(|e| matches!(e, DiagnosticEvent::BoundarySkipped { .. })),
            0
        );
    }

    #[test]
    fn test_short_positions_are_skipped() {
        let text = collection_json(&[format!(
            r#"{{"type":"Feature","id":"08031","geometry":{{"type":"Polygon","coordinates":[[[0],[1,0],[1,1],[0,0]]]}}}}"#
        )]);
        let sink = CollectingSink::new();
        let collection = BoundaryCollection::from_geojson(&text, &sink).unwrap();

        assert!(collection.is_empty());
        assert_eq!(
            sink.count(|e| matches!(e, DiagnosticEvent::BoundarySkipped { .. })),
            1
        );
    }

    #[test]
    fn test_unusable_features_are_skipped_and_reported() {
        let text = collection_json(&[
            feature_with_id("\"4811300\""),
            format!(r#"{{"type":"Feature","geometry":{}}}"#, SQUARE),
            r#"{"type":"Feature","id":"48001","geometry":{"type":"Point","coordinates":[0,0]}}"#
                .to_string(),
            r#"{"type":"Feature","id":"48003","geometry":null}"#.to_string(),
            feature_with_id("48005"),
        ]);
        let sink = CollectingSink::new();
        let collection = BoundaryCollection::from_geojson(&text, &sink).unwrap();

        assert_eq!(collection.len(), 1);
        assert!(collection.contains("48005"));
        assert_eq!(
            sink.count(|event| matches!(event, DiagnosticEvent::BoundarySkipped { .. })),
            4
        );
    }

    #[test]
    fn test_duplicate_county_keeps_first() {
        let text = collection_json(&[
            format!(
                r#"{{"type":"Feature","id":"48113","properties":{{"NAME":"First"}},"geometry":{}}}"#,
                SQUARE
            ),
            format!(
                r#"{{"type":"Feature","id":"48113","properties":{{"NAME":"Second"}},"geometry":{}}}"#,
                SQUARE
            ),
        ]);
        let sink = CollectingSink::new();
        let collection = BoundaryCollection::from_geojson(&text, &sink).unwrap();

        assert_eq!(collection.get("48113").unwrap().name.as_deref(), Some("First"));
        assert_eq!(
            sink.count(|event| matches!(event, DiagnosticEvent::DuplicateBoundary { .. })),
            1
        );
    }

    #[test]
    fn test_first_in_state_is_smallest_code_regardless_of_order() {
        let text = collection_json(&[
            feature_with_id("48201"),
            feature_with_id("49001"),
            feature_with_id("48113"),
            feature_with_id("47001"),
        ]);
        let collection = BoundaryCollection::from_geojson(&text, &NoopSink).unwrap();

        assert_eq!(
            collection.first_in_state("48").unwrap().county_id.as_str(),
            "48113"
        );
        assert_eq!(collection.state_count("48"), 2);
        assert!(collection.first_in_state("50").is_none());
        assert_eq!(collection.state_count("50"), 0);
    }

    #[test]
    fn test_non_collection_documents_are_rejected() {
        let err = BoundaryCollection::from_geojson(SQUARE, &NoopSink).unwrap_err();
        assert!(err.is_boundary_failure());

        let err = BoundaryCollection::from_geojson("not json", &NoopSink).unwrap_err();
        assert!(err.is_boundary_failure());
    }

    #[test]
    fn test_pad_county_code() {
        assert_eq!(pad_county_code("1").unwrap().as_str(), "00001");
        assert!(pad_county_code("").is_none());
        assert!(pad_county_code("123456").is_none());
        assert!(pad_county_code("12a").is_none());
    }
}
