//! Core data structures for jurisdiction records and map features.
//!
//! Defines canonical identifiers, entity kinds, jurisdiction records,
//! boundary geometry and the joined features handed to the presentation
//! layer.

use crate::constants::{COUNTY_ID_WIDTH, PLACE_ID_WIDTH, STATE_CODE_WIDTH, labels};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The two disjoint widths a canonical identifier can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IdWidth {
    /// 5 digits: state + county
    County,
    /// 7 digits: state + place
    Place,
}

impl IdWidth {
    /// Number of digits for this width
    pub fn digits(self) -> usize {
        match self {
            IdWidth::County => COUNTY_ID_WIDTH,
            IdWidth::Place => PLACE_ID_WIDTH,
        }
    }

    /// Width implied by a record's declared kinds.
    ///
    /// Only a pure county (declared kinds exactly `{County}`) uses the county
    /// width; everything else, unified governments included, is place-width.
    pub fn for_kinds(kinds: &[EntityKind]) -> Self {
        match kinds {
            [EntityKind::County] => IdWidth::County,
            _ => IdWidth::Place,
        }
    }

    fn from_len(len: usize) -> Option<Self> {
        match len {
            COUNTY_ID_WIDTH => Some(IdWidth::County),
            PLACE_ID_WIDTH => Some(IdWidth::Place),
            _ => None,
        }
    }
}

impl fmt::Display for IdWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-digit", self.digits())
    }
}

/// Fixed-width, zero-padded jurisdiction code.
///
/// Always exactly 5 or 7 characters long. Built by the normalizer and by
/// boundary parsing; there is no public constructor that skips the width
/// check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Wrap an already padded code, rejecting any width other than 5 or 7
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        IdWidth::from_len(code.chars().count())?;
        Some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> IdWidth {
        if self.0.chars().count() == COUNTY_ID_WIDTH {
            IdWidth::County
        } else {
            IdWidth::Place
        }
    }

    /// Leading two-digit state code, the only part shared by both formats
    pub fn state_code(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(STATE_CODE_WIDTH)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared government-type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    City,
    County,
    Other(String),
}

impl EntityKind {
    /// Interpret a trimmed, non-empty tag
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("city") {
            EntityKind::City
        } else if tag.eq_ignore_ascii_case("county") {
            EntityKind::County
        } else {
            EntityKind::Other(tag.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EntityKind::City => labels::CITY,
            EntityKind::County => labels::COUNTY,
            EntityKind::Other(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EntityKind::Other(_))
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Coarse classification of a record used for filtering and counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Unified,
    City,
    County,
    Other,
}

impl EntityClass {
    pub const ALL: [EntityClass; 4] = [
        EntityClass::Unified,
        EntityClass::City,
        EntityClass::County,
        EntityClass::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityClass::Unified => "unified",
            EntityClass::City => "city",
            EntityClass::County => "county",
            EntityClass::Other => "other",
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityClass {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unified" => Ok(EntityClass::Unified),
            "city" => Ok(EntityClass::City),
            "county" => Ok(EntityClass::County),
            "other" => Ok(EntityClass::Other),
            other => Err(format!(
                "unknown entity class '{}' (expected unified, city, county or other)",
                other
            )),
        }
    }
}

/// A longitude/latitude pair in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point when both values are finite and within range
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            longitude,
            latitude,
        })
    }

    /// GeoJSON position order
    pub fn position(&self) -> Position {
        [self.longitude, self.latitude]
    }
}

/// One row of the source feed after normalization and classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JurisdictionRecord {
    pub name: String,
    pub identifier_raw: String,
    pub identifier: CanonicalId,
    pub entity_kinds: Vec<EntityKind>,
    pub is_unified: bool,
    pub display_label: String,
    pub population_bucket: String,
    pub notes: String,
    pub portal_url: String,
    pub location: Option<GeoPoint>,
}

impl JurisdictionRecord {
    pub fn entity_class(&self) -> EntityClass {
        if self.is_unified {
            EntityClass::Unified
        } else if self.entity_kinds.contains(&EntityKind::City) {
            EntityClass::City
        } else if self.entity_kinds.contains(&EntityKind::County) {
            EntityClass::County
        } else {
            EntityClass::Other
        }
    }

    /// Key used for duplicate-name detection
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// GeoJSON position: `[longitude, latitude]`
pub type Position = [f64; 2];

/// A closed linear ring
pub type Ring = Vec<Position>;

/// Polygon geometry as carried by the boundary collection.
///
/// Serializes to the GeoJSON `{"type": ..., "coordinates": ...}` shape.
/// Positions with an altitude or other extra elements are accepted and
/// reduced to longitude and latitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    #[serde(deserialize_with = "deserialize_polygon")]
    Polygon(Vec<Ring>),
    #[serde(deserialize_with = "deserialize_multipolygon")]
    MultiPolygon(Vec<Vec<Ring>>),
}

type RawRing = Vec<Vec<f64>>;

fn to_position(values: Vec<f64>) -> Result<Position, String> {
    match values[..] {
        [longitude, latitude, ..] => Ok([longitude, latitude]),
        _ => Err(format!(
            "position has {} elements, expected at least 2",
            values.len()
        )),
    }
}

fn to_rings(raw: Vec<RawRing>) -> Result<Vec<Ring>, String> {
    raw.into_iter()
        .map(|ring| ring.into_iter().map(to_position).collect())
        .collect()
}

fn deserialize_polygon<'de, D>(deserializer: D) -> Result<Vec<Ring>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawRing>::deserialize(deserializer)?;
    to_rings(raw).map_err(serde::de::Error::custom)
}

fn deserialize_multipolygon<'de, D>(deserializer: D) -> Result<Vec<Vec<Ring>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Vec<RawRing>>::deserialize(deserializer)?;
    raw.into_iter()
        .map(to_rings)
        .collect::<Result<_, _>>()
        .map_err(serde::de::Error::custom)
}

impl Geometry {
    /// Outer ring of every member polygon
    pub fn outer_rings(&self) -> Vec<&Ring> {
        match self {
            Geometry::Polygon(rings) => rings.first().into_iter().collect(),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().filter_map(|rings| rings.first()).collect()
            }
        }
    }
}

/// One county polygon from the boundary collection
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub county_id: CanonicalId,
    pub name: Option<String>,
    pub geometry: Geometry,
}

/// How a joined feature was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMethod {
    /// Exact county polygon match
    Boundary,
    /// Place-style identifier equal to a county code plus "00"
    UnifiedBoundary,
    /// Supplied latitude/longitude
    Coordinates,
    /// Arbitrary polygon from the same state
    Degraded,
}

impl PlacementMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PlacementMethod::Boundary => "boundary",
            PlacementMethod::UnifiedBoundary => "unified_boundary",
            PlacementMethod::Coordinates => "coordinates",
            PlacementMethod::Degraded => "degraded",
        }
    }
}

impl fmt::Display for PlacementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a joined feature is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Boundary {
        county_id: CanonicalId,
        geometry: Geometry,
    },
    UnifiedBoundary {
        county_id: CanonicalId,
        geometry: Geometry,
    },
    Coordinates {
        point: GeoPoint,
    },
    DegradedCentroid {
        county_id: CanonicalId,
        point: GeoPoint,
    },
    DegradedPolygon {
        county_id: CanonicalId,
        geometry: Geometry,
    },
}

impl Placement {
    pub fn method(&self) -> PlacementMethod {
        match self {
            Placement::Boundary { .. } => PlacementMethod::Boundary,
            Placement::UnifiedBoundary { .. } => PlacementMethod::UnifiedBoundary,
            Placement::Coordinates { .. } => PlacementMethod::Coordinates,
            Placement::DegradedCentroid { .. } | Placement::DegradedPolygon { .. } => {
                PlacementMethod::Degraded
            }
        }
    }

    /// Degraded placements are approximations and must be presented as such
    pub fn is_approximate(&self) -> bool {
        self.method() == PlacementMethod::Degraded
    }

    /// County polygon the placement was derived from, if any
    pub fn county_id(&self) -> Option<&CanonicalId> {
        match self {
            Placement::Boundary { county_id, .. }
            | Placement::UnifiedBoundary { county_id, .. }
            | Placement::DegradedCentroid { county_id, .. }
            | Placement::DegradedPolygon { county_id, .. } => Some(county_id),
            Placement::Coordinates { .. } => None,
        }
    }
}

/// Output unit consumed by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    pub identifier: CanonicalId,
    pub display_name: String,
    pub placement: Placement,
    pub source_records: Vec<JurisdictionRecord>,
}
