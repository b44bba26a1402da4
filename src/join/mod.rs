//! Geographic join engine.
//!
//! Places every canonical identifier of the filtered record set on the map,
//! or reports it as dropped. The boundary collection only contains county
//! polygons, so the rules differ by identifier width:
//!
//! - **County (5 digits)**: exact lookup by county code.
//! - **Unified (7 digits, secondary path)**: a place identifier equal to a
//!   county code followed by `"00"` is drawn with that county's polygon.
//! - **Place with coordinates**: a point at the supplied latitude/longitude.
//!   This is the only accurate placement for places and always wins.
//! - **Place without coordinates**: the place code is not a county code, so
//!   only the state prefix is usable. The smallest county code in the state
//!   with a usable outer ring stands in for the place (as a centroid or as
//!   the polygon). Several
//!   places in one state land on the same spot; this is reported.
//! - **Anything else** is dropped and reported individually.
//!
//! A 7-digit identifier is never truncated to 5 digits and looked up as a
//! county.

pub mod centroid;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use centroid::geometry_centroid;
pub use stats::JoinStats;

use crate::boundary::BoundaryCollection;
use crate::constants::UNIFIED_PLACE_SUFFIX;
use crate::events::{DiagnosticEvent, EventSink};
use crate::models::{
    CanonicalId, GeoPoint, IdWidth, JoinedFeature, JurisdictionRecord, Placement,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// How a degraded placement is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegradedShape {
    /// Point at the stand-in county's centroid
    #[default]
    Centroid,
    /// The stand-in county's polygon
    Polygon,
}

impl std::str::FromStr for DegradedShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "centroid" | "point" => Ok(DegradedShape::Centroid),
            "polygon" => Ok(DegradedShape::Polygon),
            other => Err(format!(
                "unknown degraded shape '{}' (expected centroid or polygon)",
                other
            )),
        }
    }
}

/// Join behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    /// Place records at their own latitude/longitude when available
    pub use_coordinates: bool,
    pub degraded_shape: DegradedShape,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            use_coordinates: true,
            degraded_shape: DegradedShape::Centroid,
        }
    }
}

/// An identifier that could not be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedFeature {
    pub identifier: CanonicalId,
    pub name: String,
    pub state_code: String,
}

/// Everything the presentation layer needs for one filter state
#[derive(Debug, Clone, Default)]
pub struct MapView {
    pub features: Vec<JoinedFeature>,
    /// Identifiers that were placed, for highlighting
    pub has_data: BTreeSet<CanonicalId>,
    /// Every input identifier and the records sharing it
    pub lookup: BTreeMap<CanonicalId, Vec<JurisdictionRecord>>,
    pub dropped: Vec<DroppedFeature>,
    pub stats: JoinStats,
}

impl MapView {
    /// Records behind an identifier, for detail display
    pub fn records_for(&self, identifier: &str) -> &[JurisdictionRecord] {
        CanonicalId::new(identifier)
            .and_then(|id| self.lookup.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn feature(&self, identifier: &str) -> Option<&JoinedFeature> {
        self.features
            .iter()
            .find(|feature| feature.identifier.as_str() == identifier)
    }
}

/// Joins records to county boundaries and points
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinEngine {
    options: JoinOptions,
}

impl JoinEngine {
    pub fn new(options: JoinOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> JoinOptions {
        self.options
    }

    /// Place every identifier in `records`.
    ///
    /// Safe to call repeatedly with the same or a new boundary collection;
    /// nothing is cached between calls.
    pub fn join<'a>(
        &self,
        records: impl IntoIterator<Item = &'a JurisdictionRecord>,
        boundaries: &BoundaryCollection,
        sink: &dyn EventSink,
    ) -> MapView {
        let mut lookup: BTreeMap<CanonicalId, Vec<JurisdictionRecord>> = BTreeMap::new();
        for record in records {
            lookup
                .entry(record.identifier.clone())
                .or_default()
                .push(record.clone());
        }

        let unified = unified_matches(&lookup, boundaries);

        let mut view = MapView {
            stats: JoinStats {
                identifiers: lookup.len(),
                ..JoinStats::new()
            },
            ..MapView::default()
        };
        let mut degraded_by_county: BTreeMap<CanonicalId, Vec<CanonicalId>> = BTreeMap::new();

        for (identifier, group) in &lookup {
            let display_name = group
                .first()
                .map(|record| record.name.clone())
                .unwrap_or_default();

            let placement = match identifier.width() {
                IdWidth::County => self.place_county(identifier, group, boundaries),
                IdWidth::Place => self.place_city(identifier, group, boundaries, &unified),
            };

            match placement {
                Some(placement) => {
                    if let Placement::DegradedCentroid { county_id, .. }
                    | Placement::DegradedPolygon { county_id, .. } = &placement
                    {
                        sink.record(DiagnosticEvent::DegradedPlacement {
                            identifier: identifier.clone(),
                            state_code: identifier.state_code().to_string(),
                            county_id: county_id.clone(),
                        });
                        degraded_by_county
                            .entry(county_id.clone())
                            .or_default()
                            .push(identifier.clone());
                    }

                    view.stats.record_placement(placement.method());
                    view.has_data.insert(identifier.clone());
                    view.features.push(JoinedFeature {
                        identifier: identifier.clone(),
                        display_name,
                        placement,
                        source_records: group.clone(),
                    });
                }
                None => {
                    let dropped = DroppedFeature {
                        identifier: identifier.clone(),
                        name: display_name,
                        state_code: identifier.state_code().to_string(),
                    };
                    sink.record(DiagnosticEvent::FeatureDropped {
                        identifier: dropped.identifier.clone(),
                        name: dropped.name.clone(),
                        state_code: dropped.state_code.clone(),
                    });
                    view.stats.dropped += 1;
                    view.dropped.push(dropped);
                }
            }
        }

        for (county_id, identifiers) in degraded_by_county {
            if identifiers.len() > 1 {
                view.stats.degraded_collisions += 1;
                sink.record(DiagnosticEvent::DegradedCollision {
                    county_id,
                    identifiers,
                });
            }
        }

        view.lookup = lookup;
        debug!("{}", view.stats.summary());
        view
    }

    fn place_county(
        &self,
        identifier: &CanonicalId,
        group: &[JurisdictionRecord],
        boundaries: &BoundaryCollection,
    ) -> Option<Placement> {
        if let Some(feature) = boundaries.get(identifier.as_str()) {
            return Some(Placement::Boundary {
                county_id: feature.county_id.clone(),
                geometry: feature.geometry.clone(),
            });
        }
        self.coordinates(group)
            .map(|point| Placement::Coordinates { point })
    }

    fn place_city(
        &self,
        identifier: &CanonicalId,
        group: &[JurisdictionRecord],
        boundaries: &BoundaryCollection,
        unified: &HashMap<CanonicalId, CanonicalId>,
    ) -> Option<Placement> {
        if let Some(point) = self.coordinates(group) {
            return Some(Placement::Coordinates { point });
        }

        if let Some(feature) = unified
            .get(identifier)
            .and_then(|county_id| boundaries.get(county_id.as_str()))
        {
            return Some(Placement::UnifiedBoundary {
                county_id: feature.county_id.clone(),
                geometry: feature.geometry.clone(),
            });
        }

        // Counties without a usable outer ring cannot stand in
        let (stand_in, point) = boundaries
            .in_state(identifier.state_code())
            .find_map(|feature| {
                geometry_centroid(&feature.geometry).map(|point| (feature, point))
            })?;
        match self.options.degraded_shape {
            DegradedShape::Centroid => Some(Placement::DegradedCentroid {
                county_id: stand_in.county_id.clone(),
                point,
            }),
            DegradedShape::Polygon => Some(Placement::DegradedPolygon {
                county_id: stand_in.county_id.clone(),
                geometry: stand_in.geometry.clone(),
            }),
        }
    }

    /// First usable coordinate among the records sharing an identifier
    fn coordinates(&self, group: &[JurisdictionRecord]) -> Option<GeoPoint> {
        if !self.options.use_coordinates {
            return None;
        }
        group.iter().find_map(|record| record.location)
    }
}

/// Place identifiers satisfied by a county polygon through the `"00"` suffix
fn unified_matches(
    lookup: &BTreeMap<CanonicalId, Vec<JurisdictionRecord>>,
    boundaries: &BoundaryCollection,
) -> HashMap<CanonicalId, CanonicalId> {
    boundaries
        .iter()
        .filter_map(|feature| {
            let candidate =
                CanonicalId::new(format!("{}{}", feature.county_id, UNIFIED_PLACE_SUFFIX))?;
            lookup
                .contains_key(&candidate)
                .then(|| (candidate, feature.county_id.clone()))
        })
        .collect()
}
