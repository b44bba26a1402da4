//! Strict parsed-row type for feed records

use super::columns::ColumnMapping;
use crate::events::RowDropReason;
use crate::models::GeoPoint;
use csv::StringRecord;

/// One feed row with every cell trimmed and optional cells resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRow {
    /// 1-based line in the source file
    pub line: u64,
    pub name: String,
    pub identifier: String,
    pub portal_url: String,
    pub population_bucket: String,
    pub government_type: String,
    pub notes: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Outcome of reading the coordinate cells of a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowCoordinates {
    Absent,
    Valid(GeoPoint),
    Rejected,
}

impl FeedRow {
    pub fn from_record(record: &StringRecord, mapping: &ColumnMapping, line: u64) -> Self {
        let cell = |index: usize| record.get(index).unwrap_or("").trim().to_string();
        let optional = |index: Option<usize>| index.map(cell).unwrap_or_default();
        let non_empty = |index: Option<usize>| {
            index
                .map(cell)
                .filter(|value| !value.is_empty())
        };

        FeedRow {
            line,
            name: cell(mapping.name),
            identifier: cell(mapping.identifier),
            portal_url: cell(mapping.portal_url),
            population_bucket: optional(mapping.population),
            government_type: optional(mapping.government_type),
            notes: optional(mapping.notes),
            latitude: non_empty(mapping.latitude),
            longitude: non_empty(mapping.longitude),
        }
    }

    /// Shape check: identifier and portal URL must be present
    pub fn validate(&self) -> Result<(), RowDropReason> {
        if self.identifier.is_empty() {
            return Err(RowDropReason::MissingIdentifier);
        }
        if self.portal_url.is_empty() {
            return Err(RowDropReason::MissingPortalUrl);
        }
        Ok(())
    }

    pub fn coordinates(&self) -> RowCoordinates {
        match (&self.latitude, &self.longitude) {
            (None, None) => RowCoordinates::Absent,
            (Some(lat), Some(lon)) => {
                let parsed = lat
                    .parse::<f64>()
                    .ok()
                    .zip(lon.parse::<f64>().ok())
                    .and_then(|(lat, lon)| GeoPoint::new(lat, lon));
                match parsed {
                    Some(point) => RowCoordinates::Valid(point),
                    None => RowCoordinates::Rejected,
                }
            }
            _ => RowCoordinates::Rejected,
        }
    }
}
