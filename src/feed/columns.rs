//! Column mapping for the jurisdiction feed
//!
//! Feeds come from spreadsheets with loosely named headers. Each logical
//! column is located by a list of case-insensitive aliases.

use crate::constants::columns;
use crate::error::{MapError, Result};
use csv::StringRecord;

/// Header position of each logical feed column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub name: usize,
    pub identifier: usize,
    pub portal_url: usize,
    pub population: Option<usize>,
    pub government_type: Option<usize>,
    pub notes: Option<usize>,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
}

impl ColumnMapping {
    /// Resolve column positions from the header record.
    ///
    /// Name, identifier and portal URL are required; a feed without them
    /// is rejected as a whole.
    pub fn analyze(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let required = |aliases: &[&str], label: &str| {
            find_column(&normalized, aliases).ok_or_else(|| {
                MapError::invalid_feed(format!(
                    "missing {} column (looked for: {})",
                    label,
                    aliases.join(", ")
                ))
            })
        };

        Ok(ColumnMapping {
            name: required(columns::NAME, "jurisdiction name")?,
            identifier: required(columns::IDENTIFIER, "jurisdiction identifier")?,
            portal_url: required(columns::PORTAL_URL, "portal URL")?,
            population: find_column(&normalized, columns::POPULATION),
            government_type: find_column(&normalized, columns::GOVERNMENT_TYPE),
            notes: find_column(&normalized, columns::NOTES),
            latitude: find_column(&normalized, columns::LATITUDE),
            longitude: find_column(&normalized, columns::LONGITUDE),
        })
    }

    /// Whether this feed is the coordinate-aware variant
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Lowercase, strip a byte-order mark, and treat `_` as a space
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', " ")
}

/// First header matching an alias, trying aliases in priority order
fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|header| header == alias))
}
