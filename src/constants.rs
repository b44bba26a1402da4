//! Application constants for the jurisdiction map
//!
//! Identifier widths, classifier labels, feed column aliases and refresh
//! defaults used throughout the crate.

// =============================================================================
// Identifier Widths
// =============================================================================

/// Width of a canonical county identifier (2-digit state + 3-digit county)
pub const COUNTY_ID_WIDTH: usize = 5;

/// Width of a canonical place identifier (2-digit state + 5-digit place)
pub const PLACE_ID_WIDTH: usize = 7;

/// Width of the state prefix shared by both identifier formats
pub const STATE_CODE_WIDTH: usize = 2;

/// Suffix appended to a county code to form the place-style identifier of a
/// unified government recorded under that county
pub const UNIFIED_PLACE_SUFFIX: &str = "00";

/// Leading/trailing characters spreadsheet exports use to force text cells
pub const QUOTE_ARTIFACTS: &[char] = &['\'', '"', '`', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

// =============================================================================
// Classifier Labels
// =============================================================================

pub mod labels {
    /// Label for governments flagged unified in their notes
    pub const UNIFIED: &str = "Unified City\u{2013}County";

    /// Label for governments declared as both City and County
    pub const CITY_AND_COUNTY: &str = "City + County";

    pub const CITY: &str = "City";
    pub const COUNTY: &str = "County";

    /// Fallback when no recognized government type is declared
    pub const OTHER: &str = "Other Public Agency";
}

/// Default substring marking a unified government in free-text notes
pub const DEFAULT_UNIFICATION_MARKER: &str = "unified";

// =============================================================================
// Feed Columns
// =============================================================================

/// Header aliases for each feed column, matched case-insensitively
pub mod columns {
    pub const NAME: &[&str] = &["jurisdiction", "jurisdiction name", "name"];
    pub const IDENTIFIER: &[&str] = &[
        "jurisdiction id",
        "jurisdiction fips",
        "fips",
        "geoid",
        "identifier",
        "id",
    ];
    pub const PORTAL_URL: &[&str] = &["portal url", "portal", "url", "website"];
    pub const POPULATION: &[&str] = &["population", "population size", "population bucket"];
    pub const GOVERNMENT_TYPE: &[&str] = &["government type", "type", "entity type"];
    pub const NOTES: &[&str] = &["notes", "note", "comments"];
    pub const LATITUDE: &[&str] = &["latitude", "lat"];
    pub const LONGITUDE: &[&str] = &["longitude", "lon", "lng", "long"];
}

/// Boundary feature property keys that may carry the county code
pub const BOUNDARY_ID_PROPERTIES: &[&str] = &["GEOID", "GEO_ID", "FIPS", "fips"];

/// Boundary feature property keys that may carry the county name
pub const BOUNDARY_NAME_PROPERTIES: &[&str] = &["NAME", "name", "NAMELSAD"];

// =============================================================================
// Refresh
// =============================================================================

/// Default interval between background refreshes
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

/// Shortest refresh interval accepted from configuration
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;

/// Default output file for rendered features
pub const DEFAULT_OUTPUT_FILE: &str = "jurisdictions.geojson";
