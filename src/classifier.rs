//! Record classification from declared government types and notes.

use crate::constants::{DEFAULT_UNIFICATION_MARKER, labels};
use crate::models::EntityKind;
use serde::Serialize;

/// What made a record unified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnifiedBy {
    Notes,
    DeclaredTypes,
}

/// Derived classification of one feed row
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub entity_kinds: Vec<EntityKind>,
    pub is_unified: bool,
    pub unified_by: Option<UnifiedBy>,
    pub display_label: String,
}

/// Classifier with a configurable unification marker
#[derive(Debug, Clone)]
pub struct Classifier {
    marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_UNIFICATION_MARKER)
    }
}

impl Classifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into().to_lowercase(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Classify a row from its raw government-type cell and notes
    pub fn classify(&self, types_raw: &str, notes: &str) -> Classification {
        let entity_kinds = parse_entity_kinds(types_raw);

        let by_notes = !self.marker.is_empty() && notes.to_lowercase().contains(&self.marker);
        let by_types = entity_kinds.contains(&EntityKind::City)
            && entity_kinds.contains(&EntityKind::County);

        let unified_by = if by_notes {
            Some(UnifiedBy::Notes)
        } else if by_types {
            Some(UnifiedBy::DeclaredTypes)
        } else {
            None
        };

        let display_label = match unified_by {
            Some(UnifiedBy::Notes) => labels::UNIFIED.to_string(),
            Some(UnifiedBy::DeclaredTypes) => labels::CITY_AND_COUNTY.to_string(),
            None => entity_kinds
                .iter()
                .find(|kind| kind.is_recognized())
                .map(|kind| kind.label().to_string())
                .unwrap_or_else(|| labels::OTHER.to_string()),
        };

        Classification {
            entity_kinds,
            is_unified: unified_by.is_some(),
            unified_by,
            display_label,
        }
    }
}

/// Classify with the default unification marker
pub fn classify(types_raw: &str, notes: &str) -> Classification {
    Classifier::default().classify(types_raw, notes)
}

/// Split a comma-separated type cell into distinct kinds, keeping order
pub fn parse_entity_kinds(types_raw: &str) -> Vec<EntityKind> {
    let mut kinds: Vec<EntityKind> = Vec::new();
    for tag in types_raw.split(',').map(str::trim).filter(|tag| !tag.is_empty()) {
        let kind = EntityKind::from_tag(tag);
        let seen = kinds.iter().any(|existing| match (existing, &kind) {
            (EntityKind::Other(a), EntityKind::Other(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        });
        if !seen {
            kinds.push(kind);
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_kinds_trims_and_drops_empties() {
        assert_eq!(
            parse_entity_kinds(" City , ,County,"),
            vec![EntityKind::City, EntityKind::County]
        );
        assert!(parse_entity_kinds(" , ").is_empty());
    }

    #[test]
    fn test_parse_entity_kinds_collapses_duplicates_in_order() {
        assert_eq!(
            parse_entity_kinds("County, city, COUNTY, Transit, transit"),
            vec![
                EntityKind::County,
                EntityKind::City,
                EntityKind::Other("Transit".to_string())
            ]
        );
    }

    #[test]
    fn test_denver_is_unified_by_notes() {
        let result = classify("City, County", "Unified City-County Government");
        assert!(result.is_unified);
        assert_eq!(result.unified_by, Some(UnifiedBy::Notes));
        assert_eq!(result.display_label, "Unified City\u{2013}County");
    }

    #[test]
    fn test_combined_types_are_unified() {
        let result = classify("City, County", "");
        assert!(result.is_unified);
        assert_eq!(result.unified_by, Some(UnifiedBy::DeclaredTypes));
        assert_eq!(result.display_label, "City + County");
    }

    #[test]
    fn test_city_only_is_not_unified() {
        let result = classify("City", "Open data portal since 2014");
        assert!(!result.is_unified);
        assert_eq!(result.display_label, "City");
    }

    #[test]
    fn test_marker_in_notes_is_case_insensitive() {
        let result = classify("County", "UNIFIED government");
        assert!(result.is_unified);
        assert_eq!(result.entity_kinds, vec![EntityKind::County]);
    }

    #[test]
    fn test_first_recognized_type_wins() {
        assert_eq!(classify("County", "").display_label, "County");
        assert_eq!(classify("School District, City", "").display_label, "City");
    }

    #[test]
    fn test_fallback_label_when_nothing_recognized() {
        assert_eq!(classify("", "").display_label, "Other Public Agency");
        assert_eq!(classify("Transit Authority", "").display_label, "Other Public Agency");
    }

    #[test]
    fn test_custom_marker() {
        let classifier = Classifier::new("Consolidated");
        assert!(classifier.classify("City", "consolidated government").is_unified);
        assert!(!classifier.classify("City", "unified").is_unified);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first = classify("City, County", "notes");
        let second = classify("City, County", "notes");
        assert_eq!(first, second);
    }
}
