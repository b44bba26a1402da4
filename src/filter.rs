//! Record filtering by entity class, population bucket and name.

use crate::models::{EntityClass, JurisdictionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active filter state
///
/// Every criterion is optional; an empty filter passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Allowed classes, empty means all
    pub classes: BTreeSet<EntityClass>,
    /// Exact population bucket, compared case-insensitively
    pub population: Option<String>,
    /// Name substring, compared case-insensitively
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(mut self, classes: impl IntoIterator<Item = EntityClass>) -> Self {
        self.classes = classes.into_iter().collect();
        self
    }

    pub fn with_population(mut self, bucket: impl Into<String>) -> Self {
        self.population = non_blank(bucket.into());
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = non_blank(text.into()).map(|text| text.to_lowercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.population.is_none() && self.search.is_none()
    }

    pub fn matches(&self, record: &JurisdictionRecord) -> bool {
        if !self.classes.is_empty() && !self.classes.contains(&record.entity_class()) {
            return false;
        }

        if let Some(bucket) = &self.population {
            if !record.population_bucket.trim().eq_ignore_ascii_case(bucket) {
                return false;
            }
        }

        match &self.search {
            Some(text) => record.name.to_lowercase().contains(text.as_str()),
            None => true,
        }
    }

    /// Records passing the filter, in input order
    pub fn apply<'a>(&self, records: &'a [JurisdictionRecord]) -> Vec<&'a JurisdictionRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
