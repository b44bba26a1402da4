//! Dataset diagnostics: counts and duplicate-name detection.
//!
//! Purely informational. Nothing here is read by the filter or the join;
//! a dataset with zero name collisions can still join incorrectly and a
//! dataset with many can join perfectly.

use crate::models::{EntityClass, IdWidth, JurisdictionRecord};
use colored::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Records sharing one lowercase name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCollision {
    pub name: String,
    pub records: Vec<JurisdictionRecord>,
}

/// Counts by kind and identifier width, plus name collisions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    pub total: usize,
    pub by_class: BTreeMap<EntityClass, usize>,
    pub by_width: BTreeMap<IdWidth, usize>,
    /// Largest group first
    pub name_collisions: Vec<NameCollision>,
}

impl DiagnosticsReport {
    pub fn build(records: &[JurisdictionRecord]) -> Self {
        let mut by_class = BTreeMap::new();
        let mut by_width = BTreeMap::new();
        let mut by_name: HashMap<String, Vec<JurisdictionRecord>> = HashMap::new();

        for record in records {
            *by_class.entry(record.entity_class()).or_insert(0) += 1;
            *by_width.entry(record.identifier.width()).or_insert(0) += 1;
            by_name
                .entry(record.name_key())
                .or_default()
                .push(record.clone());
        }

        let mut name_collisions: Vec<NameCollision> = by_name
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(name, records)| NameCollision { name, records })
            .collect();
        name_collisions.sort_by(|a, b| {
            b.records
                .len()
                .cmp(&a.records.len())
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            total: records.len(),
            by_class,
            by_width,
            name_collisions,
        }
    }

    pub fn class_count(&self, class: EntityClass) -> usize {
        self.by_class.get(&class).copied().unwrap_or(0)
    }

    pub fn width_count(&self, width: IdWidth) -> usize {
        self.by_width.get(&width).copied().unwrap_or(0)
    }

    /// Records involved in any name collision
    pub fn colliding_records(&self) -> usize {
        self.name_collisions
            .iter()
            .map(|collision| collision.records.len())
            .sum()
    }

    /// Coloured terminal report, listing at most `top` collisions
    pub fn render(&self, top: usize) -> String {
        let mut lines = Vec::new();
        lines.push(format!("{}", "Dataset Diagnostics".bright_green().bold()));
        lines.push(format!(
            "  {} {}",
            "Records:".bright_cyan(),
            self.total.to_string().bright_white().bold()
        ));
        for class in EntityClass::ALL {
            lines.push(format!(
                "  {:<12} {}",
                format!("{}:", class).bright_cyan(),
                self.class_count(class)
            ));
        }
        lines.push(format!(
            "  {} {}  {} {}",
            "5-digit ids:".bright_cyan(),
            self.width_count(IdWidth::County),
            "7-digit ids:".bright_cyan(),
            self.width_count(IdWidth::Place)
        ));

        if self.name_collisions.is_empty() {
            lines.push(format!("  {}", "No duplicate names".bright_green()));
        } else {
            lines.push(format!(
                "  {} {} names shared by {} records",
                "Duplicate names:".bright_yellow(),
                self.name_collisions.len(),
                self.colliding_records()
            ));
            for collision in self.name_collisions.iter().take(top) {
                let ids: Vec<&str> = collision
                    .records
                    .iter()
                    .map(|record| record.identifier.as_str())
                    .collect();
                lines.push(format!(
                    "    {} x{} [{}]",
                    collision.name.bright_white(),
                    collision.records.len(),
                    ids.join(", ")
                ));
            }
        }
        lines.join("\n")
    }
}
