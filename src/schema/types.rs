//! Entity schema definitions
//!
//! An entity schema names the fields a row must carry to belong to the entity
//! (required) and the further fields kept when present (optional). The union
//! is the widest column set ever kept for the entity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::identifier::is_valid_identifier;

/// Schema of one logical entity (one destination table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Unique entity name, also the destination table name
    pub entity_name: String,
    /// Fields that must be non-null for a row to qualify
    pub required_fields: BTreeSet<String>,
    /// Fields kept when present, never used to disqualify a row
    #[serde(default)]
    pub optional_fields: BTreeSet<String>,
    /// Natural key of the destination table, when the entity has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_field: Option<String>,
}

impl EntitySchema {
    /// Create a new entity schema
    pub fn new(entity_name: impl Into<String>, required: &[&str], optional: &[&str]) -> Self {
        Self {
            entity_name: entity_name.into(),
            required_fields: required.iter().map(|f| f.to_string()).collect(),
            optional_fields: optional.iter().map(|f| f.to_string()).collect(),
            key_field: None,
        }
    }

    /// Declares a required field as the table's natural key.
    pub fn with_key(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    /// Returns required ∪ optional
    pub fn all_fields(&self) -> BTreeSet<String> {
        self.required_fields
            .union(&self.optional_fields)
            .cloned()
            .collect()
    }

    /// Whether a field belongs to this entity at all
    pub fn declares(&self, field: &str) -> bool {
        self.required_fields.contains(field) || self.optional_fields.contains(field)
    }

    /// Validates the schema structure itself
    pub fn validate_structure(&self) -> Result<(), String> {
        if !is_valid_identifier(&self.entity_name) {
            return Err(format!("entity name '{}' is not a valid identifier", self.entity_name));
        }

        if self.required_fields.is_empty() {
            return Err(format!("entity '{}' declares no required fields", self.entity_name));
        }

        if let Some(bad) = self.all_fields().into_iter().find(|f| !is_valid_identifier(f)) {
            return Err(format!(
                "entity '{}' field '{}' is not a valid identifier",
                self.entity_name, bad
            ));
        }

        if let Some(key) = &self.key_field {
            if !self.required_fields.contains(key) {
                return Err(format!(
                    "entity '{}' key '{}' is not a required field",
                    self.entity_name, key
                ));
            }
        }

        Ok(())
    }
}
