//! Batch shredder
//!
//! Per entity, in registry order:
//! 1. every required field must be a batch column, else the entity is
//!    skipped with a schema mismatch naming the absent fields
//! 2. a row qualifies only if all required fields are non-null in it
//! 3. kept columns = batch columns ∩ (required ∪ optional ∪ timestamp column)
//! 4. qualifying rows are emitted in original order
//!
//! Entities are evaluated independently: a record may qualify for several.
//! The shredder does not mutate the batch and is deterministic.

use chrono::NaiveDate;

use crate::batch::{EntityDataset, Value, WideBatch};
use crate::schema::{EntitySchema, SchemaError, SchemaRegistry};

/// Result of shredding one entity
#[derive(Debug, Clone)]
pub enum ShredOutcome {
    /// Dataset extracted (possibly with zero rows)
    Extracted(EntityDataset),
    /// Required columns absent from the batch; entity skipped this run
    SchemaMismatch(SchemaError),
}

impl ShredOutcome {
    /// The dataset, if one was extracted
    pub fn dataset(&self) -> Option<&EntityDataset> {
        match self {
            ShredOutcome::Extracted(ds) => Some(ds),
            ShredOutcome::SchemaMismatch(_) => None,
        }
    }
}

/// Shred result for one entity
#[derive(Debug, Clone)]
pub struct EntityShred {
    pub entity: String,
    pub outcome: ShredOutcome,
}

/// Shred results for every registered entity, in registry order
#[derive(Debug, Clone, Default)]
pub struct ShredReport {
    entries: Vec<EntityShred>,
}

impl ShredReport {
    /// All entries in registry order
    pub fn entries(&self) -> &[EntityShred] {
        &self.entries
    }

    /// Outcome for one entity
    pub fn outcome(&self, entity: &str) -> Option<&ShredOutcome> {
        self.entries
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| &e.outcome)
    }

    /// Extracted dataset for one entity
    pub fn dataset(&self, entity: &str) -> Option<&EntityDataset> {
        self.outcome(entity).and_then(ShredOutcome::dataset)
    }

    /// Every extracted dataset, in registry order
    pub fn datasets(&self) -> impl Iterator<Item = &EntityDataset> {
        self.entries.iter().filter_map(|e| e.outcome.dataset())
    }

    /// Every schema mismatch, in registry order
    pub fn mismatches(&self) -> impl Iterator<Item = &SchemaError> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            ShredOutcome::SchemaMismatch(err) => Some(err),
            ShredOutcome::Extracted(_) => None,
        })
    }
}

/// Splits a wide batch into per-entity datasets.
pub struct Shredder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Shredder<'a> {
    /// Creates a shredder backed by the given registry.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Shreds a batch for every registered entity.
    pub fn shred(&self, batch: &WideBatch, batch_date: NaiveDate) -> ShredReport {
        let entries = self
            .registry
            .entities()
            .iter()
            .map(|schema| EntityShred {
                entity: schema.entity_name.clone(),
                outcome: self.shred_entity(schema, batch, batch_date),
            })
            .collect();

        ShredReport { entries }
    }

    /// Shreds a batch for one entity.
    pub fn shred_entity(
        &self,
        schema: &EntitySchema,
        batch: &WideBatch,
        batch_date: NaiveDate,
    ) -> ShredOutcome {
        let missing: std::collections::BTreeSet<String> = schema
            .required_fields
            .iter()
            .filter(|f| !batch.has_column(f))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return ShredOutcome::SchemaMismatch(SchemaError::schema_mismatch(
                &schema.entity_name,
                missing,
            ));
        }

        let timestamp_column = self.registry.timestamp_column();
        let columns: Vec<String> = batch
            .columns()
            .iter()
            .filter(|c| schema.declares(c) || Some(c.as_str()) == timestamp_column)
            .cloned()
            .collect();

        let rows: Vec<Vec<Value>> = batch
            .rows()
            .iter()
            .filter(|record| schema.required_fields.iter().all(|f| !record.is_null(f)))
            .map(|record| columns.iter().map(|c| record.get(c).clone()).collect())
            .collect();

        ShredOutcome::Extracted(EntityDataset::new(
            schema.entity_name.clone(),
            batch_date,
            columns,
            rows,
        ))
    }
}

/// Shreds a batch against a registry.
pub fn shred(batch: &WideBatch, registry: &SchemaRegistry, batch_date: NaiveDate) -> ShredReport {
    Shredder::new(registry).shred(batch, batch_date)
}
