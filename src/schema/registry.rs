//! Schema registry
//!
//! The registry is built once at process start and passed explicitly to the
//! shredder and the pipeline. It has no mutation API.
//!
//! Entity order is fixed: it is the order entities are shredded, loaded and
//! reported in.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::identifier::is_valid_identifier;
use super::types::EntitySchema;

/// Column kept for every entity when present in the batch
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Entity names of the Phase1 fab dataset, in load order
pub const PHASE1_ENTITIES: [&str; 5] = [
    "Meteorology",
    "FacilityLogs",
    "ProcessMetrics",
    "HumanOps",
    "WaferLotTracking",
];

/// Read-only mapping from entity name to its field sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    entities: Vec<EntitySchema>,
    #[serde(default)]
    timestamp_column: Option<String>,
}

impl SchemaRegistry {
    /// Builds a registry, validating every entity and name uniqueness.
    pub fn new(entities: Vec<EntitySchema>, timestamp_column: Option<String>) -> SchemaResult<Self> {
        if entities.is_empty() {
            return Err(SchemaError::invalid_registry("no entities defined"));
        }

        let mut seen = BTreeSet::new();
        for entity in &entities {
            entity
                .validate_structure()
                .map_err(SchemaError::invalid_registry)?;

            if !seen.insert(entity.entity_name.as_str()) {
                return Err(SchemaError::invalid_registry(format!(
                    "entity '{}' defined twice",
                    entity.entity_name
                )));
            }
        }

        if let Some(column) = &timestamp_column {
            if !is_valid_identifier(column) {
                return Err(SchemaError::invalid_registry(format!(
                    "timestamp column '{}' is not a valid identifier",
                    column
                )));
            }
        }

        Ok(Self {
            entities,
            timestamp_column,
        })
    }

    /// The five fab entities with fully disjoint field sets (apart from the
    /// shared `timestamp` and `tool_id` columns).
    pub fn phase1() -> Self {
        let entities = vec![
            EntitySchema::new(
                "Meteorology",
                &[
                    "timestamp",
                    "temperature_c",
                    "humidity_pct",
                    "wind_speed_mps",
                    "wind_direction_deg",
                    "rain_mm",
                    "pressure_hpa",
                    "station_id",
                    "aqi",
                    "event_flag",
                ],
                &[],
            ),
            EntitySchema::new(
                "FacilityLogs",
                &[
                    "facility_id",
                    "timestamp",
                    "cleanroom_class",
                    "power_status",
                    "water_quality_ppb",
                    "gas_pressure_kpa",
                    "tool_id",
                    "hvac_status",
                ],
                &[],
            ),
            EntitySchema::new(
                "ProcessMetrics",
                &[
                    "process_id",
                    "wafer_id",
                    "step_name",
                    "tool_id",
                    "cd_target_nm",
                    "cd_variation_nm",
                    "cd_actual_nm",
                    "etch_depth_nm",
                    "defect_density_cm2",
                    "yield_pct",
                ],
                &[],
            )
            .with_key("process_id"),
            EntitySchema::new(
                "HumanOps",
                &[
                    "log_id",
                    "operator_id",
                    "timestamp",
                    "action_type",
                    "error_flag",
                    "shift",
                ],
                &[],
            )
            .with_key("log_id"),
            EntitySchema::new(
                "WaferLotTracking",
                &[
                    "lot_id",
                    "wafer_count",
                    "start_time",
                    "end_time",
                    "avg_process_time_hr",
                    "anomaly",
                    "final_status",
                ],
                &[],
            )
            .with_key("lot_id"),
        ];

        Self {
            entities,
            timestamp_column: Some(TIMESTAMP_COLUMN.to_string()),
        }
    }

    /// Parses a registry from its JSON form.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let raw: SchemaRegistry = serde_json::from_str(json)
            .map_err(|e| SchemaError::invalid_registry(format!("invalid JSON: {}", e)))?;
        Self::new(raw.entities, raw.timestamp_column)
    }

    /// Loads a registry from a JSON file.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::invalid_registry(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Returns the (required, optional) field sets of an entity.
    pub fn fields_for(&self, entity_name: &str) -> SchemaResult<(&BTreeSet<String>, &BTreeSet<String>)> {
        let schema = self.get(entity_name)?;
        Ok((&schema.required_fields, &schema.optional_fields))
    }

    /// Returns the full schema of an entity.
    pub fn get(&self, entity_name: &str) -> SchemaResult<&EntitySchema> {
        self.entities
            .iter()
            .find(|e| e.entity_name == entity_name)
            .ok_or_else(|| SchemaError::unknown_entity(entity_name))
    }

    /// All entities in registry order
    pub fn entities(&self) -> &[EntitySchema] {
        &self.entities
    }

    /// Entity names in registry order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.entity_name.as_str())
    }

    /// Column retained for every entity when the batch carries it
    pub fn timestamp_column(&self) -> Option<&str> {
        self.timestamp_column.as_deref()
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry has no entities (never true once built)
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
