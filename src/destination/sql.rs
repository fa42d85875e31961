//! SQL text shared by the backends
//!
//! Identifiers are validated against the registry identifier rule and then
//! backtick-quoted; MySQL and SQLite both accept that form. Values are never
//! interpolated, only bound as positional parameters.

use super::errors::{DestinationError, DestinationResult};
use crate::schema::{is_valid_identifier, EntitySchema};

/// Surrogate key column for entities without a natural key
pub const SURROGATE_KEY: &str = "id";

/// Backend-specific DDL spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    fn surrogate_key(self) -> &'static str {
        match self {
            Dialect::MySql => "INT AUTO_INCREMENT PRIMARY KEY",
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }
}

/// Quotes a validated identifier.
pub fn quote_identifier(name: &str) -> DestinationResult<String> {
    if !is_valid_identifier(name) {
        return Err(DestinationError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{}`", name))
}

/// `namespace`.`table`
pub fn qualified_table(namespace: &str, table: &str) -> DestinationResult<String> {
    Ok(format!(
        "{}.{}",
        quote_identifier(namespace)?,
        quote_identifier(table)?
    ))
}

/// Multi-row positional insert for `row_count` rows.
pub fn insert_statement(
    namespace: &str,
    table: &str,
    columns: &[String],
    row_count: usize,
) -> DestinationResult<String> {
    if columns.is_empty() || row_count == 0 {
        return Err(DestinationError::EmptyInsert(table.to_string()));
    }

    let target = qualified_table(namespace, table)?;
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<DestinationResult<Vec<_>>>()?
        .join(", ");

    let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![tuple.as_str(); row_count].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        target, column_list, values
    ))
}

/// `CREATE TABLE IF NOT EXISTS` for an entity. Every data column is text;
/// the natural key (or a surrogate `id`) comes first, then the remaining
/// fields in name order.
pub fn create_table_statement(
    dialect: Dialect,
    namespace: &str,
    schema: &EntitySchema,
) -> DestinationResult<String> {
    let target = qualified_table(namespace, &schema.entity_name)?;
    let mut definitions = Vec::new();

    match &schema.key_field {
        Some(key) => definitions.push(format!("{} VARCHAR(255) PRIMARY KEY", quote_identifier(key)?)),
        None => definitions.push(format!(
            "{} {}",
            quote_identifier(SURROGATE_KEY)?,
            dialect.surrogate_key()
        )),
    }

    for field in schema.all_fields() {
        if schema.key_field.as_deref() == Some(field.as_str()) {
            continue;
        }
        definitions.push(format!("{} VARCHAR(255)", quote_identifier(&field)?));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        target,
        definitions.join(", ")
    ))
}

/// Rows per statement so that bound parameters stay under `max_params`.
pub fn rows_per_statement(column_count: usize, max_params: usize) -> usize {
    if column_count == 0 {
        return 1;
    }
    (max_params / column_count).max(1)
}

/// Checks every row against the column list before anything is sent.
pub fn check_insert_shape(
    table: &str,
    columns: &[String],
    rows: &[Vec<Option<String>>],
) -> DestinationResult<()> {
    if columns.is_empty() || rows.is_empty() {
        return Err(DestinationError::EmptyInsert(table.to_string()));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(DestinationError::RowWidth {
                row: i,
                expected: columns.len(),
                actual: row.len(),
            });
        }
    }
    Ok(())
}
