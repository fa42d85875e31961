//! Wide batch records
//!
//! A wide batch is one day's union of every entity's rows. Records are open
//! mappings: lookup is by name, and a field a record does not carry reads as
//! `Null`.

use super::value::Value;

static NULL: Value = Value::Null;

/// One heterogeneous row, fields kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, replacing any previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Value of a field; absent fields read as `Null`
    pub fn get(&self, field: &str) -> &Value {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
            .unwrap_or(&NULL)
    }

    /// Whether the field is absent or null
    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).is_null()
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of fields carried
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One day's raw union of all entity rows.
///
/// `columns` is the batch schema: every field name any record carries, in
/// first-appearance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideBatch {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl WideBatch {
    /// Builds a batch with an explicit column list (e.g. a CSV header).
    ///
    /// Fields a record carries outside `columns` are appended to the column
    /// list so that no data is hidden from the shredder.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        let mut batch = Self {
            columns: Vec::new(),
            rows: Vec::new(),
        };
        for column in columns {
            batch.add_column(&column);
        }
        for row in rows {
            batch.push(row);
        }
        batch
    }

    /// Builds a batch whose columns are the union of the records' fields.
    pub fn from_records(rows: Vec<Record>) -> Self {
        Self::new(Vec::new(), rows)
    }

    /// Appends a record, extending the column list as needed
    pub fn push(&mut self, record: Record) {
        let new_fields: Vec<String> = record
            .field_names()
            .filter(|f| !self.has_column(f))
            .map(str::to_string)
            .collect();
        for field in new_fields {
            self.columns.push(field);
        }
        self.rows.push(record);
    }

    /// Appends every record of another batch
    pub fn extend(&mut self, other: WideBatch) {
        for column in &other.columns {
            self.add_column(column);
        }
        for row in other.rows {
            self.push(row);
        }
    }

    fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    /// Whether the batch schema carries a column
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Batch schema in first-appearance order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in original order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
