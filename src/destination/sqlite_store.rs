//! SQLite backend
//!
//! Namespaces are attached databases, so `Phase1.HumanOps` resolves the same
//! way it does on MySQL.

use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use super::errors::{DestinationError, DestinationResult};
use super::sql::{
    check_insert_shape, create_table_statement, insert_statement, qualified_table, quote_identifier,
    rows_per_statement, Dialect,
};
use super::{require_namespace, Destination, FetchedRows};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::EntitySchema;

/// Default `SQLITE_MAX_VARIABLE_NUMBER` of the bundled library
const MAX_PARAMS: usize = 32_766;

/// A SQLite connection with attached namespaces
pub struct SqliteDestination {
    conn: Connection,
    namespace: Option<String>,
}

impl SqliteDestination {
    /// Opens an in-memory main database and attaches the file at `path`
    /// under `namespace`. The file is created if absent.
    pub fn open(path: &Path, namespace: &str) -> DestinationResult<Self> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        let alias = quote_identifier(namespace)?;
        let target = path.to_string_lossy().into_owned();

        conn.execute(&format!("ATTACH DATABASE ?1 AS {}", alias), [target.as_str()])
            .map_err(|e| DestinationError::UnknownNamespace {
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })?;

        log_event_with_fields(
            Event::DestinationConnected,
            &[("backend", "sqlite"), ("path", &target), ("namespace", namespace)],
        );

        Ok(Self::from_connection(conn))
    }

    /// Wraps an existing connection; namespaces must already be attached.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            namespace: None,
        }
    }

    /// The underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn attached(&self) -> DestinationResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_database_list")
            .map_err(unavailable)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(unavailable)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unavailable)?;
        Ok(names)
    }
}

impl Destination for SqliteDestination {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn select_namespace(&mut self, namespace: &str) -> DestinationResult<()> {
        quote_identifier(namespace)?;
        let attached = self.attached()?;
        if !attached.iter().any(|name| name.eq_ignore_ascii_case(namespace)) {
            return Err(DestinationError::UnknownNamespace {
                namespace: namespace.to_string(),
                reason: "not attached".to_string(),
            });
        }
        self.namespace = Some(namespace.to_string());
        Ok(())
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn live_columns(&mut self, table: &str) -> DestinationResult<Vec<String>> {
        let namespace = require_namespace(&self.namespace)?;
        quote_identifier(table)?;

        let query_failed = |e: rusqlite::Error| DestinationError::QueryFailed(e.to_string());
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1, ?2) ORDER BY cid")
            .map_err(query_failed)?;
        let columns = stmt
            .query_map([table, namespace.as_str()], |row| row.get::<_, String>(0))
            .map_err(query_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;
        Ok(columns)
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> DestinationResult<u64> {
        let namespace = require_namespace(&self.namespace)?;
        check_insert_shape(table, columns, rows)?;

        let insert_failed = |e: rusqlite::Error| DestinationError::InsertFailed {
            table: table.to_string(),
            reason: e.to_string(),
        };

        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.transaction().map_err(insert_failed)?;
        for chunk in rows.chunks(rows_per_statement(columns.len(), MAX_PARAMS)) {
            let sql = insert_statement(&namespace, table, columns, chunk.len())?;
            tx.execute(&sql, params_from_iter(chunk.iter().flatten()))
                .map_err(insert_failed)?;
        }
        tx.commit().map_err(insert_failed)?;

        Ok(rows.len() as u64)
    }

    fn fetch_rows(&mut self, table: &str, limit: u32) -> DestinationResult<FetchedRows> {
        let namespace = require_namespace(&self.namespace)?;
        let sql = format!("SELECT * FROM {} LIMIT {}", qualified_table(&namespace, table)?, limit);

        let query_failed = |e: rusqlite::Error| DestinationError::QueryFailed(e.to_string());
        let mut stmt = self.conn.prepare(&sql).map_err(query_failed)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, SqlValue>(i).map(from_sql_value))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(query_failed)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failed)?;

        Ok(FetchedRows { columns, rows })
    }

    fn create_table(&mut self, schema: &EntitySchema) -> DestinationResult<()> {
        let namespace = require_namespace(&self.namespace)?;
        let sql = create_table_statement(Dialect::Sqlite, &namespace, schema)?;
        self.conn
            .execute_batch(&sql)
            .map_err(|e| DestinationError::QueryFailed(e.to_string()))
    }
}

impl Drop for SqliteDestination {
    fn drop(&mut self) {
        let namespace = self.namespace.as_deref().unwrap_or("");
        log_event_with_fields(
            Event::DestinationReleased,
            &[("backend", "sqlite"), ("namespace", namespace)],
        );
    }
}

fn unavailable(e: rusqlite::Error) -> DestinationError {
    DestinationError::Unavailable(e.to_string())
}

fn from_sql_value(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Text(s) => Some(s),
        SqlValue::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn phase1_memory() -> SqliteDestination {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS Phase1;
             CREATE TABLE Phase1.HumanOps (
                 timestamp VARCHAR(255),
                 operator_id VARCHAR(255),
                 shift VARCHAR(255)
             );",
        )
        .unwrap();
        SqliteDestination::from_connection(conn)
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_namespace_required() {
        let mut dest = phase1_memory();
        assert!(matches!(
            dest.live_columns("HumanOps"),
            Err(DestinationError::NoNamespace)
        ));
    }

    #[test]
    fn test_unknown_namespace() {
        let mut dest = phase1_memory();
        let err = dest.select_namespace("Phase2").unwrap_err();
        assert!(err.is_connection_level());
    }

    #[test]
    fn test_live_columns_in_declaration_order() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();
        assert_eq!(
            dest.live_columns("HumanOps").unwrap(),
            cols(&["timestamp", "operator_id", "shift"])
        );
        assert!(dest.live_columns("NoSuchTable").unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_fetch() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();

        let columns = cols(&["operator_id", "shift"]);
        let rows = vec![
            vec![Some("OP-1".to_string()), Some("Day".to_string())],
            vec![Some("OP-2".to_string()), None],
        ];
        assert_eq!(dest.insert_rows("HumanOps", &columns, &rows).unwrap(), 2);

        let fetched = dest.fetch_rows("HumanOps", 10).unwrap();
        assert_eq!(fetched.columns, cols(&["timestamp", "operator_id", "shift"]));
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.rows[1], vec![None, Some("OP-2".to_string()), None]);
    }

    #[test]
    fn test_fetch_respects_limit() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();
        let rows: Vec<Vec<Option<String>>> =
            (0..5).map(|i| vec![Some(format!("OP-{}", i))]).collect();
        dest.insert_rows("HumanOps", &cols(&["operator_id"]), &rows).unwrap();

        assert_eq!(dest.fetch_rows("HumanOps", 3).unwrap().len(), 3);
    }

    #[test]
    fn test_failed_insert_commits_nothing() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();

        let columns = cols(&["operator_id", "badge"]);
        let rows = vec![vec![Some("OP-1".to_string()), Some("B".to_string())]];
        let err = dest.insert_rows("HumanOps", &columns, &rows).unwrap_err();
        assert!(matches!(err, DestinationError::InsertFailed { .. }));

        assert!(dest.fetch_rows("HumanOps", 10).unwrap().is_empty());
    }

    #[test]
    fn test_chunked_insert_is_one_transaction() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();

        let columns = cols(&["timestamp", "operator_id", "shift"]);
        let rows: Vec<Vec<Option<String>>> = (0..12_000)
            .map(|i| vec![None, Some(format!("OP-{}", i)), Some("Night".to_string())])
            .collect();
        assert_eq!(dest.insert_rows("HumanOps", &columns, &rows).unwrap(), 12_000);
        assert_eq!(dest.fetch_rows("HumanOps", 1000).unwrap().len(), 1000);
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let mut dest = phase1_memory();
        dest.select_namespace("Phase1").unwrap();
        let schema = crate::schema::SchemaRegistry::phase1();
        let lots = schema.get("WaferLotTracking").unwrap();

        dest.create_table(lots).unwrap();
        dest.create_table(lots).unwrap();

        let columns = dest.live_columns("WaferLotTracking").unwrap();
        assert_eq!(columns[0], "lot_id");
        assert_eq!(columns.len(), 7);

        let meteorology = schema.get("Meteorology").unwrap();
        dest.create_table(meteorology).unwrap();
        assert_eq!(dest.live_columns("Meteorology").unwrap()[0], "id");
    }

    #[test]
    fn test_open_attaches_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("phase1.db");

        let mut dest = SqliteDestination::open(&path, "Phase1").unwrap();
        dest.select_namespace("Phase1").unwrap();
        dest.connection()
            .execute_batch("CREATE TABLE Phase1.ProcessMetrics (wafer_id TEXT)")
            .unwrap();
        assert_eq!(dest.live_columns("ProcessMetrics").unwrap(), cols(&["wafer_id"]));
        assert!(path.exists());
    }
}
