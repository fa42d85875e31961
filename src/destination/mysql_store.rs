//! MySQL backend
//!
//! Namespaces are MySQL databases. The connection is opened against the
//! configured database and then rebound with `USE`.

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Params, Row, TxOpts, Value as SqlValue};

use super::errors::{DestinationError, DestinationResult};
use super::sql::{
    check_insert_shape, create_table_statement, insert_statement, qualified_table, quote_identifier,
    rows_per_statement, Dialect,
};
use super::{require_namespace, Destination, FetchedRows};
use crate::config::DestinationConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::EntitySchema;

/// Placeholder ceiling of a MySQL prepared statement
const MAX_PARAMS: usize = 65_535;

const LIVE_COLUMNS_SQL: &str = "SELECT COLUMN_NAME FROM information_schema.columns \
     WHERE table_schema = ? AND table_name = ? ORDER BY ORDINAL_POSITION";

/// A single MySQL connection
pub struct MySqlDestination {
    conn: Conn,
    namespace: Option<String>,
    host: String,
}

impl MySqlDestination {
    /// Opens a connection. Connect, read and write all share the configured
    /// timeout.
    pub fn connect(config: &DestinationConfig) -> DestinationResult<Self> {
        let settings = config.log_fields();
        log_event_with_fields(Event::DestinationConnecting, &connecting_fields(&settings));

        let timeout = config.timeout();
        let user = Some(config.user.clone()).filter(|u| !u.is_empty());
        let pass = Some(config.password.clone()).filter(|p| !p.is_empty());

        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .user(user)
            .pass(pass)
            .db_name(Some(config.database.clone()))
            .tcp_connect_timeout(Some(timeout))
            .read_timeout(Some(timeout))
            .write_timeout(Some(timeout));

        let conn = Conn::new(opts).map_err(|e| {
            log_event_with_fields(
                Event::DestinationUnavailable,
                &[("backend", "mysql"), ("host", &config.host), ("error", &e.to_string())],
            );
            DestinationError::Unavailable(e.to_string())
        })?;

        let port = config.port.to_string();
        log_event_with_fields(
            Event::DestinationConnected,
            &[("backend", "mysql"), ("host", &config.host), ("port", &port)],
        );

        Ok(Self {
            conn,
            namespace: None,
            host: config.host.clone(),
        })
    }
}

impl Destination for MySqlDestination {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    fn select_namespace(&mut self, namespace: &str) -> DestinationResult<()> {
        let quoted = quote_identifier(namespace)?;
        self.conn
            .query_drop(format!("USE {}", quoted))
            .map_err(|e| DestinationError::UnknownNamespace {
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })?;
        self.namespace = Some(namespace.to_string());
        Ok(())
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn live_columns(&mut self, table: &str) -> DestinationResult<Vec<String>> {
        let namespace = require_namespace(&self.namespace)?;
        quote_identifier(table)?;

        self.conn
            .exec::<String, _, _>(LIVE_COLUMNS_SQL, (namespace, table.to_string()))
            .map_err(|e| DestinationError::QueryFailed(e.to_string()))
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Option<String>>],
    ) -> DestinationResult<u64> {
        let namespace = require_namespace(&self.namespace)?;
        check_insert_shape(table, columns, rows)?;

        let insert_failed = |e: mysql::Error| DestinationError::InsertFailed {
            table: table.to_string(),
            reason: e.to_string(),
        };

        // Dropping the transaction without commit rolls it back.
        let mut tx = self
            .conn
            .start_transaction(TxOpts::default())
            .map_err(insert_failed)?;

        for chunk in rows.chunks(rows_per_statement(columns.len(), MAX_PARAMS)) {
            let sql = insert_statement(&namespace, table, columns, chunk.len())?;
            let params: Vec<SqlValue> = chunk
                .iter()
                .flat_map(|row| row.iter().map(to_sql_value))
                .collect();
            tx.exec_drop(sql, Params::Positional(params))
                .map_err(insert_failed)?;
        }

        tx.commit().map_err(insert_failed)?;
        Ok(rows.len() as u64)
    }

    fn fetch_rows(&mut self, table: &str, limit: u32) -> DestinationResult<FetchedRows> {
        let namespace = require_namespace(&self.namespace)?;
        let sql = format!("SELECT * FROM {} LIMIT {}", qualified_table(&namespace, table)?, limit);

        let rows: Vec<Row> = self
            .conn
            .query(sql)
            .map_err(|e| DestinationError::QueryFailed(e.to_string()))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns_ref()
                    .iter()
                    .map(|c| c.name_str().into_owned())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .into_iter()
            .map(|row| row.unwrap().into_iter().map(from_sql_value).collect())
            .collect();

        Ok(FetchedRows { columns, rows })
    }

    fn create_table(&mut self, schema: &EntitySchema) -> DestinationResult<()> {
        let namespace = require_namespace(&self.namespace)?;
        let sql = create_table_statement(Dialect::MySql, &namespace, schema)?;
        self.conn
            .query_drop(sql)
            .map_err(|e| DestinationError::QueryFailed(e.to_string()))
    }
}

impl Drop for MySqlDestination {
    fn drop(&mut self) {
        log_event_with_fields(
            Event::DestinationReleased,
            &[("backend", "mysql"), ("host", &self.host)],
        );
    }
}

fn to_sql_value(cell: &Option<String>) -> SqlValue {
    match cell {
        Some(text) => SqlValue::Bytes(text.clone().into_bytes()),
        None => SqlValue::NULL,
    }
}

fn from_sql_value(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::NULL => None,
        SqlValue::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        SqlValue::Int(i) => Some(i.to_string()),
        SqlValue::UInt(u) => Some(u.to_string()),
        SqlValue::Float(f) => Some(f.to_string()),
        SqlValue::Double(d) => Some(d.to_string()),
        SqlValue::Date(year, month, day, hour, minute, second, _micros) => Some(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )),
        SqlValue::Time(negative, days, hours, minutes, seconds, _micros) => {
            let total_hours = days * 24 + u32::from(hours);
            Some(format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                total_hours,
                minutes,
                seconds
            ))
        }
    }
}

/// Log fields for a connection attempt
fn connecting_fields<'a>(settings: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    std::iter::once(("backend", "mysql"))
        .chain(settings.iter().map(|(k, v)| (*k, v.as_str())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{capture_log, Severity};

    #[test]
    fn test_connecting_log_omits_password() {
        let config = DestinationConfig {
            host: "mysql.example".into(),
            user: "loader".into(),
            password: "s3cret".into(),
            ..Default::default()
        };
        let settings = config.log_fields();
        let line = capture_log(
            Severity::Info,
            Event::DestinationConnecting.as_str(),
            &connecting_fields(&settings),
        );

        let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed["backend"], "mysql");
        assert_eq!(parsed["host"], "mysql.example");
        assert_eq!(parsed["credentials"], "supplied");
        assert!(!line.contains("s3cret"));
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(to_sql_value(&None), SqlValue::NULL);
        assert_eq!(
            to_sql_value(&Some("12.5".into())),
            SqlValue::Bytes(b"12.5".to_vec())
        );
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(from_sql_value(SqlValue::NULL), None);
        assert_eq!(from_sql_value(SqlValue::Int(-3)), Some("-3".into()));
        assert_eq!(
            from_sql_value(SqlValue::Bytes(b"Night".to_vec())),
            Some("Night".into())
        );
        assert_eq!(
            from_sql_value(SqlValue::Date(2026, 10, 13, 7, 5, 0, 0)),
            Some("2026-10-13 07:05:00".into())
        );
        assert_eq!(
            from_sql_value(SqlValue::Time(false, 1, 2, 3, 4, 0)),
            Some("26:03:04".into())
        );
    }

    #[test]
    fn test_connect_refused_is_unavailable() {
        let config = DestinationConfig {
            host: "127.0.0.1".into(),
            port: 1,
            timeout_secs: 1,
            ..Default::default()
        };
        let err = MySqlDestination::connect(&config).err().unwrap();
        assert!(err.is_connection_level());
    }
}
