//! SQLite store: one connection behind one lock.
//!
//! Every statement, read or write, takes the same exclusive lock. SQLite allows a single
//! writer, and serializing reads with it keeps the wrapper simple; read concurrency is not
//! offered. Latency grows linearly with concurrent load.

use crate::error::StoreError;
use crate::sql::{prepare_schema, strip_comments, SqliteBindValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

const QUERY_PREFIXES: &[&str] = &["SELECT", "WITH", "EXPLAIN", "PRAGMA"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Mutation,
}

/// Query iff the statement, past whitespace and leading comments, starts with
/// SELECT, WITH, EXPLAIN or PRAGMA (case-insensitive).
pub fn classify(sql: &str) -> StatementKind {
    let head = strip_comments(sql);
    let head = head.trim_start();
    let is_query = QUERY_PREFIXES.iter().any(|p| {
        head.get(..p.len())
            .map(|s| s.eq_ignore_ascii_case(p))
            .unwrap_or(false)
    });
    if is_query {
        StatementKind::Query
    } else {
        StatementKind::Mutation
    }
}

/// Result of one statement, shaped by its kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ExecutionResult {
    Query {
        columns: Vec<String>,
        rows: Vec<Map<String, Value>>,
        count: usize,
    },
    Mutation {
        last_insert_id: i64,
        rows_affected: u64,
        success: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    Open,
    Closed,
}

/// Lifecycle: a `Store` only exists once opened (schema applied). `close` moves it to
/// `Closed` for good; every later call fails with [`StoreError::Closed`].
pub struct Store {
    location: String,
    conn: Mutex<Option<SqliteConnection>>,
}

impl Store {
    /// Open (creating if missing) the database file and apply `schema` when non-empty.
    pub async fn open(path: impl AsRef<Path>, schema: Option<&str>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        Self::connect(options, path.display().to_string(), schema).await
    }

    /// Private in-memory database; lives as long as the store.
    pub async fn open_in_memory(schema: Option<&str>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Open {
                path: ":memory:".into(),
                source: e,
            })?
            .foreign_keys(true);
        Self::connect(options, ":memory:".into(), schema).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        location: String,
        schema: Option<&str>,
    ) -> Result<Self, StoreError> {
        let mut conn = options.connect().await.map_err(|e| StoreError::Open {
            path: location.clone(),
            source: e,
        })?;
        conn.ping().await.map_err(|e| StoreError::Open {
            path: location.clone(),
            source: e,
        })?;
        tracing::info!(database = %location, "store opened");

        let store = Store {
            location,
            conn: Mutex::new(Some(conn)),
        };
        if let Some(schema) = schema.filter(|s| !s.trim().is_empty()) {
            store.apply_schema(schema).await?;
        }
        Ok(store)
    }

    /// Normalize, make idempotent, split and run the schema script; the first failure aborts.
    pub async fn apply_schema(&self, schema: &str) -> Result<(), StoreError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        for statement in prepare_schema(schema) {
            tracing::debug!(sql = %statement, "schema statement");
            let result = sqlx::query(&statement).execute(&mut *conn).await;
            if let Err(source) = result {
                return Err(StoreError::Schema { statement, source });
            }
        }
        Ok(())
    }

    /// Run one statement with positional arguments.
    pub async fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecutionResult, StoreError> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(StoreError::EmptyStatement);
        }
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        tracing::debug!(sql = %sql, params = ?args, "execute");
        match classify(sql) {
            StatementKind::Query => run_query(conn, sql, args).await,
            StatementKind::Mutation => run_mutation(conn, sql, args).await,
        }
    }

    /// User tables, sorted by name.
    pub async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let result = self
            .execute(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                &[],
            )
            .await?;
        Ok(match result {
            ExecutionResult::Query { rows, .. } => rows
                .into_iter()
                .filter_map(|mut r| match r.remove("name") {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                })
                .collect(),
            ExecutionResult::Mutation { .. } => Vec::new(),
        })
    }

    /// Lightweight connectivity check; false once closed.
    pub async fn is_healthy(&self) -> bool {
        let mut guard = self.conn.lock().await;
        match guard.as_mut() {
            Some(conn) => conn.ping().await.is_ok(),
            None => false,
        }
    }

    pub async fn state(&self) -> StoreState {
        if self.conn.lock().await.is_some() {
            StoreState::Open
        } else {
            StoreState::Closed
        }
    }

    /// Close the connection. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().await?;
            tracing::info!(database = %self.location, "store closed");
        }
        Ok(())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &[Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = query.bind(SqliteBindValue::from_json(arg));
    }
    query
}

async fn run_query(
    conn: &mut SqliteConnection,
    sql: &str,
    args: &[Value],
) -> Result<ExecutionResult, StoreError> {
    // columns come from the prepared statement so empty results still report them
    let columns: Vec<String> = {
        let statement = (&mut *conn).prepare(sql).await?;
        statement.columns().iter().map(|c| c.name().to_string()).collect()
    };
    let rows = bind_all(sqlx::query(sql), args).fetch_all(&mut *conn).await?;
    let rows: Vec<Map<String, Value>> = rows.iter().map(row_to_map).collect();
    let count = rows.len();
    Ok(ExecutionResult::Query { columns, rows, count })
}

async fn run_mutation(
    conn: &mut SqliteConnection,
    sql: &str,
    args: &[Value],
) -> Result<ExecutionResult, StoreError> {
    let result = bind_all(sqlx::query(sql), args).execute(&mut *conn).await?;
    Ok(ExecutionResult::Mutation {
        last_insert_id: result.last_insert_rowid(),
        rows_affected: result.rows_affected(),
        success: true,
    })
}

fn row_to_map(row: &SqliteRow) -> Map<String, Value> {
    let mut map = Map::new();
    for (i, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), cell_to_value(row, i));
    }
    map
}

/// Decode by the value's storage class. BLOBs become (lossy) UTF-8 text.
fn cell_to_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };
    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row
            .try_get_unchecked::<i64, _>(index)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "REAL" | "NUMERIC" => row
            .try_get_unchecked::<f64, _>(index)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null),
        _ => row
            .try_get_unchecked::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const USERS: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);";

    async fn store_with_users() -> Store {
        let store = Store::open_in_memory(Some(USERS)).await.unwrap();
        store.execute("INSERT INTO users (name) VALUES ('ada'), ('grace')", &[]).await.unwrap();
        store
    }

    #[test]
    fn classifies_statements() {
        assert_eq!(classify("  select * from t"), StatementKind::Query);
        assert_eq!(classify("WITH x AS (SELECT 1) SELECT * FROM x"), StatementKind::Query);
        assert_eq!(classify("explain query plan select 1"), StatementKind::Query);
        assert_eq!(classify("PRAGMA table_info(users)"), StatementKind::Query);
        assert_eq!(classify("-- all users\nSELECT * FROM users"), StatementKind::Query);
        assert_eq!(classify("INSERT INTO t VALUES (1)"), StatementKind::Mutation);
        assert_eq!(classify("UPDATE t SET a = 1"), StatementKind::Mutation);
        assert_eq!(classify("SEL"), StatementKind::Mutation);
    }

    #[tokio::test]
    async fn select_returns_columns_rows_and_count() {
        let store = store_with_users().await;
        let result = store.execute("SELECT * FROM users;", &[]).await.unwrap();
        match result {
            ExecutionResult::Query { columns, rows, count } => {
                assert_eq!(columns, vec!["id", "name"]);
                assert_eq!(count, 2);
                assert_eq!(rows[0]["name"], json!("ada"));
                assert_eq!(rows[1]["id"], json!(2));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_result_still_has_columns() {
        let store = store_with_users().await;
        let result = store.execute("SELECT id, name FROM users WHERE id = ?", &[json!(99)]).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Query { columns: vec!["id".into(), "name".into()], rows: vec![], count: 0 }
        );
    }

    #[tokio::test]
    async fn insert_reports_id_and_rows_affected() {
        let store = store_with_users().await;
        let result = store.execute("INSERT INTO users (name) VALUES (?)", &[json!("linus")]).await.unwrap();
        match result {
            ExecutionResult::Mutation { last_insert_id, rows_affected, success } => {
                assert_eq!(rows_affected, 1);
                assert_eq!(last_insert_id, 3);
                assert!(success);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn decodes_storage_classes() {
        let store = Store::open_in_memory(None).await.unwrap();
        let result = store
            .execute("SELECT 1 AS i, 1.5 AS r, 'x' AS t, x'6869' AS b, NULL AS n", &[])
            .await
            .unwrap();
        let ExecutionResult::Query { rows, .. } = result else { panic!("expected query") };
        assert_eq!(rows[0]["i"], json!(1));
        assert_eq!(rows[0]["r"], json!(1.5));
        assert_eq!(rows[0]["t"], json!("x"));
        assert_eq!(rows[0]["b"], json!("hi"));
        assert_eq!(rows[0]["n"], Value::Null);
    }

    #[tokio::test]
    async fn binds_json_values() {
        let store = store_with_users().await;
        let result = store
            .execute("SELECT ? AS a, ? AS b, ? AS c", &[json!(true), json!(null), json!({"k": 1})])
            .await
            .unwrap();
        let ExecutionResult::Query { rows, .. } = result else { panic!("expected query") };
        assert_eq!(rows[0]["a"], json!(1));
        assert_eq!(rows[0]["b"], Value::Null);
        assert_eq!(rows[0]["c"], json!("{\"k\":1}"));
    }

    #[tokio::test]
    async fn empty_statement_is_rejected() {
        let store = Store::open_in_memory(None).await.unwrap();
        assert!(matches!(store.execute("   ", &[]).await, Err(StoreError::EmptyStatement)));
    }

    #[tokio::test]
    async fn bad_sql_is_an_error_not_a_panic() {
        let store = Store::open_in_memory(None).await.unwrap();
        assert!(matches!(store.execute("SELECT * FROM nowhere", &[]).await, Err(StoreError::Db(_))));
    }

    #[tokio::test]
    async fn closed_store_refuses_everything() {
        let store = store_with_users().await;
        assert!(store.is_healthy().await);
        store.close().await.unwrap();
        store.close().await.unwrap();
        assert_eq!(store.state().await, StoreState::Closed);
        assert!(!store.is_healthy().await);
        assert!(matches!(store.execute("SELECT 1", &[]).await, Err(StoreError::Closed)));
        assert!(matches!(store.apply_schema(USERS).await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn schema_reapplies_on_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/app.db");
        let store = Store::open(&path, Some(USERS)).await.unwrap();
        store.execute("INSERT INTO users (name) VALUES ('ada')", &[]).await.unwrap();
        store.close().await.unwrap();

        let store = Store::open(&path, Some(USERS)).await.unwrap();
        assert_eq!(store.list_tables().await.unwrap(), vec!["users"]);
        let ExecutionResult::Query { count, .. } = store.execute("SELECT * FROM users", &[]).await.unwrap() else {
            panic!("expected query")
        };
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn failing_schema_aborts_open() {
        let err = Store::open_in_memory(Some("CREATE TABLE ok (id INTEGER); CREATE TABLEX broken;"))
            .await
            .err()
            .unwrap();
        match err {
            StoreError::Schema { statement, .. } => assert!(statement.contains("broken")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
