//! Per-request execution against the store.

use crate::compiler::Route;
use crate::error::StoreError;
use crate::sql::{count_placeholders, positional_values, process, unresolved_placeholders, ParameterSet};
use crate::store::{ExecutionResult, Store};
use serde_json::Value;

/// Rendered statement and the arguments bound to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Prepared {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Outcome of one execution. `processed_sql` is kept for debug output even on failure.
#[derive(Debug)]
pub struct Execution {
    pub processed_sql: String,
    pub outcome: Result<ExecutionResult, StoreError>,
}

pub struct ExecutionService;

impl ExecutionService {
    /// Render the template and pick positional arguments: parameter values in order,
    /// directives excluded, truncated to the placeholder count. Missing ones bind as NULL.
    pub fn prepare(route: &Route, params: &ParameterSet) -> Prepared {
        let descriptor = &route.descriptor;
        let sql = process(&route.sql.content, descriptor.table_name(), params);
        for name in unresolved_placeholders(&sql) {
            tracing::warn!(
                placeholder = %name,
                sql_path = %descriptor.sql_path(),
                "unresolved placeholder left in statement"
            );
        }
        let mut args = positional_values(params);
        args.truncate(count_placeholders(&sql));
        Prepared { sql, args }
    }

    pub async fn run(store: &Store, route: &Route, params: &ParameterSet) -> Execution {
        if route.sql.is_empty() {
            return Execution {
                processed_sql: String::new(),
                outcome: Err(StoreError::EmptyStatement),
            };
        }
        let Prepared { sql, args } = Self::prepare(route, params);
        let outcome = store.execute(&sql, &args).await;
        if let Err(e) = &outcome {
            tracing::warn!(sql_path = %route.descriptor.sql_path(), error = %e, "execution failed");
        }
        Execution {
            processed_sql: sql,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{HttpMethod, RouteDescriptor};
    use crate::sql::SqlFile;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn users_route(method: HttpMethod, stem: &str, sql: &str) -> Route {
        Route {
            descriptor: RouteDescriptor::table_scoped(
                method,
                format!("/api/v1/users/{}", stem),
                format!("Tables/users/{}/{}.sql", method, stem),
                "users",
            ),
            sql: Arc::new(SqlFile {
                path: PathBuf::from(format!("{}.sql", stem)),
                content: sql.into(),
            }),
        }
    }

    fn params(pairs: &[(&str, Value)]) -> ParameterSet {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn renders_and_truncates_arguments() {
        let route = users_route(HttpMethod::Get, "select", "SELECT * FROM {{table}} WHERE id = ?;");
        let prepared = ExecutionService::prepare(&route, &params(&[("id", json!("1")), ("extra", json!("x"))]));
        assert_eq!(prepared.sql, "SELECT * FROM users WHERE id = ?;");
        assert_eq!(prepared.args, vec![json!("1")]);
    }

    #[test]
    fn directives_shape_statement_but_are_not_bound() {
        let route = users_route(
            HttpMethod::Post,
            "insert",
            "INSERT INTO {{table}} ({{columns}}) VALUES ({{values}});",
        );
        let p = params(&[("columns", json!("name, email")), ("name", json!("ada")), ("email", json!("a@x"))]);
        let prepared = ExecutionService::prepare(&route, &p);
        assert_eq!(prepared.sql, "INSERT INTO users (name, email) VALUES (?, ?);");
        assert_eq!(prepared.args, vec![json!("ada"), json!("a@x")]);
    }

    #[test]
    fn unknown_placeholder_is_kept() {
        let route = users_route(HttpMethod::Get, "select", "SELECT {{mystery}} FROM {{table}};");
        let prepared = ExecutionService::prepare(&route, &ParameterSet::new());
        assert_eq!(prepared.sql, "SELECT {{mystery}} FROM users;");
        assert!(prepared.args.is_empty());
    }

    #[tokio::test]
    async fn runs_against_store() {
        let store = Store::open_in_memory(Some("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);"))
            .await
            .unwrap();
        let insert = users_route(HttpMethod::Post, "insert", "INSERT INTO {{table}} (name) VALUES (?);");
        let exec = ExecutionService::run(&store, &insert, &params(&[("name", json!("ada"))])).await;
        assert!(matches!(exec.outcome, Ok(ExecutionResult::Mutation { rows_affected: 1, .. })));

        let select = users_route(HttpMethod::Get, "select", "SELECT * FROM {{table}} WHERE name = ?;");
        let exec = ExecutionService::run(&store, &select, &params(&[("name", json!("ada"))])).await;
        assert_eq!(exec.processed_sql, "SELECT * FROM users WHERE name = ?;");
        match exec.outcome.unwrap() {
            ExecutionResult::Query { count, rows, .. } => {
                assert_eq!(count, 1);
                assert_eq!(rows[0]["name"], json!("ada"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_arguments_bind_null() {
        let store = Store::open_in_memory(None).await.unwrap();
        let route = users_route(HttpMethod::Get, "select", "SELECT ? AS a, ? AS b;");
        let exec = ExecutionService::run(&store, &route, &params(&[("a", json!(1))])).await;
        match exec.outcome.unwrap() {
            ExecutionResult::Query { rows, .. } => {
                assert_eq!(rows[0]["a"], json!(1));
                assert_eq!(rows[0]["b"], Value::Null);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_file_fails_without_touching_store() {
        let store = Store::open_in_memory(None).await.unwrap();
        let route = users_route(HttpMethod::Get, "select", "  \n ");
        let exec = ExecutionService::run(&store, &route, &ParameterSet::new()).await;
        assert!(matches!(exec.outcome, Err(StoreError::EmptyStatement)));
        assert!(exec.processed_sql.is_empty());
    }
}
