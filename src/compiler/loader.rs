//! Walk the SQL root and compile every `.sql` file into a route.

use crate::compiler::{describe, unroutable_reason, Route, RouteTable};
use crate::config::SCHEMA_FILE;
use crate::error::CompileError;
use crate::sql::SqlFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("sql"))
        .unwrap_or(false)
}

/// Every `.sql` file under `root`, sorted so compilation does not depend on directory order.
pub fn collect_sql_files(root: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CompileError> {
    let walk_err = |source| CompileError::Walk {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(walk_err)?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else if is_sql_file(&path) && (file_type.is_file() || path.is_file()) {
            out.push(path);
        }
    }
    Ok(())
}

/// Path relative to root with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compile the SQL root into a route table. The root-level schema script is not a route.
/// Unreadable files and files whose path cannot be routed are skipped with a warning;
/// directory errors abort.
pub fn compile(root: &Path, base_url: &str) -> Result<RouteTable, CompileError> {
    let mut table = RouteTable::new();
    for path in collect_sql_files(root)? {
        let rel = relative_path(root, &path);
        if rel == SCHEMA_FILE {
            continue;
        }
        let sql = match SqlFile::load(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable sql file");
                continue;
            }
        };
        let descriptor = describe(&rel, base_url);
        if let Some(reason) = unroutable_reason(descriptor.path()) {
            tracing::warn!(path = %descriptor.path(), sql_path = %rel, reason, "skipping sql file");
            continue;
        }
        tracing::debug!(
            method = %descriptor.method(),
            path = %descriptor.path(),
            sql_path = %descriptor.sql_path(),
            "compiled route"
        );
        table.insert(Route {
            descriptor,
            sql: Arc::new(sql),
        });
    }
    tracing::info!(routes = table.len(), root = %root.display(), "route compilation finished");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::HttpMethod;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn compiles_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "schema.sql", "CREATE TABLE users (id INTEGER PRIMARY KEY);");
        write(root, "Tables/users/GET/select.sql", "SELECT * FROM {{table}};");
        write(root, "Tables/users/POST/insert.sql", "INSERT INTO {{table}} (name) VALUES (?);");
        write(root, "GET/health_check.sql", "SELECT 1;");
        write(root, "notes.txt", "not sql");
        write(root, "Tables/users/GET/COUNT.SQL", "SELECT COUNT(*) FROM users;");

        let table = compile(root, "/api/v1").unwrap();
        assert_eq!(table.len(), 4);

        let select = table.get(HttpMethod::Get, "/api/v1/users/select").unwrap();
        assert_eq!(select.descriptor.table_name(), Some("users"));
        assert_eq!(select.sql.content, "SELECT * FROM {{table}};");
        assert!(table.get(HttpMethod::Post, "/api/v1/users/insert").is_some());
        assert!(table.get(HttpMethod::Get, "/api/v1/users/COUNT").is_some());
        let health = table.get(HttpMethod::Get, "/api/v1/health_check").unwrap();
        assert!(health.descriptor.is_universal());
        assert!(table.descriptors().all(|d| d.sql_path() != "schema.sql"));
    }

    #[test]
    fn order_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["zeta", "alpha", "mid"] {
            write(root, &format!("GET/{}.sql", name), "SELECT 1;");
        }
        let first: Vec<String> = compile(root, "").unwrap().descriptors().map(|d| d.path().to_string()).collect();
        let second: Vec<String> = compile(root, "").unwrap().descriptors().map(|d| d.path().to_string()).collect();
        assert_eq!(first, vec!["/alpha", "/mid", "/zeta"]);
        assert_eq!(first, second);
    }

    #[test]
    fn colliding_files_shadow() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "A/GET/ping.sql", "SELECT 'a';");
        write(root, "B/GET/ping.sql", "SELECT 'b';");
        let table = compile(root, "/api").unwrap();
        assert_eq!(table.len(), 1);
        let route = table.get(HttpMethod::Get, "/api/ping").unwrap();
        assert_eq!(route.sql.content, "SELECT 'b';");
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = compile(&dir.path().join("absent"), "/api").unwrap_err();
        assert!(matches!(err, CompileError::Walk { .. }));
    }

    #[test]
    fn unroutable_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "GET/top*.sql", "SELECT 1;");
        write(root, "GET/a:b.sql", "SELECT 1;");
        write(root, "GET/health.sql", "SELECT 1;");
        write(root, "GET/ok.sql", "SELECT 1;");
        let table = compile(root, "").unwrap();
        let paths: Vec<&str> = table.descriptors().map(|d| d.path()).collect();
        assert_eq!(paths, vec!["/ok"]);
    }

    #[test]
    fn tables_and_universal_split() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Tables/b/GET/select.sql", "SELECT 1;");
        write(root, "Tables/a/DELETE/delete.sql", "DELETE FROM a;");
        write(root, "POST/backup.sql", "VACUUM;");
        let table = compile(root, "/api/v1").unwrap();
        assert_eq!(table.tables(), vec!["a", "b"]);
        for d in table.descriptors() {
            assert_eq!(d.is_universal(), d.table_name().is_none());
        }
    }
}
