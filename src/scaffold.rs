//! Directory convention scaffolding: method directories, `Tables/`, a placeholder schema,
//! and default CRUD templates per declared table. Existing files are never overwritten.

use crate::compiler::{HttpMethod, TABLES_MARKER};
use crate::config::{ServerConfig, SCHEMA_FILE};
use crate::sql::declared_tables;
use std::io;
use std::path::{Path, PathBuf};

pub const SCHEMA_PLACEHOLDER: &str = "-- define your schema here\n";

const TABLE_DEFAULTS: &[(HttpMethod, &str, &str)] = &[
    (HttpMethod::Get, "select.sql", "SELECT * FROM {{table}};\n"),
    (
        HttpMethod::Post,
        "insert.sql",
        "INSERT INTO {{table}} ({{columns}}) VALUES ({{values}});\n",
    ),
    (HttpMethod::Put, "update.sql", "UPDATE {{table}} SET {{updates}} WHERE id = ?;\n"),
    (HttpMethod::Delete, "delete.sql", "DELETE FROM {{table}} WHERE id = ?;\n"),
];

/// Paths of the directory convention under one SQL root.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn method_dir(&self, method: HttpMethod) -> PathBuf {
        self.root.join(method.as_str())
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join(TABLES_MARKER)
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.tables_dir().join(table)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(SCHEMA_FILE)
    }

    /// Create the root, the four method directories, `Tables/` and a placeholder schema.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for method in HttpMethod::ALL {
            std::fs::create_dir_all(self.method_dir(method))?;
        }
        std::fs::create_dir_all(self.tables_dir())?;
        write_if_absent(&self.schema_path(), SCHEMA_PLACEHOLDER)?;
        Ok(())
    }

    /// Tables declared in the schema file; empty when it does not exist.
    pub fn discover_tables(&self) -> io::Result<Vec<String>> {
        match std::fs::read_to_string(self.schema_path()) {
            Ok(schema) => Ok(declared_tables(&schema)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub fn create_table_dirs(&self, tables: &[String]) -> io::Result<()> {
        for table in tables {
            for method in HttpMethod::ALL {
                std::fs::create_dir_all(self.table_dir(table).join(method.as_str()))?;
            }
        }
        Ok(())
    }

    /// Write the default select/insert/update/delete templates. Returns the files created.
    pub fn provision_table_defaults(&self, tables: &[String]) -> io::Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for table in tables {
            for (method, file, sql) in TABLE_DEFAULTS {
                let path = self.table_dir(table).join(method.as_str()).join(file);
                if write_if_absent(&path, sql)? {
                    created.push(path);
                }
            }
        }
        Ok(created)
    }

    /// Everything above in one pass.
    pub fn scaffold(&self) -> io::Result<Vec<String>> {
        self.ensure_dirs()?;
        let tables = self.discover_tables()?;
        self.create_table_dirs(&tables)?;
        let created = self.provision_table_defaults(&tables)?;
        tracing::info!(
            root = %self.root.display(),
            tables = tables.len(),
            templates_created = created.len(),
            "scaffolded sql root"
        );
        Ok(tables)
    }
}

/// True once the SQL root and the database's directory both exist.
pub fn is_complete(config: &ServerConfig) -> bool {
    let db_dir_exists = match config.database_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.is_dir(),
        _ => true,
    };
    config.sql_root.is_dir() && db_dir_exists
}

fn write_if_absent(path: &Path, content: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(true)
}
