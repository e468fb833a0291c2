//! Route descriptors and the route table produced by compilation.

use crate::sql::SqlFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Case-insensitive exact match.
    pub fn parse(s: &str) -> Option<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Methods whose JSON body is merged into the parameter set.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        HttpMethod::parse(method.as_str())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One endpoint derived from one SQL file.
///
/// `is_universal` and `table_name` are kept consistent by the two constructors:
/// a descriptor is universal exactly when it has no table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    method: HttpMethod,
    path: String,
    sql_path: String,
    table_name: Option<String>,
    is_universal: bool,
}

impl RouteDescriptor {
    pub fn table_scoped(
        method: HttpMethod,
        path: impl Into<String>,
        sql_path: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        RouteDescriptor {
            method,
            path: path.into(),
            sql_path: sql_path.into(),
            table_name: Some(table.into()),
            is_universal: false,
        }
    }

    pub fn universal(method: HttpMethod, path: impl Into<String>, sql_path: impl Into<String>) -> Self {
        RouteDescriptor {
            method,
            path: path.into(),
            sql_path: sql_path.into(),
            table_name: None,
            is_universal: true,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// SQL file location relative to the SQL root, `/`-separated.
    pub fn sql_path(&self) -> &str {
        &self.sql_path
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn is_universal(&self) -> bool {
        self.is_universal
    }

    /// Final path segment, used as the client-side operation name.
    pub fn operation_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A descriptor bound to the SQL it executes.
#[derive(Clone, Debug)]
pub struct Route {
    pub descriptor: RouteDescriptor,
    pub sql: Arc<SqlFile>,
}

/// Ordered routes, unique on (method, path).
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. A route with the same (method, path) replaces the earlier one in place.
    /// Returns the shadowed route, if any.
    pub fn insert(&mut self, route: Route) -> Option<Route> {
        let existing = self.routes.iter().position(|r| {
            r.descriptor.method == route.descriptor.method && r.descriptor.path == route.descriptor.path
        });
        match existing {
            Some(i) => {
                tracing::warn!(
                    method = %route.descriptor.method,
                    path = %route.descriptor.path,
                    shadowed = %self.routes[i].descriptor.sql_path,
                    by = %route.descriptor.sql_path,
                    "route shadowed"
                );
                Some(std::mem::replace(&mut self.routes[i], route))
            }
            None => {
                self.routes.push(route);
                None
            }
        }
    }

    pub fn get(&self, method: HttpMethod, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.descriptor.method == method && r.descriptor.path == path)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().map(|r| &r.descriptor)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes grouped by path, in order of first appearance.
    pub fn by_path(&self) -> Vec<(&str, Vec<&Route>)> {
        let mut groups: Vec<(&str, Vec<&Route>)> = Vec::new();
        for route in &self.routes {
            let path = route.descriptor.path.as_str();
            match groups.iter_mut().find(|(p, _)| *p == path) {
                Some((_, routes)) => routes.push(route),
                None => groups.push((path, vec![route])),
            }
        }
        groups
    }

    /// Distinct table names, sorted.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.descriptors().filter_map(|d| d.table_name()).collect();
        tables.sort_unstable();
        tables.dedup();
        tables
    }
}
