//! Group route descriptors into namespaces: one per table, plus `system` for universal routes.

use crate::compiler::{HttpMethod, RouteDescriptor};
use crate::error::{ClientError, DiscoveryError};
use crate::handlers::Manifest;
use std::collections::BTreeMap;

/// Namespace holding every universal route.
pub const SYSTEM_NAMESPACE: &str = "system";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    operations: BTreeMap<String, Operation>,
}

impl Namespace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self, name: &str) -> Result<&Operation, DiscoveryError> {
        self.operations
            .get(name)
            .ok_or_else(|| DiscoveryError::OperationNotFound {
                namespace: self.name.clone(),
                operation: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Immutable lookup table built once from a route list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceSet {
    namespaces: BTreeMap<String, Namespace>,
}

impl NamespaceSet {
    pub fn build<'a>(routes: impl IntoIterator<Item = &'a RouteDescriptor>, api_base: &str) -> Self {
        let mut namespaces: BTreeMap<String, Namespace> = BTreeMap::new();
        for route in routes {
            let group = if route.is_universal() {
                SYSTEM_NAMESPACE.to_string()
            } else {
                match route
                    .table_name()
                    .map(str::to_string)
                    .or_else(|| table_from_path(route.path(), api_base))
                {
                    Some(t) => t,
                    None => SYSTEM_NAMESPACE.to_string(),
                }
            };
            let ns = namespaces.entry(group.clone()).or_insert_with(|| Namespace {
                name: group,
                operations: BTreeMap::new(),
            });
            let name = route.operation_name().to_string();
            if ns.operations.contains_key(&name) {
                tracing::debug!(namespace = %ns.name, operation = %name, method = %route.method(), "operation already bound; keeping first");
                continue;
            }
            ns.operations.insert(
                name.clone(),
                Operation {
                    name,
                    method: route.method(),
                    path: route.path().to_string(),
                },
            );
        }
        NamespaceSet { namespaces }
    }

    pub fn namespace(&self, name: &str) -> Result<&Namespace, DiscoveryError> {
        self.namespaces
            .get(name)
            .ok_or_else(|| DiscoveryError::NamespaceNotFound(name.to_string()))
    }

    pub fn operation(&self, namespace: &str, operation: &str) -> Result<&Operation, DiscoveryError> {
        self.namespace(namespace)?.operation(operation)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Inverse of the `{base}/{table}/{stem}` convention.
pub fn table_from_path(path: &str, api_base: &str) -> Option<String> {
    let rest = path.strip_prefix(api_base).unwrap_or(path);
    let parts: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match parts.as_slice() {
        [table, _stem] => Some(table.to_string()),
        _ => None,
    }
}

impl Manifest {
    /// Rebuild descriptors from the `/` manifest. Table-scoped entries without a `table`
    /// field fall back to the path convention.
    pub fn into_descriptors(self, api_base: &str) -> Result<Vec<RouteDescriptor>, ClientError> {
        self.endpoints
            .into_iter()
            .map(|e| {
                if e.universal {
                    return Ok(RouteDescriptor::universal(e.method, e.path, e.sql_path.unwrap_or_default()));
                }
                let table = e
                    .table
                    .or_else(|| table_from_path(&e.path, api_base))
                    .ok_or_else(|| ClientError::Manifest(format!("no table for {}", e.path)))?;
                Ok(RouteDescriptor::table_scoped(e.method, e.path, e.sql_path.unwrap_or_default(), table))
            })
            .collect()
    }
}
