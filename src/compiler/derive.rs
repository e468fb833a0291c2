//! Naming conventions: table scope, HTTP method and route path from a SQL file path.

use crate::compiler::{HttpMethod, RouteDescriptor};

/// Directory segment under which each child directory is a table.
pub const TABLES_MARKER: &str = "Tables";

/// Stem vocabularies, checked in order when no method directory is present.
const VOCABULARY: &[(HttpMethod, &[&str])] = &[
    (HttpMethod::Get, &["select", "get", "find", "read", "list"]),
    (HttpMethod::Post, &["insert", "create", "add", "new"]),
    (HttpMethod::Put, &["update", "upsert", "modify", "edit", "put"]),
    (HttpMethod::Delete, &["delete", "remove", "drop", "destroy"]),
];

/// Split a relative path on either separator, dropping empty and `.` segments.
pub fn segments(relative_path: &str) -> Vec<&str> {
    relative_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// File name without its final extension.
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Index and name of the table directory: the directory right after a `Tables` directory.
pub fn table_segment<'a>(dirs: &[&'a str]) -> Option<(usize, &'a str)> {
    dirs.iter()
        .position(|s| *s == TABLES_MARKER)
        .and_then(|i| dirs.get(i + 1).map(|t| (i + 1, *t)))
}

/// Method from the stem's vocabulary; GET when nothing matches.
pub fn method_from_stem(stem: &str) -> HttpMethod {
    let lower = stem.to_lowercase();
    VOCABULARY
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(m, _)| *m)
        .unwrap_or(HttpMethod::Get)
}

/// Method from a directory named after it, else from the stem.
pub fn method_for(dirs: &[&str], skip: Option<usize>, stem: &str) -> HttpMethod {
    dirs.iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .find_map(|(_, s)| HttpMethod::parse(s))
        .unwrap_or_else(|| method_from_stem(stem))
}

/// Paths owned by the built-in system endpoints.
pub const RESERVED_PATHS: &[&str] = &["/", "/health"];

/// Why `path` cannot be served as a compiled route, if it cannot. The router reads `:` and
/// `*` as captures anywhere in a path, so any occurrence disqualifies it.
pub fn unroutable_reason(path: &str) -> Option<&'static str> {
    if RESERVED_PATHS.contains(&path) {
        Some("collides with a built-in endpoint")
    } else if path.contains([':', '*']) {
        Some("contains a path capture character")
    } else {
        None
    }
}

pub fn route_path(base_url: &str, table: Option<&str>, stem: &str) -> String {
    match table {
        Some(t) => format!("{}/{}/{}", base_url, t, stem),
        None => format!("{}/{}", base_url, stem),
    }
}

/// Derive the descriptor for a SQL file given its path relative to the SQL root.
pub fn describe(relative_path: &str, base_url: &str) -> RouteDescriptor {
    let parts = segments(relative_path);
    let (file_name, dirs) = match parts.split_last() {
        Some((file, dirs)) => (*file, dirs),
        None => ("", &[][..]),
    };
    let stem = file_stem(file_name);
    let sql_path = parts.join("/");
    let table = table_segment(dirs);
    let method = method_for(dirs, table.map(|(i, _)| i), stem);

    match table {
        Some((_, t)) => RouteDescriptor::table_scoped(method, route_path(base_url, Some(t), stem), sql_path, t),
        None => RouteDescriptor::universal(method, route_path(base_url, None, stem), sql_path),
    }
}
