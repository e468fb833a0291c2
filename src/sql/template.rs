//! `{{placeholder}}` substitution for SQL templates.
//!
//! Recognized tokens are `{{table}}`, `{{columns}}`, `{{values}}` and `{{updates}}`.
//! Anything else is copied through untouched, and substituted text is never rescanned.

use crate::sql::params::{is_directive, ParameterSet};
use regex::Regex;
use std::sync::OnceLock;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Render a template against a table name and parameter set.
///
/// `{{table}}` is replaced verbatim and must only ever come from the directory layout,
/// never from request input. Without a table name the token is left in place.
pub fn process(sql: &str, table: Option<&str>, params: &ParameterSet) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let replacement = after
            .find(CLOSE)
            .and_then(|end| substitute(&after[..end], table, params).map(|text| (end, text)));
        match replacement {
            Some((end, text)) => {
                out.push_str(&text);
                rest = &after[end + CLOSE.len()..];
            }
            None => {
                out.push_str(OPEN);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn substitute(name: &str, table: Option<&str>, params: &ParameterSet) -> Option<String> {
    match name {
        "table" => table.map(str::to_string),
        "columns" => Some(string_param(params, "columns").unwrap_or("*").to_string()),
        "values" => Some(match string_param(params, "values") {
            Some(v) => v.to_string(),
            None => {
                let n = params.iter().filter(|(k, v)| !is_directive(k, v)).count();
                vec!["?"; n].join(", ")
            }
        }),
        "updates" => Some(string_param(params, "updates").unwrap_or("column = ?").to_string()),
        _ => None,
    }
}

fn string_param<'a>(params: &'a ParameterSet, name: &str) -> Option<&'a str> {
    params.get(name).and_then(|v| v.as_str())
}

/// `{{name}}` tokens still present in rendered SQL.
pub fn unresolved_placeholders(sql: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex"));
    re.captures_iter(sql).map(|c| c[1].to_string()).collect()
}
