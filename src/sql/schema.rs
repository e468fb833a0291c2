//! Schema script preparation: comment stripping, idempotent CREATE TABLE, statement splitting.

use regex::Regex;
use std::sync::OnceLock;

fn create_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bCREATE\s+((?:TEMP|TEMPORARY)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?")
            .expect("valid regex")
    })
}

/// Remove `--` and `/* */` comments outside of quoted text.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Strip comments and drop blank lines.
pub fn normalize_schema(sql: &str) -> String {
    strip_comments(sql)
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrite every `CREATE TABLE` to `CREATE TABLE IF NOT EXISTS`. Applying it twice is a no-op.
pub fn make_idempotent(sql: &str) -> String {
    create_table_re()
        .replace_all(sql, "CREATE ${1}TABLE IF NOT EXISTS ")
        .into_owned()
}

/// Split on `;` outside quoted text; empty statements are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                ';' => {
                    push_statement(&mut statements, &current);
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}

/// Full pipeline applied to a schema script before execution.
pub fn prepare_schema(sql: &str) -> Vec<String> {
    split_statements(&make_idempotent(&normalize_schema(sql)))
}

/// Table names declared by `CREATE TABLE` statements, in order of appearance, deduplicated.
pub fn declared_tables(sql: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?i)\bCREATE\s+(?:(?:TEMP|TEMPORARY)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?["'`\[]?(\w+)["'`\]]?"#)
            .expect("valid regex")
    });
    let mut tables: Vec<String> = Vec::new();
    for cap in re.captures_iter(&strip_comments(sql)) {
        let name = cap[1].to_string();
        if !tables.contains(&name) {
            tables.push(name);
        }
    }
    tables
}
