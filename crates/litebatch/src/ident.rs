//! Safe SQL identifier handling.
//!
//! [`Ident`] is a validated column or table reference. Each `.`-separated part
//! must match `[A-Za-z_][A-Za-z0-9_]*`; parts render double-quoted so keywords
//! such as `select` or `update` are usable as names.
//!
//! [`escape_field`] and [`escape_table`] are the lenient forms used when
//! rendering builder columns: characters outside `[A-Za-z0-9_.]` are dropped
//! before quoting, so the output is always a well-formed identifier.
//!
//! # Example
//! ```ignore
//! use litebatch::Ident;
//!
//! let c = Ident::parse("people.job")?;
//! assert_eq!(c.to_sql(), r#""people"."job""#);
//! # Ok::<(), litebatch::BatchError>(())
//! ```

use crate::error::{BatchError, BatchResult};

/// A SQL identifier (column or table name, optionally dotted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<String>,
}

impl Ident {
    /// Parse a possibly dotted identifier.
    pub fn parse(s: &str) -> BatchResult<Self> {
        if s.is_empty() {
            return Err(BatchError::validation("Identifier cannot be empty"));
        }

        let mut parts = Vec::new();
        for seg in s.split('.') {
            validate_segment(s, seg)?;
            parts.push(seg.to_string());
        }
        Ok(Self { parts })
    }

    /// Render the identifier as quoted SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.parts.iter().map(|p| p.len() + 3).sum());
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('"');
            out.push_str(part);
            out.push('"');
        }
    }
}

fn validate_segment(whole: &str, seg: &str) -> BatchResult<()> {
    let mut chars = seg.chars();
    let Some(first) = chars.next() else {
        return Err(BatchError::validation(format!(
            "Empty segment in identifier '{whole}'"
        )));
    };
    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(BatchError::validation(format!(
            "Invalid identifier start character '{first}' in '{whole}'"
        )));
    }
    if let Some(bad) = chars.find(|c| !(*c == '_' || c.is_ascii_alphanumeric())) {
        return Err(BatchError::validation(format!(
            "Invalid character '{bad}' in identifier '{whole}'"
        )));
    }
    Ok(())
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> BatchResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> BatchResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> BatchResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> BatchResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> BatchResult<Ident> {
        Ident::parse(&self)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| *c == '_' || *c == '.' || c.is_ascii_alphanumeric())
        .collect()
}

fn quote_parts<'a>(parts: impl Iterator<Item = &'a str>, out: &mut String) {
    for (i, part) in parts.enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push('"');
        out.push_str(part);
        out.push('"');
    }
}

/// Escape a field name for embedding in SQL text.
///
/// `job` → `"job"`, `p.job` → `"p"."job"`. Unsafe characters are dropped.
pub fn escape_field(name: &str) -> String {
    let clean = sanitize(name);
    let mut out = String::with_capacity(clean.len() + 4);
    quote_parts(clean.split('.').filter(|p| !p.is_empty()), &mut out);
    out
}

/// Escape a table name, applying `prefix` to the table part.
///
/// `("app_", "people")` → `"app_people"`, `("app_", "main.people")` →
/// `"main"."app_people"`.
pub fn escape_table(prefix: &str, table: &str) -> String {
    let clean = sanitize(table);
    let prefixed = match clean.rsplit_once('.') {
        Some((schema, name)) => format!("{schema}.{}{name}", sanitize(prefix)),
        None => format!("{}{clean}", sanitize(prefix)),
    };
    let mut out = String::with_capacity(prefixed.len() + 4);
    quote_parts(prefixed.split('.').filter(|p| !p.is_empty()), &mut out);
    out
}

/// Check a builder field name before it reaches SQL text.
///
/// Fields are escaped leniently for the column list, but batched upserts also
/// address each field as a JSON object key. SQLite ends a quoted path label
/// at the next `"` and has no escape for it, so `"`, `\` and control
/// characters are refused, as is a name that escapes to nothing.
pub fn check_field_name(name: &str) -> BatchResult<()> {
    if sanitize(name).split('.').all(str::is_empty) {
        return Err(BatchError::validation(format!(
            "Field '{name}' has no usable identifier characters"
        )));
    }
    if let Some(bad) = name.chars().find(|c| *c == '"' || *c == '\\' || c.is_control()) {
        return Err(BatchError::validation(format!(
            "Invalid character {bad:?} in field '{name}'"
        )));
    }
    Ok(())
}

/// Render `text` as a single-quoted SQL string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// JSON path selecting a top-level object key, e.g. `$.job`.
///
/// Keys that are not plain identifiers use the quoted label form `$."key"`.
/// Embed the result with [`quote_literal`].
pub fn json_path(key: &str) -> String {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && key.chars().all(|c| c == '_' || c.is_ascii_alphanumeric());
    if plain {
        format!("$.{key}")
    } else {
        format!("$.\"{key}\"")
    }
}
