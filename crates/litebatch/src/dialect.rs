//! SQL dialect strategies.
//!
//! A [`Dialect`] owns every backend-specific decision the builders make:
//! identifier escaping, how IN-lists are bound, and how INSERT/UPSERT batches
//! are rendered. The trait's default methods are the portable behaviour;
//! backends override only what they must.
//!
//! Dialects are selected by [`Backend`]:
//!
//! ```ignore
//! use litebatch::Backend;
//!
//! let dialect = Backend::Sqlite.dialect();
//! assert_eq!(dialect.upsert_mode(49), litebatch::EncodingMode::Direct);
//! assert_eq!(dialect.upsert_mode(50), litebatch::EncodingMode::Batched);
//! ```

mod sqlite;
mod standard;

pub use sqlite::{SqliteDialect, UPSERT_BATCH_THRESHOLD, VALUE_LIST_THRESHOLD};
pub use standard::StandardDialect;

use crate::error::{BatchError, BatchResult};
use crate::ident;
use crate::placeholder::{CONDITION_PLACEHOLDER, PlaceholderAllocator};
use crate::statement::{EncodingMode, NamedParams, Statement, insert_values_fragment};
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Backend identifier used to pick a [`Dialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite: `INSERT OR REPLACE`, JSON batching past the placeholder ceiling.
    #[default]
    Sqlite,
    /// Portable SQL: `ON CONFLICT ... DO UPDATE`, one placeholder per value.
    Standard,
}

static SQLITE: SqliteDialect = SqliteDialect;
static STANDARD: StandardDialect = StandardDialect;

impl Backend {
    /// The dialect implementing this backend.
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Backend::Sqlite => &SQLITE,
            Backend::Standard => &STANDARD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Standard => "standard",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "standard" => Ok(Backend::Standard),
            other => Err(BatchError::validation(format!("Unknown backend '{other}'"))),
        }
    }
}

/// The pieces of an upsert, with the table already prefixed and escaped.
#[derive(Debug, Clone, Copy)]
pub struct UpsertParts<'a> {
    /// Escaped table reference.
    pub table: &'a str,
    /// Rendered comment prefix (possibly empty).
    pub comment: &'a str,
    /// Unescaped unique key field.
    pub key: &'a str,
    /// Unescaped fields that take the column default.
    pub default_fields: &'a [String],
    /// Unescaped fields supplied by each row, in row order.
    pub fields: &'a [String],
    /// The batch; every row has `fields.len()` values.
    pub rows: &'a [Vec<Value>],
}

/// The pieces of a plain insert, with the table already prefixed and escaped.
#[derive(Debug, Clone, Copy)]
pub struct InsertParts<'a> {
    pub table: &'a str,
    pub comment: &'a str,
    pub default_fields: &'a [String],
    pub fields: &'a [String],
    pub rows: &'a [Vec<Value>],
}

/// Backend-specific statement compilation.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// The backend this dialect implements.
    fn backend(&self) -> Backend;

    /// Escape a column name for embedding in SQL text.
    fn escape_field(&self, name: &str) -> String {
        ident::escape_field(name)
    }

    /// Escape a table name, applying the connection's prefix.
    fn escape_table(&self, prefix: &str, table: &str) -> String {
        ident::escape_table(prefix, table)
    }

    /// Keyword filling default-valued columns in a VALUES tuple.
    ///
    /// `None` means the backend has no such keyword and default fields are
    /// left out of the column list entirely.
    fn default_keyword(&self) -> Option<&'static str> {
        Some("DEFAULT")
    }

    /// Encoding used for an IN-list of `len` values.
    fn value_list_mode(&self, len: usize) -> EncodingMode {
        let _ = len;
        EncodingMode::Direct
    }

    /// Compile the inside of `IN (...)` for `values`, binding into `params`.
    fn compile_value_list(
        &self,
        values: &[Value],
        placeholders: &mut PlaceholderAllocator,
        params: &mut NamedParams,
    ) -> BatchResult<String> {
        Ok(direct_value_list(values, placeholders, params))
    }

    /// Encoding used for an upsert of `row_count` rows.
    fn upsert_mode(&self, row_count: usize) -> EncodingMode {
        let _ = row_count;
        EncodingMode::Direct
    }

    /// Render an upsert in the given encoding.
    fn build_upsert(&self, parts: &UpsertParts<'_>, mode: EncodingMode) -> BatchResult<Statement>;

    /// Render a plain multi-row insert in direct encoding.
    fn build_insert(&self, parts: &InsertParts<'_>) -> BatchResult<Statement> {
        if parts.rows.is_empty() {
            if !parts.fields.is_empty() {
                return Err(BatchError::validation("Insert has fields but no rows"));
            }
            return Ok(Statement::raw(format!(
                "{}INSERT INTO {} DEFAULT VALUES",
                parts.comment, parts.table
            )));
        }
        if parts.fields.is_empty() {
            return Err(BatchError::validation("Insert has rows but no fields"));
        }

        let columns = self.column_list(parts.default_fields, parts.fields);
        let mut placeholders = PlaceholderAllocator::new();
        let mut params = NamedParams::new();
        let values = insert_values_fragment(
            parts.rows,
            parts.default_fields.len(),
            self.default_keyword(),
            &mut placeholders,
            &mut params,
        );
        let sql = format!(
            "{}INSERT INTO {} ({}) VALUES {}",
            parts.comment,
            parts.table,
            columns.join(", "),
            values
        );
        Ok(Statement::new(sql, params))
    }

    /// Escaped statement columns: defaults first, then fields.
    fn column_list(&self, default_fields: &[String], fields: &[String]) -> Vec<String> {
        let defaults: &[String] = if self.default_keyword().is_some() {
            default_fields
        } else {
            &[]
        };
        defaults
            .iter()
            .chain(fields)
            .map(|f| self.escape_field(f))
            .collect()
    }
}

/// One `:db_condition_placeholder_N` per value, comma-separated.
pub fn direct_value_list(
    values: &[Value],
    placeholders: &mut PlaceholderAllocator,
    params: &mut NamedParams,
) -> String {
    let mut names = Vec::with_capacity(values.len());
    for value in values {
        let name = placeholders.next_name(CONDITION_PLACEHOLDER);
        params.push(name.clone(), value.clone());
        names.push(name);
    }
    names.join(", ")
}
