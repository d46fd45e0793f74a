//! SQLite dialect.
//!
//! SQLite caps a statement at 999 bound parameters by default. Every IN-list
//! and every upsert row shares that budget, so large lists and batches are
//! packed into one JSON-encoded parameter and expanded with `json_each`.

use super::{Backend, Dialect, UpsertParts, direct_value_list};
use crate::codec;
use crate::error::{BatchError, BatchResult};
use crate::ident::{json_path, quote_literal};
use crate::placeholder::{CONDITION_PLACEHOLDER, INSERT_PLACEHOLDER, PlaceholderAllocator};
use crate::statement::{EncodingMode, NamedParams, Statement, insert_values_fragment};
use crate::value::Value;

/// IN-lists longer than this are bound as one JSON array.
///
/// Kept well below the 999 ceiling so a statement can carry several large
/// conditions next to its other placeholders.
pub const VALUE_LIST_THRESHOLD: usize = 50;

/// Upserts of this many rows or more are bound as one JSON array.
///
/// Below it, rows of up to ~20 fields stay under 999 placeholders.
pub const UPSERT_BATCH_THRESHOLD: usize = 50;

/// The SQLite [`Dialect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn default_keyword(&self) -> Option<&'static str> {
        None
    }

    fn value_list_mode(&self, len: usize) -> EncodingMode {
        if len > VALUE_LIST_THRESHOLD {
            EncodingMode::Batched
        } else {
            EncodingMode::Direct
        }
    }

    fn compile_value_list(
        &self,
        values: &[Value],
        placeholders: &mut PlaceholderAllocator,
        params: &mut NamedParams,
    ) -> BatchResult<String> {
        match self.value_list_mode(values.len()) {
            EncodingMode::Direct => Ok(direct_value_list(values, placeholders, params)),
            EncodingMode::Batched => {
                let encoded = codec::encode_values(values)?;
                let name = placeholders.next_name(CONDITION_PLACEHOLDER);
                let fragment = format!("select value from json_each({name})");
                params.push(name, encoded);
                Ok(fragment)
            }
        }
    }

    fn upsert_mode(&self, row_count: usize) -> EncodingMode {
        if row_count < UPSERT_BATCH_THRESHOLD {
            EncodingMode::Direct
        } else {
            EncodingMode::Batched
        }
    }

    fn build_upsert(&self, parts: &UpsertParts<'_>, mode: EncodingMode) -> BatchResult<Statement> {
        if parts.fields.is_empty() {
            return Err(BatchError::validation("Upsert requires at least one field"));
        }

        let columns = self.column_list(parts.default_fields, parts.fields);
        let head = format!(
            "{}INSERT OR REPLACE INTO {} ({})",
            parts.comment,
            parts.table,
            columns.join(", ")
        );

        match mode {
            EncodingMode::Direct => {
                let mut placeholders = PlaceholderAllocator::new();
                let mut params = NamedParams::new();
                let values = insert_values_fragment(
                    parts.rows,
                    0,
                    None,
                    &mut placeholders,
                    &mut params,
                );
                Ok(Statement::new(format!("{head} VALUES {values}"), params))
            }
            EncodingMode::Batched => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "litebatch.dialect",
                    rows = parts.rows.len(),
                    fields = parts.fields.len(),
                    "packing upsert batch into a single json placeholder"
                );

                let encoded = codec::encode_rows(parts.fields, parts.rows)?;
                let extracts: Vec<String> = parts
                    .fields
                    .iter()
                    .map(|field| {
                        format!(
                            "json_extract(value, {}) as {}",
                            quote_literal(&json_path(field)),
                            self.escape_field(field)
                        )
                    })
                    .collect();

                let name = format!("{INSERT_PLACEHOLDER}0");
                let sql = format!(
                    "{head} select {} from json_each({name})",
                    extracts.join(", ")
                );
                let mut params = NamedParams::new();
                params.push(name, encoded);
                Ok(Statement::new(sql, params))
            }
        }
    }
}
