//! Portable dialect: `INSERT ... ON CONFLICT (key) DO UPDATE`.

use super::{Backend, Dialect, UpsertParts};
use crate::error::{BatchError, BatchResult};
use crate::placeholder::PlaceholderAllocator;
use crate::statement::{EncodingMode, NamedParams, Statement, insert_values_fragment};

/// Dialect for backends without a placeholder problem.
///
/// Every value gets its own placeholder; batched encoding is not offered.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDialect;

impl Dialect for StandardDialect {
    fn backend(&self) -> Backend {
        Backend::Standard
    }

    fn build_upsert(&self, parts: &UpsertParts<'_>, mode: EncodingMode) -> BatchResult<Statement> {
        if mode == EncodingMode::Batched {
            return Err(BatchError::validation(
                "standard dialect does not support batched upsert encoding",
            ));
        }
        if parts.fields.is_empty() {
            return Err(BatchError::validation("Upsert requires at least one field"));
        }

        let columns = self.column_list(parts.default_fields, parts.fields);
        let key = self.escape_field(parts.key);

        let mut placeholders = PlaceholderAllocator::new();
        let mut params = NamedParams::new();
        let values = insert_values_fragment(
            parts.rows,
            parts.default_fields.len(),
            self.default_keyword(),
            &mut placeholders,
            &mut params,
        );

        let updates: Vec<String> = parts
            .fields
            .iter()
            .map(|f| self.escape_field(f))
            .filter(|c| *c != key)
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect();
        let action = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };

        let sql = format!(
            "{}INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) {}",
            parts.comment,
            parts.table,
            columns.join(", "),
            values,
            key,
            action
        );
        Ok(Statement::new(sql, params))
    }
}
