//! Batched `INSERT OR REPLACE` / `ON CONFLICT DO UPDATE`.
//!
//! An [`Upsert`] collects rows and writes them in one statement. How the rows
//! are bound is decided by the client's [`Dialect`](crate::Dialect) on every
//! build: SQLite binds small batches one placeholder per value and packs
//! batches of 50 rows or more into a single JSON parameter, so arbitrarily
//! large batches stay under the 999-placeholder ceiling.
//!
//! ```ignore
//! use litebatch::{Upsert, Value};
//!
//! let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
//! upsert
//!     .values([Value::from("Presenter"), 45.into(), "Ann".into()])
//!     .values([Value::from("Speaker"), 32.into(), "Bob".into()]);
//! let result = upsert.execute(&conn)?;
//! assert_eq!(upsert.row_count(), 0);
//! ```

use crate::batch::Batch;
use crate::client::GenericClient;
use crate::dialect::UpsertParts;
use crate::error::{BatchError, BatchResult};
use crate::ident::check_field_name;
use crate::statement::{EncodingMode, ExecResult, Statement};
use crate::value::Value;

/// Builder for a keyed multi-row upsert.
///
/// Configuration methods consume and return the builder. Rows are added
/// through `&mut self` so the same builder can be filled, executed, and
/// filled again.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    batch: Batch,
    key: Option<String>,
}

impl Upsert {
    /// Start an upsert into `table` (unprefixed, unescaped).
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            batch: Batch::new(table),
            key: None,
        }
    }

    /// The unique field identifying a row.
    pub fn key(mut self, field: impl Into<String>) -> Self {
        self.key = Some(field.into());
        self
    }

    /// Fields supplied by every row, in row order.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch.set_fields(fields);
        self
    }

    /// Fields that take the column default instead of a value.
    pub fn use_defaults<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch.set_defaults(fields);
        self
    }

    /// Prefix the statement with `/* text */`.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.batch.comments.push(text.into());
        self
    }

    /// Append a row, positionally matching the declared fields.
    pub fn values<I, V>(&mut self, row: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.batch.push_row(row);
        self
    }

    /// Append a row given as `(field, value)` pairs.
    ///
    /// If no fields are declared yet, this row declares them in pair order.
    pub fn values_named<I, K, V>(&mut self, row: I) -> BatchResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.batch.push_named_row(row)?;
        Ok(self)
    }

    /// Number of pending rows.
    pub fn row_count(&self) -> usize {
        self.batch.rows.len()
    }

    /// Pending rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.batch.rows
    }

    /// Drop pending rows, keeping table, key and fields.
    pub fn clear(&mut self) {
        self.batch.rows.clear();
    }

    /// Check that the builder can produce a statement.
    pub fn validate(&self) -> BatchResult<()> {
        match self.key.as_deref() {
            None | Some("") => return Err(BatchError::validation("Upsert requires a key field")),
            Some(key) => check_field_name(key)?,
        }
        if self.batch.fields.is_empty() {
            return Err(BatchError::validation("Upsert requires at least one field"));
        }
        self.batch.validate("Upsert")
    }

    /// Build the statement in the mode the client's dialect picks for the
    /// current row count.
    pub fn to_statement<C: GenericClient>(&self, client: &C) -> BatchResult<Statement> {
        let mode = client.dialect().upsert_mode(self.row_count());
        self.build_statement(client, mode)
    }

    /// Build the statement in an explicit encoding mode.
    pub fn build_statement<C: GenericClient>(
        &self,
        client: &C,
        mode: EncodingMode,
    ) -> BatchResult<Statement> {
        self.validate()?;
        let (table, comment) = self.batch.head(client);
        let parts = UpsertParts {
            table: &table,
            comment: &comment,
            key: self.key.as_deref().unwrap_or_default(),
            default_fields: &self.batch.default_fields,
            fields: &self.batch.fields,
            rows: &self.batch.rows,
        };
        client.dialect().build_upsert(&parts, mode)
    }

    /// Write every pending row.
    ///
    /// On success the batch is emptied and the builder is ready for the next
    /// round; on failure the rows are kept. An empty batch executes nothing.
    pub fn execute<C: GenericClient>(&mut self, client: &C) -> BatchResult<ExecResult> {
        self.validate()?;
        if self.batch.rows.is_empty() {
            return Ok(ExecResult::default());
        }

        let statement = self.to_statement(client)?;
        let result = client.execute(&statement)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "litebatch.upsert",
            table = %self.batch.table,
            rows = self.batch.rows.len(),
            params = statement.param_count(),
            rows_affected = result.rows_affected,
            "upsert executed"
        );

        self.batch.rows.clear();
        Ok(result)
    }
}
