//! Plain multi-row INSERT, split to respect the placeholder ceiling.

use crate::batch::Batch;
use crate::client::GenericClient;
use crate::dialect::InsertParts;
use crate::error::BatchResult;
use crate::statement::{ExecResult, Statement};
use crate::value::Value;

/// Builder for a multi-row `INSERT INTO ... VALUES`.
///
/// Rows are written in as many statements as needed so that none binds more
/// than [`GenericClient::max_placeholders`] parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    batch: Batch,
}

impl Insert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            batch: Batch::new(table),
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch.set_fields(fields);
        self
    }

    pub fn use_defaults<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batch.set_defaults(fields);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.batch.comments.push(text.into());
        self
    }

    pub fn values<I, V>(&mut self, row: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.batch.push_row(row);
        self
    }

    pub fn values_named<I, K, V>(&mut self, row: I) -> BatchResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.batch.push_named_row(row)?;
        Ok(self)
    }

    pub fn row_count(&self) -> usize {
        self.batch.rows.len()
    }

    pub fn clear(&mut self) {
        self.batch.rows.clear();
    }

    pub fn validate(&self) -> BatchResult<()> {
        self.batch.validate("Insert")
    }

    /// Rows per statement for `max_placeholders`; at least one.
    pub fn rows_per_statement(&self, max_placeholders: usize) -> usize {
        match self.batch.fields.len() {
            0 => 1,
            width => (max_placeholders / width).max(1),
        }
    }

    /// Build every statement the pending rows need.
    ///
    /// With no fields and no rows this is a single `DEFAULT VALUES` insert.
    pub fn to_statements<C: GenericClient>(&self, client: &C) -> BatchResult<Vec<Statement>> {
        self.validate()?;
        let (table, comment) = self.batch.head(client);
        let dialect = client.dialect();

        if self.batch.rows.is_empty() {
            let parts = InsertParts {
                table: &table,
                comment: &comment,
                default_fields: &self.batch.default_fields,
                fields: &self.batch.fields,
                rows: &[],
            };
            return Ok(vec![dialect.build_insert(&parts)?]);
        }

        let chunk = self.rows_per_statement(client.max_placeholders());
        self.batch
            .rows
            .chunks(chunk)
            .map(|rows| {
                dialect.build_insert(&InsertParts {
                    table: &table,
                    comment: &comment,
                    default_fields: &self.batch.default_fields,
                    fields: &self.batch.fields,
                    rows,
                })
            })
            .collect()
    }

    /// Write every pending row and clear the batch.
    ///
    /// `rows_affected` is summed across statements; `last_insert_id` comes
    /// from the final statement. If a statement fails, the rows of the
    /// statements already written are dropped from the batch and only the
    /// unwritten rows stay pending. Run inside a
    /// [`Transaction`](crate::Transaction) to make a split insert atomic.
    pub fn execute<C: GenericClient>(&mut self, client: &C) -> BatchResult<ExecResult> {
        let statements = self.to_statements(client)?;
        let chunk = self.rows_per_statement(client.max_placeholders());
        let mut total = ExecResult::default();
        for (i, statement) in statements.iter().enumerate() {
            let result = match client.execute(statement) {
                Ok(result) => result,
                Err(err) => {
                    let written = (i * chunk).min(self.batch.rows.len());
                    self.batch.rows.drain(..written);
                    return Err(err);
                }
            };
            total.rows_affected += result.rows_affected;
            total.last_insert_id = result.last_insert_id;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "litebatch.insert",
            table = %self.batch.table,
            rows = self.batch.rows.len(),
            statements = statements.len(),
            rows_affected = total.rows_affected,
            "insert executed"
        );

        self.batch.rows.clear();
        Ok(total)
    }
}
