//! DELETE builder.

use crate::client::GenericClient;
use crate::condition::WhereExpr;
use crate::error::{BatchError, BatchResult};
use crate::placeholder::PlaceholderAllocator;
use crate::statement::{ExecResult, NamedParams, Statement};

/// Builder for `DELETE FROM ... WHERE ...`.
///
/// A delete without a filter is refused unless [`all_rows`](Self::all_rows)
/// is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    filter: Option<WhereExpr>,
    all_rows: bool,
    comments: Vec<String>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            all_rows: false,
            comments: Vec::new(),
        }
    }

    /// Add a filter, ANDed with any existing one.
    pub fn filter(mut self, expr: impl Into<WhereExpr>) -> Self {
        let expr = expr.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_with(expr),
            None => expr,
        });
        self
    }

    /// Allow deleting without a filter.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comments.push(text.into());
        self
    }

    pub fn to_statement<C: GenericClient>(&self, client: &C) -> BatchResult<Statement> {
        let mut sql = client.make_comment(&self.comments);
        sql.push_str("DELETE FROM ");
        sql.push_str(&client.escape_table(&self.table));

        let mut params = NamedParams::new();
        match &self.filter {
            Some(filter) => {
                let mut placeholders = PlaceholderAllocator::new();
                sql.push_str(" WHERE ");
                filter.compile(client.dialect(), &mut placeholders, &mut sql, &mut params)?;
            }
            None if self.all_rows => {}
            None => {
                return Err(BatchError::validation(
                    "Delete without a filter; call all_rows() to delete everything",
                ));
            }
        }
        Ok(Statement::new(sql, params))
    }

    pub fn execute<C: GenericClient>(&self, client: &C) -> BatchResult<ExecResult> {
        let statement = self.to_statement(client)?;
        client.execute(&statement)
    }
}
