//! Generic client trait for unified database access.

use crate::dialect::Dialect;
use crate::error::BatchResult;
use crate::statement::{ExecResult, Statement};

/// A trait that unifies connections and transactions.
///
/// Builders only talk to the database through this trait: they ask it how to
/// escape names and which [`Dialect`] to compile with, then hand it a finished
/// [`Statement`]. Repository code can therefore accept either a
/// [`Connection`](crate::Connection) or a [`Transaction`](crate::Transaction).
pub trait GenericClient {
    /// Dialect used to compile statements for this client.
    fn dialect(&self) -> &dyn Dialect;

    /// Prefix applied to every table name.
    fn table_prefix(&self) -> &str {
        ""
    }

    /// Maximum bound parameters per statement.
    fn max_placeholders(&self) -> usize {
        crate::config::DEFAULT_MAX_PLACEHOLDERS
    }

    /// Escape a column name.
    fn escape_field(&self, field: &str) -> String {
        self.dialect().escape_field(field)
    }

    /// Prefix and escape a table name.
    fn escape_table(&self, table: &str) -> String {
        self.dialect().escape_table(self.table_prefix(), table)
    }

    /// Render statement comments as a SQL comment prefix.
    fn make_comment(&self, comments: &[String]) -> String {
        make_comment(comments)
    }

    /// Execute a statement and report affected rows.
    fn execute(&self, statement: &Statement) -> BatchResult<ExecResult>;

    /// Run a query and map every row.
    fn query_map<T, F>(&self, statement: &Statement, f: F) -> BatchResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>;
}

/// Render `comments` as `/* a; b */ `, or an empty string.
///
/// Every `*` is padded with spaces so comment text can never close the
/// comment early and smuggle SQL after it.
pub fn make_comment(comments: &[String]) -> String {
    if comments.is_empty() {
        return String::new();
    }
    let text = comments.join("; ").replace('*', " * ");
    format!("/* {text} */ ")
}
