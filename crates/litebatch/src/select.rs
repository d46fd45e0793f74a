//! SELECT builder over a [`WhereExpr`] filter.

use crate::client::GenericClient;
use crate::condition::WhereExpr;
use crate::error::BatchResult;
use crate::placeholder::PlaceholderAllocator;
use crate::statement::{NamedParams, Statement};
use crate::value::Value;

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Builder for a single-table SELECT.
///
/// ```ignore
/// use litebatch::{Condition, Order, Select};
///
/// let names: Vec<String> = Select::new("people")
///     .fields(["name"])
///     .filter(Condition::in_list("id", ids)?)
///     .order_by("name", Order::Asc)
///     .fetch_all(&conn, |row| row.get(0))?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    fields: Vec<String>,
    filter: Option<WhereExpr>,
    order_by: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    comments: Vec<String>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            comments: Vec::new(),
        }
    }

    /// Columns to return. Empty means `*`.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
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

    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comments.push(text.into());
        self
    }

    pub fn to_statement<C: GenericClient>(&self, client: &C) -> BatchResult<Statement> {
        let columns = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields
                .iter()
                .map(|f| client.escape_field(f))
                .collect::<Vec<_>>()
                .join(", ")
        };
        self.render(client, &columns, true)
    }

    fn render<C: GenericClient>(
        &self,
        client: &C,
        columns: &str,
        with_paging: bool,
    ) -> BatchResult<Statement> {
        let mut sql = client.make_comment(&self.comments);
        sql.push_str("SELECT ");
        sql.push_str(columns);
        sql.push_str(" FROM ");
        sql.push_str(&client.escape_table(&self.table));

        let mut params = NamedParams::new();
        if let Some(filter) = &self.filter {
            let mut placeholders = PlaceholderAllocator::new();
            sql.push_str(" WHERE ");
            filter.compile(client.dialect(), &mut placeholders, &mut sql, &mut params)?;
        }

        if !with_paging {
            return Ok(Statement::new(sql, params));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(field, dir)| format!("{} {}", client.escape_field(field), dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        Ok(Statement::new(sql, params))
    }

    /// Run the query, mapping each row with `f`.
    pub fn fetch_all<C, T, F>(&self, client: &C, f: F) -> BatchResult<Vec<T>>
    where
        C: GenericClient,
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let statement = self.to_statement(client)?;
        client.query_map(&statement, f)
    }

    /// Run the query, returning every column of every row as [`Value`]s.
    pub fn fetch_values<C: GenericClient>(&self, client: &C) -> BatchResult<Vec<Vec<Value>>> {
        self.fetch_all(client, |row| {
            (0..row.as_ref().column_count())
                .map(|i| row.get::<_, Value>(i))
                .collect()
        })
    }

    /// Count matching rows, ignoring ordering and paging.
    pub fn count<C: GenericClient>(&self, client: &C) -> BatchResult<u64> {
        let statement = self.render(client, "COUNT(*)", false)?;
        let counts = client.query_map(&statement, |row| row.get::<_, i64>(0))?;
        Ok(counts.first().copied().unwrap_or(0).max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::test_support::RecordingClient;

    #[test]
    fn select_all() {
        let client = RecordingClient::sqlite();
        let stmt = Select::new("people").to_statement(&client).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"people\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn filters_share_one_allocator() {
        let client = RecordingClient::sqlite();
        let stmt = Select::new("people")
            .fields(["name", "age"])
            .filter(Condition::eq("job", "Speaker").unwrap())
            .filter(Condition::in_list("age", vec![30, 32]).unwrap())
            .order_by("name", Order::Desc)
            .limit(10)
            .to_statement(&client)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"name\", \"age\" FROM \"people\" WHERE (\"job\" = :db_condition_placeholder_0 \
             AND \"age\" IN (:db_condition_placeholder_1, :db_condition_placeholder_2)) \
             ORDER BY \"name\" DESC LIMIT 10"
        );
        assert_eq!(stmt.param_count(), 3);
    }

    #[test]
    fn large_in_list_is_packed() {
        let client = RecordingClient::sqlite();
        let ids: Vec<i64> = (1..=51).collect();
        let stmt = Select::new("people")
            .filter(Condition::in_list("id", ids).unwrap())
            .to_statement(&client)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"people\" WHERE \"id\" IN \
             (select value from json_each(:db_condition_placeholder_0))"
        );
        assert_eq!(stmt.param_count(), 1);
    }

    #[test]
    fn offset_without_limit() {
        let client = RecordingClient::sqlite();
        let stmt = Select::new("people").offset(5).to_statement(&client).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"people\" LIMIT -1 OFFSET 5");
    }

    #[test]
    fn count_drops_paging() {
        let client = RecordingClient::sqlite();
        let count = Select::new("people")
            .filter(Condition::is_null("age").unwrap())
            .order_by("name", Order::Asc)
            .limit(3)
            .count(&client)
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(
            client.last().sql,
            "SELECT COUNT(*) FROM \"people\" WHERE \"age\" IS NULL"
        );
    }
}
