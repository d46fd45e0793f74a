//! Built statements: SQL text plus named parameters.

use crate::placeholder::{INSERT_PLACEHOLDER, PlaceholderAllocator};
use crate::value::Value;
use rusqlite::types::ToSql;

/// How a batch or value list is bound into a statement.
///
/// Computed fresh for every build by the dialect; builders never store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// One placeholder per value.
    Direct,
    /// One placeholder holding the whole batch as a JSON array.
    Batched,
}

/// Named parameters in binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    params: Vec<(String, Value)>,
}

impl NamedParams {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to the placeholder `name` (including its leading `:`).
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.params.push((name.into(), value.into()));
    }

    /// Get the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Extend this list with another list's parameters.
    pub fn extend(&mut self, other: NamedParams) {
        self.params.extend(other.params);
    }

    /// Parameters in the shape rusqlite binds by name.
    pub fn as_named(&self) -> Vec<(&str, &dyn ToSql)> {
        self.params
            .iter()
            .map(|(n, v)| (n.as_str(), v as &dyn ToSql))
            .collect()
    }
}

/// A complete statement ready for [`GenericClient::execute`](crate::GenericClient::execute).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: NamedParams,
}

impl Statement {
    /// Create a statement from text and parameters.
    pub fn new(sql: impl Into<String>, params: NamedParams) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Create a statement without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, NamedParams::new())
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Count placeholder occurrences with the given name prefix in the SQL text.
    pub fn placeholder_occurrences(&self, prefix: &str) -> usize {
        self.sql.matches(prefix).count()
    }
}

/// Outcome of executing a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows inserted, replaced, updated or deleted.
    pub rows_affected: u64,
    /// The connection's last inserted rowid after execution.
    ///
    /// For batched statements this is whatever SQLite reports for the
    /// final expanded row; it is passed through, not interpreted.
    pub last_insert_id: Option<i64>,
}

/// Render `(..), (..)` value tuples, binding each value to a fresh
/// `:db_insert_placeholder_N`.
///
/// `default_keyword` fills the leading `default_count` slots of every tuple
/// (e.g. `DEFAULT`); pass `None` for backends that omit default columns.
pub(crate) fn insert_values_fragment(
    rows: &[Vec<Value>],
    default_count: usize,
    default_keyword: Option<&str>,
    placeholders: &mut PlaceholderAllocator,
    params: &mut NamedParams,
) -> String {
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let mut slots = Vec::with_capacity(row.len() + default_count);
        if let Some(keyword) = default_keyword {
            slots.extend(std::iter::repeat_n(keyword.to_string(), default_count));
        }
        for value in row {
            let name = placeholders.next_name(INSERT_PLACEHOLDER);
            params.push(name.clone(), value.clone());
            slots.push(name);
        }
        tuples.push(format!("({})", slots.join(", ")));
    }
    tuples.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_fragment_numbers_across_rows() {
        let rows = vec![
            vec![Value::from(1), Value::from("a")],
            vec![Value::from(2), Value::from("b")],
        ];
        let mut alloc = PlaceholderAllocator::new();
        let mut params = NamedParams::new();
        let sql = insert_values_fragment(&rows, 0, None, &mut alloc, &mut params);
        assert_eq!(
            sql,
            "(:db_insert_placeholder_0, :db_insert_placeholder_1), \
             (:db_insert_placeholder_2, :db_insert_placeholder_3)"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params.get(":db_insert_placeholder_3"), Some(&Value::from("b")));
    }

    #[test]
    fn values_fragment_with_default_keyword() {
        let rows = vec![vec![Value::from(1)]];
        let mut alloc = PlaceholderAllocator::new();
        let mut params = NamedParams::new();
        let sql = insert_values_fragment(&rows, 2, Some("DEFAULT"), &mut alloc, &mut params);
        assert_eq!(sql, "(DEFAULT, DEFAULT, :db_insert_placeholder_0)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn counts_placeholder_occurrences() {
        let stmt = Statement::raw("select value from json_each(:db_insert_placeholder_0)");
        assert_eq!(stmt.placeholder_occurrences(INSERT_PLACEHOLDER), 1);
    }
}
