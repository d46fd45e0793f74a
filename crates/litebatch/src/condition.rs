//! Query condition types for WHERE clauses.
//!
//! [`Condition`] is one comparison over a validated column; [`WhereExpr`]
//! combines conditions with AND/OR/NOT. Both compile through a [`Dialect`], so
//! IN-lists pick up the backend's value-list encoding, and through one shared
//! [`PlaceholderAllocator`], so every placeholder in the statement is unique.
//!
//! # Example
//! ```ignore
//! use litebatch::{Condition, WhereExpr};
//!
//! let filter = WhereExpr::and(vec![
//!     Condition::eq("status", "active")?.into(),
//!     Condition::in_list("id", ids)?.into(),
//! ]);
//! # Ok::<(), litebatch::BatchError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::BatchResult;
use crate::ident::{Ident, IntoIdent};
use crate::placeholder::{CONDITION_PLACEHOLDER, PlaceholderAllocator};
use crate::statement::NamedParams;
use crate::value::Value;

/// Query operator for building conditions.
///
/// # Example
/// ```ignore
/// use litebatch::Op;
///
/// Op::eq("value");
/// Op::gte(100);
/// Op::like("%pattern%");
/// Op::<i32>::is_null();
/// Op::in_list(vec![1, 2, 3]);
/// Op::between(10, 20);
/// ```
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    /// LIKE pattern match
    Like(T),
    /// NOT LIKE pattern match
    NotLike(T),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
    /// BETWEEN a AND b
    Between(T, T),
    /// NOT BETWEEN a AND b
    NotBetween(T, T),
}

impl<T> Op<T> {
    pub fn eq(val: T) -> Self {
        Op::Eq(val)
    }

    pub fn ne(val: T) -> Self {
        Op::Ne(val)
    }

    pub fn gt(val: T) -> Self {
        Op::Gt(val)
    }

    pub fn gte(val: T) -> Self {
        Op::Gte(val)
    }

    pub fn lt(val: T) -> Self {
        Op::Lt(val)
    }

    pub fn lte(val: T) -> Self {
        Op::Lte(val)
    }

    pub fn like(val: T) -> Self {
        Op::Like(val)
    }

    pub fn not_like(val: T) -> Self {
        Op::NotLike(val)
    }

    pub fn is_null() -> Self {
        Op::IsNull
    }

    pub fn is_not_null() -> Self {
        Op::IsNotNull
    }

    pub fn in_list(vals: Vec<T>) -> Self {
        Op::In(vals)
    }

    pub fn not_in(vals: Vec<T>) -> Self {
        Op::NotIn(vals)
    }

    pub fn between(from: T, to: T) -> Self {
        Op::Between(from, to)
    }

    pub fn not_between(from: T, to: T) -> Self {
        Op::NotBetween(from, to)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionValue {
    Single(Value),
    Pair(Value, Value),
    List(Vec<Value>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionInner {
    /// Raw SQL condition (escape hatch).
    Raw(String),
    Expr {
        column: Ident,
        operator: &'static str,
        value: ConditionValue,
    },
}

/// A single comparison used by WHERE clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Create a structured condition from a column identifier and operator.
    pub fn new<I, T>(column: I, op: Op<T>) -> BatchResult<Self>
    where
        I: IntoIdent,
        T: Into<Value>,
    {
        let column = column.into_ident()?;
        let list = |vals: Vec<T>| ConditionValue::List(vals.into_iter().map(Into::into).collect());
        let (operator, value) = match op {
            Op::Eq(v) => ("=", ConditionValue::Single(v.into())),
            Op::Ne(v) => ("!=", ConditionValue::Single(v.into())),
            Op::Gt(v) => (">", ConditionValue::Single(v.into())),
            Op::Gte(v) => (">=", ConditionValue::Single(v.into())),
            Op::Lt(v) => ("<", ConditionValue::Single(v.into())),
            Op::Lte(v) => ("<=", ConditionValue::Single(v.into())),
            Op::Like(v) => ("LIKE", ConditionValue::Single(v.into())),
            Op::NotLike(v) => ("NOT LIKE", ConditionValue::Single(v.into())),
            Op::IsNull => ("IS NULL", ConditionValue::None),
            Op::IsNotNull => ("IS NOT NULL", ConditionValue::None),
            Op::In(vals) => ("IN", list(vals)),
            Op::NotIn(vals) => ("NOT IN", list(vals)),
            Op::Between(a, b) => ("BETWEEN", ConditionValue::Pair(a.into(), b.into())),
            Op::NotBetween(a, b) => ("NOT BETWEEN", ConditionValue::Pair(a.into(), b.into())),
        };

        Ok(Condition(ConditionInner::Expr {
            column,
            operator,
            value,
        }))
    }

    /// Create a raw SQL condition.
    ///
    /// **Warning**: This bypasses SQL injection protection. Only use with
    /// trusted SQL.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(ConditionInner::Raw(sql.into()))
    }

    // ==================== Convenience constructors ====================

    /// column = value
    pub fn eq<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Eq(value))
    }

    /// column != value
    pub fn ne<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Ne(value))
    }

    /// column > value
    pub fn gt<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Gt(value))
    }

    /// column >= value
    pub fn gte<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Gte(value))
    }

    /// column < value
    pub fn lt<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Lt(value))
    }

    /// column <= value
    pub fn lte<I: IntoIdent, T: Into<Value>>(column: I, value: T) -> BatchResult<Self> {
        Self::new(column, Op::Lte(value))
    }

    /// column LIKE pattern
    pub fn like<I: IntoIdent, T: Into<Value>>(column: I, pattern: T) -> BatchResult<Self> {
        Self::new(column, Op::Like(pattern))
    }

    /// column NOT LIKE pattern
    pub fn not_like<I: IntoIdent, T: Into<Value>>(column: I, pattern: T) -> BatchResult<Self> {
        Self::new(column, Op::NotLike(pattern))
    }

    /// column IS NULL
    pub fn is_null<I: IntoIdent>(column: I) -> BatchResult<Self> {
        Self::new(column, Op::<Value>::IsNull)
    }

    /// column IS NOT NULL
    pub fn is_not_null<I: IntoIdent>(column: I) -> BatchResult<Self> {
        Self::new(column, Op::<Value>::IsNotNull)
    }

    /// column IN (values...)
    pub fn in_list<I: IntoIdent, T: Into<Value>>(column: I, values: Vec<T>) -> BatchResult<Self> {
        Self::new(column, Op::In(values))
    }

    /// column NOT IN (values...)
    pub fn not_in<I: IntoIdent, T: Into<Value>>(column: I, values: Vec<T>) -> BatchResult<Self> {
        Self::new(column, Op::NotIn(values))
    }

    /// column BETWEEN from AND to
    pub fn between<I: IntoIdent, T: Into<Value>>(column: I, from: T, to: T) -> BatchResult<Self> {
        Self::new(column, Op::Between(from, to))
    }

    /// column NOT BETWEEN from AND to
    pub fn not_between<I: IntoIdent, T: Into<Value>>(
        column: I,
        from: T,
        to: T,
    ) -> BatchResult<Self> {
        Self::new(column, Op::NotBetween(from, to))
    }

    /// Compile this condition, appending SQL to `out` and bindings to `params`.
    pub fn compile(
        &self,
        dialect: &dyn Dialect,
        placeholders: &mut PlaceholderAllocator,
        out: &mut String,
        params: &mut NamedParams,
    ) -> BatchResult<()> {
        let (column, operator, value) = match &self.0 {
            ConditionInner::Raw(sql) => {
                out.push_str(sql);
                return Ok(());
            }
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => (column, *operator, value),
        };

        match value {
            ConditionValue::List(vals) if vals.is_empty() => {
                // Empty IN list - always false / true
                out.push_str(if operator == "IN" { "1=0" } else { "1=1" });
            }
            ConditionValue::Single(v) => {
                column.write_sql(out);
                out.push(' ');
                out.push_str(operator);
                out.push(' ');
                bind(v, placeholders, out, params);
            }
            ConditionValue::Pair(a, b) => {
                column.write_sql(out);
                out.push(' ');
                out.push_str(operator);
                out.push(' ');
                bind(a, placeholders, out, params);
                out.push_str(" AND ");
                bind(b, placeholders, out, params);
            }
            ConditionValue::List(vals) => {
                let fragment = dialect.compile_value_list(vals, placeholders, params)?;
                column.write_sql(out);
                out.push(' ');
                out.push_str(operator);
                out.push_str(" (");
                out.push_str(&fragment);
                out.push(')');
            }
            ConditionValue::None => {
                column.write_sql(out);
                out.push(' ');
                out.push_str(operator);
            }
        }
        Ok(())
    }
}

fn bind(
    value: &Value,
    placeholders: &mut PlaceholderAllocator,
    out: &mut String,
    params: &mut NamedParams,
) {
    let name = placeholders.next_name(CONDITION_PLACEHOLDER);
    out.push_str(&name);
    params.push(name, value.clone());
}

/// A composable WHERE expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereExpr {
    /// A single atomic condition.
    Atom(Condition),
    /// Conjunction of expressions (AND).
    And(Vec<WhereExpr>),
    /// Disjunction of expressions (OR).
    Or(Vec<WhereExpr>),
    /// Negation of an expression (NOT).
    Not(Box<WhereExpr>),
}

impl WhereExpr {
    pub fn atom(condition: Condition) -> Self {
        WhereExpr::Atom(condition)
    }

    pub fn and(exprs: Vec<WhereExpr>) -> Self {
        WhereExpr::And(exprs)
    }

    pub fn or(exprs: Vec<WhereExpr>) -> Self {
        WhereExpr::Or(exprs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: WhereExpr) -> Self {
        WhereExpr::Not(Box::new(expr))
    }

    /// AND this expression with another, flattening nested ANDs.
    pub fn and_with(self, other: WhereExpr) -> Self {
        match self {
            WhereExpr::And(mut exprs) => {
                exprs.push(other);
                WhereExpr::And(exprs)
            }
            this => WhereExpr::And(vec![this, other]),
        }
    }

    /// Compile the expression tree.
    ///
    /// Empty AND groups render as `1=1`, empty OR groups as `1=0`.
    pub fn compile(
        &self,
        dialect: &dyn Dialect,
        placeholders: &mut PlaceholderAllocator,
        out: &mut String,
        params: &mut NamedParams,
    ) -> BatchResult<()> {
        match self {
            WhereExpr::Atom(condition) => condition.compile(dialect, placeholders, out, params),
            WhereExpr::And(exprs) => {
                Self::compile_group(exprs, " AND ", "1=1", dialect, placeholders, out, params)
            }
            WhereExpr::Or(exprs) => {
                Self::compile_group(exprs, " OR ", "1=0", dialect, placeholders, out, params)
            }
            WhereExpr::Not(expr) => {
                out.push_str("NOT (");
                expr.compile(dialect, placeholders, out, params)?;
                out.push(')');
                Ok(())
            }
        }
    }

    fn compile_group(
        exprs: &[WhereExpr],
        separator: &str,
        empty: &str,
        dialect: &dyn Dialect,
        placeholders: &mut PlaceholderAllocator,
        out: &mut String,
        params: &mut NamedParams,
    ) -> BatchResult<()> {
        match exprs {
            [] => out.push_str(empty),
            [only] => only.compile(dialect, placeholders, out, params)?,
            _ => {
                out.push('(');
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    expr.compile(dialect, placeholders, out, params)?;
                }
                out.push(')');
            }
        }
        Ok(())
    }
}

impl From<Condition> for WhereExpr {
    fn from(condition: Condition) -> Self {
        WhereExpr::Atom(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Backend;

    fn compile(expr: &WhereExpr, backend: Backend) -> (String, NamedParams) {
        let mut out = String::new();
        let mut params = NamedParams::new();
        let mut alloc = PlaceholderAllocator::new();
        expr.compile(backend.dialect(), &mut alloc, &mut out, &mut params)
            .unwrap();
        (out, params)
    }

    #[test]
    fn single_value_condition() {
        let (sql, params) = compile(&Condition::eq("job", "Speaker").unwrap().into(), Backend::Sqlite);
        assert_eq!(sql, r#""job" = :db_condition_placeholder_0"#);
        assert_eq!(
            params.get(":db_condition_placeholder_0"),
            Some(&Value::from("Speaker"))
        );
    }

    #[test]
    fn between_uses_two_placeholders() {
        let (sql, params) = compile(&Condition::between("age", 18, 65).unwrap().into(), Backend::Sqlite);
        assert_eq!(
            sql,
            r#""age" BETWEEN :db_condition_placeholder_0 AND :db_condition_placeholder_1"#
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_lists_short_circuit() {
        let (sql, params) = compile(
            &Condition::in_list("id", Vec::<i64>::new()).unwrap().into(),
            Backend::Sqlite,
        );
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());

        let (sql, _) = compile(
            &Condition::not_in("id", Vec::<i64>::new()).unwrap().into(),
            Backend::Sqlite,
        );
        assert_eq!(sql, "1=1");
    }

    #[test]
    fn placeholders_are_unique_across_the_tree() {
        let expr = WhereExpr::or(vec![
            Condition::eq("a", 1).unwrap().into(),
            WhereExpr::not(Condition::in_list("b", vec![2, 3]).unwrap().into()),
            Condition::is_null("c").unwrap().into(),
        ]);
        let (sql, params) = compile(&expr, Backend::Sqlite);
        assert_eq!(
            sql,
            r#"("a" = :db_condition_placeholder_0 OR NOT ("b" IN (:db_condition_placeholder_1, :db_condition_placeholder_2)) OR "c" IS NULL)"#
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn large_list_goes_through_dialect() {
        let ids: Vec<i64> = (0..51).collect();
        let expr: WhereExpr = Condition::in_list("id", ids).unwrap().into();

        let (sqlite_sql, sqlite_params) = compile(&expr, Backend::Sqlite);
        assert_eq!(
            sqlite_sql,
            r#""id" IN (select value from json_each(:db_condition_placeholder_0))"#
        );
        assert_eq!(sqlite_params.len(), 1);

        let (_, standard_params) = compile(&expr, Backend::Standard);
        assert_eq!(standard_params.len(), 51);
    }

    #[test]
    fn and_with_flattens() {
        let a: WhereExpr = Condition::eq("a", 1).unwrap().into();
        let b: WhereExpr = Condition::eq("b", 2).unwrap().into();
        let c: WhereExpr = Condition::eq("c", 3).unwrap().into();
        match a.and_with(b).and_with(c) {
            WhereExpr::And(exprs) => assert_eq!(exprs.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_column() {
        assert!(Condition::eq("a; drop table t", 1).is_err());
    }
}
