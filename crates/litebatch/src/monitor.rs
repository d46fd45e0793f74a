//! Statement hooks and SQL logging.
//!
//! A [`QueryHook`] sees every statement a [`Connection`](crate::Connection)
//! runs: it can log it, count it, or veto it before SQLite ever sees it.
//!
//! # Example
//!
//! ```rust,ignore
//! use litebatch::monitor::{HookAction, QueryContext, QueryHook, QueryType};
//!
//! struct ReadOnly;
//!
//! impl QueryHook for ReadOnly {
//!     fn before_query(&self, ctx: &QueryContext) -> HookAction {
//!         match ctx.query_type {
//!             QueryType::Select => HookAction::Continue,
//!             _ => HookAction::Abort("read-only connection".into()),
//!         }
//!     }
//! }
//!
//! conn.add_hook(ReadOnly);
//! ```

mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;

pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_query_types() {
        assert_eq!(QueryType::from_sql("SELECT 1"), QueryType::Select);
        assert_eq!(
            QueryType::from_sql("  with t as (select 1) select * from t"),
            QueryType::Select
        );
        assert_eq!(
            QueryType::from_sql("INSERT INTO \"t\" (\"a\") VALUES (1)"),
            QueryType::Insert
        );
        assert_eq!(
            QueryType::from_sql("/* sync */ INSERT OR REPLACE INTO \"t\" (\"a\") VALUES (1)"),
            QueryType::Replace
        );
        assert_eq!(
            QueryType::from_sql("-- note\nDELETE FROM \"t\""),
            QueryType::Delete
        );
        assert_eq!(QueryType::from_sql("update t set a = 1"), QueryType::Update);
        assert_eq!(QueryType::from_sql("CREATE TABLE t (a)"), QueryType::Other);
        assert_eq!(QueryType::from_sql("/* unclosed"), QueryType::Other);
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("héllo", 2), "h");
        assert_eq!(truncate_sql_bytes("hello", 10), "hello");
    }

    #[test]
    fn error_result_is_truncated() {
        let long = "x".repeat(600);
        match QueryResult::error(long) {
            QueryResult::Error(msg) => {
                assert_eq!(msg.len(), 515);
                assert!(msg.ends_with("..."));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_hook_truncates_and_continues() {
        let hook = TracingSqlHook::new().max_sql_length(6);
        assert_eq!(hook.truncate_sql("SELECT 1 FROM t"), "SELECT...");
        let ctx = QueryContext::new("SELECT 1", 0).with_tag("health");
        assert_eq!(hook.before_query(&ctx), HookAction::Continue);
        assert_eq!(TracingSqlHook::new().no_truncate().truncate_sql("abc"), "abc");
    }
}
