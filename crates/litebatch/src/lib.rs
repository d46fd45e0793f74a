//! # litebatch
//!
//! Batch INSERT, UPSERT and IN-list statements for SQLite that never exceed
//! the per-statement bound-parameter ceiling (999 by default).
//!
//! ## Features
//!
//! - **Upsert at any size**: small batches bind one placeholder per value;
//!   batches of 50 rows or more travel as one JSON parameter expanded with
//!   `json_each` / `json_extract`
//! - **Large IN-lists**: more than 50 values collapse into
//!   `IN (select value from json_each(:p))`
//! - **Dialects**: SQLite by default, or a portable `ON CONFLICT` dialect
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Safe defaults**: DELETE requires a filter
//! - **Query hooks**: inspect, log or veto every statement
//!
//! ## Example
//!
//! ```ignore
//! use litebatch::prelude::*;
//!
//! let conn = Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE people (job TEXT UNIQUE, age INTEGER, name TEXT)")?;
//!
//! let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
//! for (job, age, name) in staff {
//!     upsert.values([Value::from(job), age.into(), name.into()]);
//! }
//! upsert.execute(&conn)?;
//!
//! let speakers = Select::new("people")
//!     .filter(Condition::in_list("job", jobs)?)
//!     .fetch_values(&conn)?;
//! ```

pub mod client;
pub mod codec;
pub mod condition;
pub mod config;
pub mod connection;
pub mod delete;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod insert;
pub mod monitor;
pub mod placeholder;
pub mod prelude;
pub mod select;
pub mod statement;
pub mod upsert;
pub mod value;

mod batch;

#[cfg(test)]
mod test_support;

pub use client::{GenericClient, make_comment};
pub use condition::{Condition, Op, WhereExpr};
pub use config::ConnectionConfig;
pub use connection::{Connection, Transaction};
pub use delete::Delete;
pub use dialect::{Backend, Dialect, SqliteDialect, StandardDialect};
pub use error::{BatchError, BatchResult};
pub use ident::{Ident, IntoIdent};
pub use insert::Insert;
pub use monitor::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
pub use placeholder::PlaceholderAllocator;
pub use select::{Order, Select};
pub use statement::{EncodingMode, ExecResult, NamedParams, Statement};
pub use upsert::Upsert;
pub use value::Value;

#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;
