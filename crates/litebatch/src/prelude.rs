//! Common imports.
//!
//! ```ignore
//! use litebatch::prelude::*;
//! ```

pub use crate::{
    BatchError, BatchResult, Condition, Connection, Delete, GenericClient, Insert, Op, Order,
    Select, Transaction, Upsert, Value, WhereExpr,
};
