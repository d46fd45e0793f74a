//! A [`GenericClient`] that records statements instead of running them.

use crate::client::GenericClient;
use crate::config::DEFAULT_MAX_PLACEHOLDERS;
use crate::dialect::{Backend, Dialect};
use crate::error::{BatchError, BatchResult};
use crate::statement::{ExecResult, Statement};
use std::cell::{Cell, RefCell};

pub(crate) struct RecordingClient {
    backend: Backend,
    prefix: String,
    max_placeholders: usize,
    fail_next: Cell<bool>,
    pub(crate) executed: RefCell<Vec<Statement>>,
}

impl RecordingClient {
    pub(crate) fn new(backend: Backend) -> Self {
        Self {
            backend,
            prefix: String::new(),
            max_placeholders: DEFAULT_MAX_PLACEHOLDERS,
            fail_next: Cell::new(false),
            executed: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn sqlite() -> Self {
        Self::new(Backend::Sqlite)
    }

    pub(crate) fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub(crate) fn with_max_placeholders(mut self, max: usize) -> Self {
        self.max_placeholders = max;
        self
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.set(true);
    }

    pub(crate) fn last(&self) -> Statement {
        self.executed
            .borrow()
            .last()
            .cloned()
            .expect("no statement executed")
    }

    pub(crate) fn count(&self) -> usize {
        self.executed.borrow().len()
    }
}

impl GenericClient for RecordingClient {
    fn dialect(&self) -> &dyn Dialect {
        self.backend.dialect()
    }

    fn table_prefix(&self) -> &str {
        &self.prefix
    }

    fn max_placeholders(&self) -> usize {
        self.max_placeholders
    }

    fn execute(&self, statement: &Statement) -> BatchResult<ExecResult> {
        if self.fail_next.replace(false) {
            return Err(BatchError::Other("injected failure".into()));
        }
        self.executed.borrow_mut().push(statement.clone());
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(self.count() as i64),
        })
    }

    fn query_map<T, F>(&self, statement: &Statement, _f: F) -> BatchResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        self.executed.borrow_mut().push(statement.clone());
        Ok(Vec::new())
    }
}
