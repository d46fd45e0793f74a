//! SQLite connections and transactions.

use crate::client::GenericClient;
use crate::config::ConnectionConfig;
use crate::dialect::Dialect;
use crate::error::{BatchError, BatchResult};
use crate::monitor::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use crate::statement::{ExecResult, Statement};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A SQLite connection with its configuration and installed hooks.
///
/// ```ignore
/// use litebatch::{Connection, Upsert};
///
/// let conn = Connection::open("app.db")?;
/// Upsert::new("people")
///     .key("job")
///     .fields(["job", "age", "name"])
///     .values(vec![Value::from("Speaker"), 32.into(), "Bob".into()])
///     .execute(&conn)?;
/// ```
pub struct Connection {
    inner: rusqlite::Connection,
    config: ConnectionConfig,
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Open a database file with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> BatchResult<Self> {
        Self::open_with_config(path, ConnectionConfig::default())
    }

    /// Open a database file.
    pub fn open_with_config(path: impl AsRef<Path>, config: ConnectionConfig) -> BatchResult<Self> {
        let inner = rusqlite::Connection::open(path).map_err(BatchError::from_db_error)?;
        Self::from_rusqlite(inner, config)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> BatchResult<Self> {
        Self::open_in_memory_with_config(ConnectionConfig::default())
    }

    pub fn open_in_memory_with_config(config: ConnectionConfig) -> BatchResult<Self> {
        let inner = rusqlite::Connection::open_in_memory().map_err(BatchError::from_db_error)?;
        Self::from_rusqlite(inner, config)
    }

    /// Wrap an existing rusqlite connection, applying `config`.
    pub fn from_rusqlite(inner: rusqlite::Connection, config: ConnectionConfig) -> BatchResult<Self> {
        if let Some(timeout) = config.busy_timeout_duration() {
            inner
                .busy_timeout(timeout)
                .map_err(BatchError::from_db_error)?;
        }
        Ok(Self {
            inner,
            config,
            hooks: Vec::new(),
        })
    }

    /// Install a hook for every statement this connection (or its
    /// transactions) runs.
    pub fn add_hook<H: QueryHook + 'static>(&mut self, hook: H) -> &mut Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Builder-style variant of [`add_hook`](Self::add_hook).
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The underlying rusqlite connection.
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.inner
    }

    /// Run one or more semicolon-separated statements without parameters
    /// (schema setup, pragmas). Hooks are not consulted.
    pub fn execute_batch(&self, sql: &str) -> BatchResult<()> {
        self.inner
            .execute_batch(sql)
            .map_err(BatchError::from_db_error)
    }

    /// Begin a deferred transaction. It rolls back on drop unless committed.
    pub fn transaction(&mut self) -> BatchResult<Transaction<'_>> {
        let inner = self.inner.transaction().map_err(BatchError::from_db_error)?;
        Ok(Transaction {
            inner,
            config: &self.config,
            hooks: &self.hooks,
        })
    }

    fn executor(&self) -> Executor<'_> {
        Executor {
            conn: &self.inner,
            config: &self.config,
            hooks: &self.hooks,
        }
    }
}

impl GenericClient for Connection {
    fn dialect(&self) -> &dyn Dialect {
        self.config.backend.dialect()
    }

    fn table_prefix(&self) -> &str {
        &self.config.table_prefix
    }

    fn max_placeholders(&self) -> usize {
        self.config.max_placeholders
    }

    fn execute(&self, statement: &Statement) -> BatchResult<ExecResult> {
        self.executor().execute(statement)
    }

    fn query_map<T, F>(&self, statement: &Statement, f: F) -> BatchResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        self.executor().query_map(statement, f)
    }
}

/// A transaction borrowed from a [`Connection`].
///
/// Shares the connection's configuration and hooks. Dropping it without
/// calling [`commit`](Self::commit) rolls back.
pub struct Transaction<'c> {
    inner: rusqlite::Transaction<'c>,
    config: &'c ConnectionConfig,
    hooks: &'c [Arc<dyn QueryHook>],
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl Transaction<'_> {
    pub fn commit(self) -> BatchResult<()> {
        self.inner.commit().map_err(BatchError::from_db_error)
    }

    pub fn rollback(self) -> BatchResult<()> {
        self.inner.rollback().map_err(BatchError::from_db_error)
    }

    pub fn execute_batch(&self, sql: &str) -> BatchResult<()> {
        self.inner
            .execute_batch(sql)
            .map_err(BatchError::from_db_error)
    }

    fn executor(&self) -> Executor<'_> {
        Executor {
            conn: &self.inner,
            config: self.config,
            hooks: self.hooks,
        }
    }
}

impl GenericClient for Transaction<'_> {
    fn dialect(&self) -> &dyn Dialect {
        self.config.backend.dialect()
    }

    fn table_prefix(&self) -> &str {
        &self.config.table_prefix
    }

    fn max_placeholders(&self) -> usize {
        self.config.max_placeholders
    }

    fn execute(&self, statement: &Statement) -> BatchResult<ExecResult> {
        self.executor().execute(statement)
    }

    fn query_map<T, F>(&self, statement: &Statement, f: F) -> BatchResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        self.executor().query_map(statement, f)
    }
}

/// Statement execution shared by connections and transactions.
struct Executor<'a> {
    conn: &'a rusqlite::Connection,
    config: &'a ConnectionConfig,
    hooks: &'a [Arc<dyn QueryHook>],
}

impl Executor<'_> {
    fn execute(&self, statement: &Statement) -> BatchResult<ExecResult> {
        self.instrumented(
            statement,
            |conn, ctx| {
                let mut stmt = conn.prepare_cached(&statement.sql)?;
                let params = statement.params.as_named();
                let affected = stmt.execute(params.as_slice())?;
                let last_insert_id = matches!(ctx.query_type, QueryType::Insert | QueryType::Replace)
                    .then(|| conn.last_insert_rowid());
                Ok(ExecResult {
                    rows_affected: affected as u64,
                    last_insert_id,
                })
            },
            |result: &ExecResult| QueryResult::Affected(result.rows_affected),
        )
    }

    fn query_map<T, F>(&self, statement: &Statement, f: F) -> BatchResult<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        self.instrumented(
            statement,
            |conn, _ctx| {
                let mut stmt = conn.prepare_cached(&statement.sql)?;
                let params = statement.params.as_named();
                let rows = stmt.query_map(params.as_slice(), f)?;
                rows.collect::<rusqlite::Result<Vec<T>>>()
            },
            |rows: &Vec<T>| QueryResult::Rows(rows.len()),
        )
    }

    fn instrumented<T>(
        &self,
        statement: &Statement,
        run: impl FnOnce(&rusqlite::Connection, &QueryContext) -> rusqlite::Result<T>,
        summarize: impl FnOnce(&T) -> QueryResult,
    ) -> BatchResult<T> {
        let ctx = QueryContext::new(&statement.sql, statement.param_count());

        for hook in self.hooks {
            if let HookAction::Abort(reason) = hook.before_query(&ctx) {
                return Err(BatchError::Aborted(reason));
            }
        }

        let start = Instant::now();
        let outcome = run(self.conn, &ctx).map_err(BatchError::from_db_error);
        let elapsed = start.elapsed();

        let summary = match &outcome {
            Ok(value) => summarize(value),
            Err(err) => QueryResult::error(err.to_string()),
        };
        for hook in self.hooks {
            hook.after_query(&ctx, elapsed, &summary);
        }

        self.log_if_slow(&ctx, elapsed);

        outcome
    }

    #[cfg(feature = "tracing")]
    fn log_if_slow(&self, ctx: &QueryContext, elapsed: Duration) {
        let Some(threshold) = self.config.slow_query_threshold() else {
            return;
        };
        if elapsed > threshold {
            tracing::warn!(
                target: "litebatch.sql",
                query_type = ?ctx.query_type,
                param_count = ctx.param_count,
                duration_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                "slow query"
            );
        }
    }

    #[cfg(not(feature = "tracing"))]
    fn log_if_slow(&self, _ctx: &QueryContext, _elapsed: Duration) {
        let _ = self.config;
    }
}
