use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    /// `INSERT OR REPLACE` / `REPLACE`.
    Replace,
    Update,
    Delete,
    /// DDL, pragmas and anything else.
    Other,
}

impl QueryType {
    /// Classify a statement by its leading keyword, skipping comments.
    pub fn from_sql(sql: &str) -> Self {
        let body = skip_leading_comments(sql);
        let mut words = body
            .split(|c: char| c.is_whitespace() || c == '(')
            .filter(|w| !w.is_empty());
        let Some(first) = words.next() else {
            return QueryType::Other;
        };

        if first.eq_ignore_ascii_case("SELECT") || first.eq_ignore_ascii_case("WITH") {
            QueryType::Select
        } else if first.eq_ignore_ascii_case("REPLACE") {
            QueryType::Replace
        } else if first.eq_ignore_ascii_case("INSERT") {
            let replaces = words.next().is_some_and(|w| w.eq_ignore_ascii_case("OR"))
                && words.next().is_some_and(|w| w.eq_ignore_ascii_case("REPLACE"));
            if replaces {
                QueryType::Replace
            } else {
                QueryType::Insert
            }
        } else if first.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if first.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

fn skip_leading_comments(sql: &str) -> &str {
    let mut s = sql.trim_start();
    loop {
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => s = rest[pos + 1..].trim_start(),
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => s = rest[pos + 2..].trim_start(),
                None => return "",
            }
        } else {
            return s;
        }
    }
}

/// What a hook sees about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL text sent to SQLite.
    pub sql: String,
    /// Number of bound parameters.
    pub param_count: usize,
    /// Detected statement kind.
    pub query_type: QueryType,
    /// Optional name identifying the statement.
    pub tag: Option<String>,
    /// Low-cardinality structured fields.
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
            tag: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement, as reported to [`QueryHook::after_query`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A query returned this many rows.
    Rows(usize),
    /// A statement changed this many rows.
    Affected(u64),
    /// The statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Build an error result, truncating long messages.
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() <= MAX_ERROR_LEN {
            return Self::Error(msg);
        }
        Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Decision returned by [`QueryHook::before_query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Run the statement.
    Continue,
    /// Refuse to run it; the caller gets [`BatchError::Aborted`](crate::BatchError::Aborted).
    Abort(String),
}

/// Hook into statement execution.
///
/// Hooks are installed on a [`Connection`](crate::Connection) and also run for
/// statements executed inside its transactions.
pub trait QueryHook: Send + Sync {
    /// Called before a statement runs.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called after a statement finishes, successfully or not.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
