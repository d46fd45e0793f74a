use crate::dialect::Backend;
use serde::Deserialize;
use std::time::Duration;

/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER`.
pub const DEFAULT_MAX_PLACEHOLDERS: usize = 999;

/// Configuration for [`Connection`](crate::Connection).
///
/// Deserializable so it can live in an application's own config file:
///
/// ```ignore
/// let config: ConnectionConfig = toml::from_str(r#"
///     table_prefix = "app_"
///     busy_timeout_ms = 5000
/// "#)?;
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Dialect used to compile statements.
    pub backend: Backend,
    /// Prefix applied to every table name.
    pub table_prefix: String,
    /// Bound-parameter ceiling per statement.
    pub max_placeholders: usize,
    /// How long SQLite waits on a locked database, in milliseconds.
    pub busy_timeout_ms: Option<u64>,
    /// Statements slower than this are logged as slow, in milliseconds.
    pub slow_query_threshold_ms: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            table_prefix: String::new(),
            max_placeholders: DEFAULT_MAX_PLACEHOLDERS,
            busy_timeout_ms: None,
            slow_query_threshold_ms: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the table prefix.
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Set the bound-parameter ceiling. Values below 1 are clamped to 1.
    pub fn max_placeholders(mut self, max: usize) -> Self {
        self.max_placeholders = max.max(1);
        self
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, duration: Duration) -> Self {
        self.busy_timeout_ms = Some(duration.as_millis() as u64);
        self
    }

    /// Set the slow query threshold.
    pub fn slow_threshold(mut self, duration: Duration) -> Self {
        self.slow_query_threshold_ms = Some(duration.as_millis() as u64);
        self
    }

    pub(crate) fn busy_timeout_duration(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.max_placeholders, 999);
        assert!(config.table_prefix.is_empty());
    }

    #[test]
    fn builder_methods() {
        let config = ConnectionConfig::new()
            .backend(Backend::Standard)
            .table_prefix("app_")
            .max_placeholders(0)
            .busy_timeout(Duration::from_secs(2));
        assert_eq!(config.backend, Backend::Standard);
        assert_eq!(config.table_prefix, "app_");
        assert_eq!(config.max_placeholders, 1);
        assert_eq!(config.busy_timeout_duration(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"backend": "standard", "slow_query_threshold_ms": 250}"#)
                .unwrap();
        assert_eq!(config.backend, Backend::Standard);
        assert_eq!(config.max_placeholders, 999);
        assert_eq!(config.slow_query_threshold(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn deserializes_toml_section() {
        let config: ConnectionConfig = toml::from_str(
            r#"
                backend = "sqlite"
                table_prefix = "app_"
                max_placeholders = 32766
                busy_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.table_prefix, "app_");
        assert_eq!(config.max_placeholders, 32766);
        assert_eq!(config.busy_timeout_duration(), Some(Duration::from_secs(5)));
        assert_eq!(config.slow_query_threshold(), None);
    }
}
