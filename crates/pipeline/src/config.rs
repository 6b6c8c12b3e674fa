use std::time::Duration;

use remix_tools::config::env_or;

/// Settings for backend selection and the local pool.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Queue database; when unset the local backend is used.
    pub database_url: Option<String>,
    /// Upper bound on the whole attempt (connect, health check, migrations).
    pub connect_timeout: Duration,
    /// Concurrent pipeline runs in the local pool.
    pub local_concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            connect_timeout: Duration::from_secs(3),
            local_concurrency: 2,
        }
    }
}

impl DispatchConfig {
    /// Load from `DATABASE_URL`, `BROKER_CONNECT_TIMEOUT_SECS` (3) and
    /// `LOCAL_WORKER_CONCURRENCY` (2).
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            connect_timeout: Duration::from_secs(env_or("BROKER_CONNECT_TIMEOUT_SECS", 3u64)),
            local_concurrency: env_or("LOCAL_WORKER_CONCURRENCY", 2usize).max(1),
        }
    }
}
