use std::time::Duration;

use remix_tools::config::env_or;

/// Worker settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Required; a worker without a queue has nothing to do.
    pub database_url: Option<String>,
    /// Recorded on claimed jobs.
    pub worker_name: String,
    pub poll_interval: Duration,
    /// Connect timeout for the initial pool.
    pub connect_timeout: Duration,
}

impl WorkerConfig {
    /// | Env Var                     | Default                     |
    /// |-----------------------------|-----------------------------|
    /// | `DATABASE_URL`              | required                    |
    /// | `WORKER_NAME`               | `$HOSTNAME` or `worker-<id>` |
    /// | `WORKER_POLL_INTERVAL_MS`   | `1000`                      |
    /// | `BROKER_CONNECT_TIMEOUT_SECS` | `3`                         |
    pub fn from_env() -> Self {
        let worker_name = std::env::var("WORKER_NAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(default_worker_name);

        Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            worker_name,
            poll_interval: Duration::from_millis(env_or("WORKER_POLL_INTERVAL_MS", 1000u64).max(50)),
            connect_timeout: Duration::from_secs(env_or("BROKER_CONNECT_TIMEOUT_SECS", 3u64)),
        }
    }
}

/// `worker-` followed by the first block of a random UUID.
pub fn default_worker_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("worker-{}", &id[..8])
}
