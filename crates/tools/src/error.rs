/// Errors from external tools and services.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The executable could not be started (missing binary, permissions).
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("`{program}` failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The process wrote more to stdout than the runner keeps.
    #[error("`{program}` produced more than {limit} bytes of output")]
    OutputTooLarge { program: String, limit: usize },

    /// The process exceeded its timeout and was killed.
    #[error("`{program}` timed out after {elapsed_ms}ms")]
    Timeout { program: String, elapsed_ms: u64 },

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service returned a non-2xx status code.
    #[error("service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A required credential or endpoint is missing.
    #[error("Missing required configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
