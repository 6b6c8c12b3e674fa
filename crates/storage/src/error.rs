/// Errors from the object storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required setting is missing; carries the variable name.
    #[error("Missing required env var: {0}")]
    Configuration(String),

    /// A setting is present but unusable (e.g. a malformed endpoint).
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// The storage service rejected or failed the request.
    #[error("Object storage request failed: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
