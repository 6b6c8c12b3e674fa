/// Jobs are identified by an opaque UUID, rendered as a string on the wire.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
