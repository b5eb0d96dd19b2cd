/// Projects, teasers and studios are keyed by UUIDs so public tracking
/// links cannot be enumerated.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
