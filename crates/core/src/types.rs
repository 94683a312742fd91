/// Database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Principal identifiers come from the external identity provider and are
/// opaque strings (JWT `sub`), never database ids.
pub type PrincipalId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
