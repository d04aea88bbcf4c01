/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Credit balances and costs.
///
/// Signed on purpose: the server never lets a balance drop below zero, but a
/// client mirroring unguarded remote decrements can observe a negative value.
pub type Credits = i64;
