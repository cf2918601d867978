use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A login session. Only the SHA-256 of the client token is persisted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
