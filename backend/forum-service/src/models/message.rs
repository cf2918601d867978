use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::AuthorSummary;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub conversation_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithAuthor {
    #[serde(flatten)]
    pub message: Message,
    pub author: AuthorSummary,
}
