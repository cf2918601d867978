use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{AuthorSummary, MessageWithAuthor};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub title: Option<String>,
    pub author_id: Uuid,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationWithAuthor {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub author: AuthorSummary,
}

/// List entry: conversation, its author and the number of live messages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub author: AuthorSummary,
    pub messages_count: i64,
}

/// Single conversation page: live messages in chronological order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub author: AuthorSummary,
    pub messages: Vec<MessageWithAuthor>,
}
