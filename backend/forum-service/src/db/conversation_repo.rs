use crate::models::{
    AuthorSummary, Conversation, ConversationSummary, ConversationWithAuthor,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Conversation joined with its author (and optionally a live message count)
#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    title: Option<String>,
    author_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    author_email: String,
    author_image: Option<String>,
    #[sqlx(default)]
    messages_count: Option<i64>,
}

impl ConversationRow {
    fn split(self) -> (Conversation, AuthorSummary, i64) {
        let author = AuthorSummary {
            id: self.author_id,
            name: self.author_name,
            email: self.author_email,
            image: self.author_image,
        };
        let conversation = Conversation {
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (conversation, author, self.messages_count.unwrap_or(0))
    }

    fn into_with_author(self) -> ConversationWithAuthor {
        let (conversation, author, _) = self.split();
        ConversationWithAuthor {
            conversation,
            author,
        }
    }

    fn into_summary(self) -> ConversationSummary {
        let (conversation, author, messages_count) = self.split();
        ConversationSummary {
            conversation,
            author,
            messages_count,
        }
    }
}

/// List live conversations, newest first, with author and live message count
pub async fn list_conversations(pool: &PgPool) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT c.id, c.title, c.author_id, c.deleted_at, c.created_at, c.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image,
               (SELECT COUNT(*) FROM messages m
                WHERE m.conversation_id = c.id AND m.deleted_at IS NULL) AS messages_count
        FROM conversations c
        JOIN users u ON u.id = c.author_id
        WHERE c.deleted_at IS NULL
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ConversationRow::into_summary).collect())
}

/// Find a conversation by ID (excluding soft-deleted conversations)
pub async fn find_conversation_by_id(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Option<Conversation>, sqlx::Error> {
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, title, author_id, deleted_at, created_at, updated_at
        FROM conversations
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_conversation_with_author(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Option<ConversationWithAuthor>, sqlx::Error> {
    let row = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT c.id, c.title, c.author_id, c.deleted_at, c.created_at, c.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM conversations c
        JOIN users u ON u.id = c.author_id
        WHERE c.id = $1 AND c.deleted_at IS NULL
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ConversationRow::into_with_author))
}

pub async fn create_conversation(
    pool: &PgPool,
    author_id: Uuid,
    title: Option<&str>,
) -> Result<ConversationWithAuthor, sqlx::Error> {
    let row = sqlx::query_as::<_, ConversationRow>(
        r#"
        WITH inserted AS (
            INSERT INTO conversations (id, title, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, author_id, deleted_at, created_at, updated_at
        )
        SELECT c.id, c.title, c.author_id, c.deleted_at, c.created_at, c.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM inserted c
        JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(row.into_with_author())
}

/// Edit a live conversation. `title: None` keeps the current title,
/// `Some(None)` clears it. Author is never touched.
pub async fn update_conversation_title(
    pool: &PgPool,
    conversation_id: Uuid,
    title: Option<Option<&str>>,
) -> Result<Option<ConversationWithAuthor>, sqlx::Error> {
    let row = sqlx::query_as::<_, ConversationRow>(
        r#"
        WITH updated AS (
            UPDATE conversations
            SET title = CASE WHEN $3::boolean THEN $2 ELSE title END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, author_id, deleted_at, created_at, updated_at
        )
        SELECT c.id, c.title, c.author_id, c.deleted_at, c.created_at, c.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM updated c
        JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(conversation_id)
    .bind(title.flatten())
    .bind(title.is_some())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ConversationRow::into_with_author))
}

/// Soft delete a conversation together with its live messages.
/// Returns `None` if the conversation was absent or already deleted.
pub async fn soft_delete_conversation(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Option<Conversation>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query_as::<_, Conversation>(
        r#"
        UPDATE conversations
        SET deleted_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, title, author_id, deleted_at, created_at, updated_at
        "#,
    )
    .bind(conversation_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(conversation) = deleted else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query(
        r#"
        UPDATE messages
        SET deleted_at = $2
        WHERE conversation_id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(conversation_id)
    .bind(conversation.deleted_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(conversation))
}

pub async fn count_conversations_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM conversations WHERE author_id = $1 AND deleted_at IS NULL",
    )
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Live conversations a user started or posted in, most recently updated first
pub async fn recent_conversations_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT c.id, c.title, c.author_id, c.deleted_at, c.created_at, c.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image,
               (SELECT COUNT(*) FROM messages m
                WHERE m.conversation_id = c.id AND m.deleted_at IS NULL) AS messages_count
        FROM conversations c
        JOIN users u ON u.id = c.author_id
        WHERE c.deleted_at IS NULL
          AND (
              c.author_id = $1
              OR EXISTS (
                  SELECT 1 FROM messages m
                  WHERE m.conversation_id = c.id
                    AND m.author_id = $1
                    AND m.deleted_at IS NULL
              )
          )
        ORDER BY c.updated_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ConversationRow::into_summary).collect())
}
