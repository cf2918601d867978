use crate::models::{AuthorSummary, Message, MessageWithAuthor};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    content: String,
    author_id: Uuid,
    conversation_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    author_email: String,
    author_image: Option<String>,
}

impl From<MessageRow> for MessageWithAuthor {
    fn from(row: MessageRow) -> Self {
        MessageWithAuthor {
            author: AuthorSummary {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
                image: row.author_image,
            },
            message: Message {
                id: row.id,
                content: row.content,
                author_id: row.author_id,
                conversation_id: row.conversation_id,
                deleted_at: row.deleted_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Live messages, newest first, optionally restricted to one conversation
pub async fn list_messages(
    pool: &PgPool,
    conversation_id: Option<Uuid>,
) -> Result<Vec<MessageWithAuthor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.content, m.author_id, m.conversation_id, m.deleted_at,
               m.created_at, m.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM messages m
        JOIN users u ON u.id = m.author_id
        WHERE m.deleted_at IS NULL
          AND ($1::uuid IS NULL OR m.conversation_id = $1)
        ORDER BY m.created_at DESC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Live messages of a conversation in chronological order
pub async fn list_conversation_thread(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Vec<MessageWithAuthor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.content, m.author_id, m.conversation_id, m.deleted_at,
               m.created_at, m.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM messages m
        JOIN users u ON u.id = m.author_id
        WHERE m.conversation_id = $1 AND m.deleted_at IS NULL
        ORDER BY m.created_at ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Find a message by ID (excluding soft-deleted messages)
pub async fn find_message_by_id(
    pool: &PgPool,
    message_id: Uuid,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, content, author_id, conversation_id, deleted_at, created_at, updated_at
        FROM messages
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await
}

/// Post a message into a live conversation and bump the conversation's
/// `updated_at`. Returns `None` if the conversation is absent or deleted.
pub async fn create_message(
    pool: &PgPool,
    author_id: Uuid,
    conversation_id: Uuid,
    content: &str,
) -> Result<Option<MessageWithAuthor>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Row lock keeps a concurrent conversation delete from orphaning the message
    let live = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM conversations WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(conversation_id)
    .fetch_optional(&mut *tx)
    .await?;

    if live.is_none() {
        tx.rollback().await?;
        return Ok(None);
    }

    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        WITH inserted AS (
            INSERT INTO messages (id, content, author_id, conversation_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, content, author_id, conversation_id, deleted_at, created_at, updated_at
        )
        SELECT m.id, m.content, m.author_id, m.conversation_id, m.deleted_at,
               m.created_at, m.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM inserted m
        JOIN users u ON u.id = m.author_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(content)
    .bind(author_id)
    .bind(conversation_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(row.into()))
}

/// Replace the content of a live message. Author is never touched.
pub async fn update_message_content(
    pool: &PgPool,
    message_id: Uuid,
    content: &str,
) -> Result<Option<MessageWithAuthor>, sqlx::Error> {
    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        WITH updated AS (
            UPDATE messages
            SET content = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, content, author_id, conversation_id, deleted_at, created_at, updated_at
        )
        SELECT m.id, m.content, m.author_id, m.conversation_id, m.deleted_at,
               m.created_at, m.updated_at,
               u.name AS author_name, u.email AS author_email, u.image AS author_image
        FROM updated m
        JOIN users u ON u.id = m.author_id
        "#,
    )
    .bind(message_id)
    .bind(content)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Into::into))
}

pub async fn soft_delete_message(
    pool: &PgPool,
    message_id: Uuid,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages
        SET deleted_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, content, author_id, conversation_id, deleted_at, created_at, updated_at
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_messages_by_author(pool: &PgPool, author_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM messages WHERE author_id = $1 AND deleted_at IS NULL",
    )
    .bind(author_id)
    .fetch_one(pool)
    .await
}
