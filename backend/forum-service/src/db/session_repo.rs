use crate::models::{Role, Session, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct SessionUserRow {
    session_id: Uuid,
    expires_at: DateTime<Utc>,
    session_created_at: DateTime<Utc>,
    id: Uuid,
    email: String,
    name: String,
    bio: Option<String>,
    image: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, expires_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Resolve an unexpired session and its user from the token hash
pub async fn find_session_user(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<(Session, User)>, sqlx::Error> {
    let row = sqlx::query_as::<_, SessionUserRow>(
        r#"
        SELECT s.id AS session_id, s.expires_at, s.created_at AS session_created_at,
               u.id, u.email, u.name, u.bio, u.image, u.role, u.created_at, u.updated_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| {
        (
            Session {
                id: r.session_id,
                user_id: r.id,
                expires_at: r.expires_at,
                created_at: r.session_created_at,
            },
            User {
                id: r.id,
                email: r.email,
                name: r.name,
                bio: r.bio,
                image: r.image,
                role: r.role,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        )
    }))
}

/// Remove a user's expired sessions. Returns how many were purged.
pub async fn delete_expired_sessions(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= NOW()")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Returns true if a session was removed
pub async fn delete_session(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
