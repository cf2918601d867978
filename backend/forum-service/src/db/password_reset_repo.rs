/// Password reset token storage
///
/// Tokens are single use: redeeming one marks it used, replaces the
/// account password and revokes every session of the user in one transaction.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Store a new reset token, retiring any unused ones for the same user
pub async fn create_reset_token(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE password_resets
        SET is_used = TRUE, used_at = NOW()
        WHERE user_id = $1 AND is_used = FALSE
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO password_resets (id, user_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Whether the user asked for a reset after `since`
pub async fn has_recent_request(
    pool: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM password_resets WHERE user_id = $1 AND created_at > $2)",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(pool)
    .await
}

/// Redeem a live token and set the new password hash.
/// Returns the user id, or `None` if the token is unknown, used or expired.
pub async fn reset_password(
    pool: &PgPool,
    token_hash: &str,
    password_hash: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let redeemed = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE password_resets
        SET is_used = TRUE, used_at = NOW()
        WHERE token_hash = $1 AND is_used = FALSE AND expires_at > NOW()
        RETURNING user_id
        "#,
    )
    .bind(token_hash)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = redeemed else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        UPDATE password_resets
        SET is_used = TRUE, used_at = NOW()
        WHERE user_id = $1 AND is_used = FALSE
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(user_id))
}
