use crate::models::{ProfileUpdate, Role, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    email: String,
    name: String,
    bio: Option<String>,
    image: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
}

/// Insert a user and its password account in one transaction.
/// A duplicate email surfaces as a unique violation.
pub async fn create_user_with_password(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, name)
        VALUES ($1, $2, $3)
        RETURNING id, email, name, bio, image, role, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO accounts (user_id, password_hash) VALUES ($1, $2)")
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, bio, image, role, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Look up a user and its password hash by email (case-insensitive)
pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<(User, String)>, sqlx::Error> {
    let row = sqlx::query_as::<_, CredentialRow>(
        r#"
        SELECT u.id, u.email, u.name, u.bio, u.image, u.role, u.created_at, u.updated_at,
               a.password_hash
        FROM users u
        JOIN accounts a ON a.user_id = u.id
        WHERE LOWER(u.email) = LOWER($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| {
        (
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
            r.password_hash,
        )
    }))
}

/// Apply a partial profile update. Fields absent from `update` keep their value.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            bio = CASE WHEN $3::boolean THEN $4 ELSE bio END,
            image = CASE WHEN $5::boolean THEN $6 ELSE image END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, email, name, bio, image, role, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(update.name.as_deref())
    .bind(update.bio.is_some())
    .bind(update.bio.clone().flatten())
    .bind(update.image.is_some())
    .bind(update.image.clone().flatten())
    .fetch_optional(pool)
    .await
}
