use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{conversation_repo, message_repo, password_reset_repo, session_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{
    Conversation, ConversationDetail, ConversationSummary, ConversationWithAuthor, Message,
    MessageWithAuthor, ProfileUpdate, Session, User,
};

/// Users and their password credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user with a password account.
    /// Returns `AppError::Conflict` if the email is already registered.
    async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User>;

    /// User and stored password hash for an email (case-insensitive)
    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session>;

    /// Unexpired session for a token hash, with its user
    async fn find_session_user(&self, token_hash: &str) -> Result<Option<(Session, User)>>;

    async fn delete_session(&self, token_hash: &str) -> Result<bool>;

    /// Purge a user's expired sessions, returning how many went away
    async fn delete_expired_sessions(&self, user_id: Uuid) -> Result<u64>;
}

/// Single-use password reset tokens, stored by SHA-256 hash
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store a token hash, retiring the user's earlier unused tokens
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn has_recent_password_reset(&self, user_id: Uuid, since: DateTime<Utc>)
        -> Result<bool>;

    /// Atomically redeem the token, replace the password hash and revoke
    /// every session of the user. `None` when the token is not redeemable.
    async fn reset_password(&self, token_hash: &str, password_hash: &str)
        -> Result<Option<Uuid>>;
}

/// Conversation storage. Every read and write ignores soft-deleted rows.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>>;

    async fn find_conversation_detail(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationDetail>>;

    async fn create_conversation(
        &self,
        author_id: Uuid,
        title: Option<&str>,
    ) -> Result<ConversationWithAuthor>;

    /// `title: None` keeps the current title, `Some(None)` clears it
    async fn update_conversation_title(
        &self,
        conversation_id: Uuid,
        title: Option<Option<&str>>,
    ) -> Result<Option<ConversationWithAuthor>>;

    /// Soft delete the conversation and all of its messages atomically
    async fn soft_delete_conversation(&self, conversation_id: Uuid)
        -> Result<Option<Conversation>>;

    async fn count_conversations_by_author(&self, author_id: Uuid) -> Result<i64>;

    async fn recent_conversations_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConversationSummary>>;
}

/// Message storage. Every read and write ignores soft-deleted rows.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn list_messages(&self, conversation_id: Option<Uuid>) -> Result<Vec<MessageWithAuthor>>;

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>>;

    /// Returns `None` when the target conversation is absent or deleted
    async fn create_message(
        &self,
        author_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>>;

    async fn update_message_content(
        &self,
        message_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>>;

    async fn soft_delete_message(&self, message_id: Uuid) -> Result<Option<Message>>;

    async fn count_messages_by_author(&self, author_id: Uuid) -> Result<i64>;
}

/// Everything the forum needs from storage
#[async_trait]
pub trait ForumRepository:
    UserRepository
    + SessionRepository
    + PasswordResetRepository
    + ConversationRepository
    + MessageRepository
{
    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgForumRepository {
    async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        user_repo::create_user_with_password(&self.pool, email, name, password_hash)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return AppError::Conflict(
                            "An account with this email already exists".to_string(),
                        );
                    }
                }
                e.into()
            })
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        Ok(user_repo::find_credentials_by_email(&self.pool, email).await?)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(user_repo::find_user_by_id(&self.pool, user_id).await?)
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>> {
        Ok(user_repo::update_profile(&self.pool, user_id, update).await?)
    }
}

#[async_trait]
impl SessionRepository for PgForumRepository {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        Ok(session_repo::create_session(&self.pool, user_id, token_hash, expires_at).await?)
    }

    async fn find_session_user(&self, token_hash: &str) -> Result<Option<(Session, User)>> {
        Ok(session_repo::find_session_user(&self.pool, token_hash).await?)
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool> {
        Ok(session_repo::delete_session(&self.pool, token_hash).await?)
    }

    async fn delete_expired_sessions(&self, user_id: Uuid) -> Result<u64> {
        Ok(session_repo::delete_expired_sessions(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl PasswordResetRepository for PgForumRepository {
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        Ok(
            password_reset_repo::create_reset_token(&self.pool, user_id, token_hash, expires_at)
                .await?,
        )
    }

    async fn has_recent_password_reset(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(password_reset_repo::has_recent_request(&self.pool, user_id, since).await?)
    }

    async fn reset_password(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>> {
        Ok(password_reset_repo::reset_password(&self.pool, token_hash, password_hash).await?)
    }
}

#[async_trait]
impl ConversationRepository for PgForumRepository {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        Ok(conversation_repo::list_conversations(&self.pool).await?)
    }

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        Ok(conversation_repo::find_conversation_by_id(&self.pool, conversation_id).await?)
    }

    async fn find_conversation_detail(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationDetail>> {
        let Some(head) =
            conversation_repo::find_conversation_with_author(&self.pool, conversation_id).await?
        else {
            return Ok(None);
        };
        let messages = message_repo::list_conversation_thread(&self.pool, conversation_id).await?;

        Ok(Some(ConversationDetail {
            conversation: head.conversation,
            author: head.author,
            messages,
        }))
    }

    async fn create_conversation(
        &self,
        author_id: Uuid,
        title: Option<&str>,
    ) -> Result<ConversationWithAuthor> {
        Ok(conversation_repo::create_conversation(&self.pool, author_id, title).await?)
    }

    async fn update_conversation_title(
        &self,
        conversation_id: Uuid,
        title: Option<Option<&str>>,
    ) -> Result<Option<ConversationWithAuthor>> {
        Ok(
            conversation_repo::update_conversation_title(&self.pool, conversation_id, title)
                .await?,
        )
    }

    async fn soft_delete_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>> {
        Ok(conversation_repo::soft_delete_conversation(&self.pool, conversation_id).await?)
    }

    async fn count_conversations_by_author(&self, author_id: Uuid) -> Result<i64> {
        Ok(conversation_repo::count_conversations_by_author(&self.pool, author_id).await?)
    }

    async fn recent_conversations_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConversationSummary>> {
        Ok(conversation_repo::recent_conversations_for_user(&self.pool, user_id, limit).await?)
    }
}

#[async_trait]
impl MessageRepository for PgForumRepository {
    async fn list_messages(&self, conversation_id: Option<Uuid>) -> Result<Vec<MessageWithAuthor>> {
        Ok(message_repo::list_messages(&self.pool, conversation_id).await?)
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>> {
        Ok(message_repo::find_message_by_id(&self.pool, message_id).await?)
    }

    async fn create_message(
        &self,
        author_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>> {
        Ok(message_repo::create_message(&self.pool, author_id, conversation_id, content).await?)
    }

    async fn update_message_content(
        &self,
        message_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>> {
        Ok(message_repo::update_message_content(&self.pool, message_id, content).await?)
    }

    async fn soft_delete_message(&self, message_id: Uuid) -> Result<Option<Message>> {
        Ok(message_repo::soft_delete_message(&self.pool, message_id).await?)
    }

    async fn count_messages_by_author(&self, author_id: Uuid) -> Result<i64> {
        Ok(message_repo::count_messages_by_author(&self.pool, author_id).await?)
    }
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
