/// Message service - posting, and owner/moderator-gated mutation
use std::sync::Arc;
use uuid::Uuid;

use super::{enforce, validation};
use crate::config::LimitsConfig;
use crate::db::ForumRepository;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Action, AuthzError, Owned, Requester, ResourceKind};
use crate::models::{Message, MessageWithAuthor};

pub struct MessageService {
    repo: Arc<dyn ForumRepository>,
    limits: LimitsConfig,
}

fn owned(message: &Message) -> Owned {
    Owned {
        kind: ResourceKind::Message,
        id: message.id,
        author_id: message.author_id,
    }
}

fn message_not_found() -> AppError {
    AuthzError::NotFound(ResourceKind::Message).into()
}

impl MessageService {
    pub fn new(repo: Arc<dyn ForumRepository>, limits: LimitsConfig) -> Self {
        Self { repo, limits }
    }

    /// Live messages, newest first
    pub async fn list(&self, conversation_id: Option<Uuid>) -> Result<Vec<MessageWithAuthor>> {
        self.repo.list_messages(conversation_id).await
    }

    pub async fn create(
        &self,
        requester: Option<&Requester>,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<MessageWithAuthor> {
        let requester = requester.ok_or(AuthzError::Unauthenticated)?;
        let content = validation::normalize_content(content, self.limits.max_message_length)?;

        let created = self
            .repo
            .create_message(requester.user_id, conversation_id, &content)
            .await?
            .ok_or_else(|| AppError::from(AuthzError::NotFound(ResourceKind::Conversation)))?;

        tracing::info!(
            user_id = %requester.user_id,
            conversation_id = %conversation_id,
            message_id = %created.message.id,
            "message posted"
        );
        Ok(created)
    }

    /// Owner-only content edit
    pub async fn update(
        &self,
        requester: Option<&Requester>,
        message_id: Uuid,
        content: &str,
    ) -> Result<MessageWithAuthor> {
        self.authorize(requester, message_id, Action::Update).await?;
        let content = validation::normalize_content(content, self.limits.max_message_length)?;

        let updated = self
            .repo
            .update_message_content(message_id, &content)
            .await?
            .ok_or_else(message_not_found)?;

        tracing::info!(message_id = %message_id, "message updated");
        Ok(updated)
    }

    /// Soft delete by the owner, a moderator or an admin
    pub async fn delete(&self, requester: Option<&Requester>, message_id: Uuid) -> Result<Message> {
        let requester = self.authorize(requester, message_id, Action::Delete).await?;

        let deleted = self
            .repo
            .soft_delete_message(message_id)
            .await?
            .ok_or_else(message_not_found)?;

        tracing::info!(
            user_id = %requester.user_id,
            role = %requester.role,
            message_id = %message_id,
            author_id = %deleted.author_id,
            "message deleted"
        );
        Ok(deleted)
    }

    async fn authorize(
        &self,
        requester: Option<&Requester>,
        message_id: Uuid,
        action: Action,
    ) -> Result<Requester> {
        let existing = match requester {
            Some(_) => self.repo.find_message(message_id).await?,
            None => None,
        };

        enforce(
            requester,
            ResourceKind::Message,
            message_id,
            existing.as_ref().map(owned).as_ref(),
            action,
        )?;

        requester
            .copied()
            .ok_or_else(|| AuthzError::Unauthenticated.into())
    }
}
