/// Conversation service - listing, creation, and owner/admin-gated mutation
use std::sync::Arc;
use uuid::Uuid;

use super::{enforce, validation};
use crate::config::LimitsConfig;
use crate::db::ForumRepository;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{Action, AuthzError, Owned, Requester, ResourceKind};
use crate::models::{Conversation, ConversationDetail, ConversationSummary, ConversationWithAuthor};

pub struct ConversationService {
    repo: Arc<dyn ForumRepository>,
    limits: LimitsConfig,
}

fn owned(conversation: &Conversation) -> Owned {
    Owned {
        kind: ResourceKind::Conversation,
        id: conversation.id,
        author_id: conversation.author_id,
    }
}

impl ConversationService {
    pub fn new(repo: Arc<dyn ForumRepository>, limits: LimitsConfig) -> Self {
        Self { repo, limits }
    }

    /// Live conversations, newest first
    pub async fn list(&self) -> Result<Vec<ConversationSummary>> {
        self.repo.list_conversations().await
    }

    pub async fn get(&self, conversation_id: Uuid) -> Result<ConversationDetail> {
        self.repo
            .find_conversation_detail(conversation_id)
            .await?
            .ok_or_else(|| AuthzError::NotFound(ResourceKind::Conversation).into())
    }

    pub async fn create(
        &self,
        requester: Option<&Requester>,
        title: Option<&str>,
    ) -> Result<ConversationWithAuthor> {
        let requester = requester.ok_or(AuthzError::Unauthenticated)?;
        let title = validation::normalize_title(title, self.limits.max_title_length)?;

        let created = self
            .repo
            .create_conversation(requester.user_id, title.as_deref())
            .await?;

        tracing::info!(
            user_id = %requester.user_id,
            conversation_id = %created.conversation.id,
            "conversation created"
        );
        Ok(created)
    }

    /// Owner-only title edit. `None` leaves the title as it is; a present
    /// but blank or null title clears it.
    pub async fn update_title(
        &self,
        requester: Option<&Requester>,
        conversation_id: Uuid,
        title: Option<Option<&str>>,
    ) -> Result<ConversationWithAuthor> {
        self.authorize(requester, conversation_id, Action::Update)
            .await?;
        let title = title
            .map(|t| validation::normalize_title(t, self.limits.max_title_length))
            .transpose()?;

        let updated = self
            .repo
            .update_conversation_title(conversation_id, title.as_ref().map(Option::as_deref))
            .await?
            .ok_or_else(|| AppError::from(AuthzError::NotFound(ResourceKind::Conversation)))?;

        tracing::info!(conversation_id = %conversation_id, "conversation updated");
        Ok(updated)
    }

    /// Soft delete by the owner or an admin. Messages go with it.
    pub async fn delete(
        &self,
        requester: Option<&Requester>,
        conversation_id: Uuid,
    ) -> Result<Conversation> {
        let requester = self
            .authorize(requester, conversation_id, Action::Delete)
            .await?;

        let deleted = self
            .repo
            .soft_delete_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::from(AuthzError::NotFound(ResourceKind::Conversation)))?;

        tracing::info!(
            user_id = %requester.user_id,
            role = %requester.role,
            conversation_id = %conversation_id,
            author_id = %deleted.author_id,
            "conversation deleted"
        );
        Ok(deleted)
    }

    /// Storage is not consulted for anonymous callers.
    async fn authorize(
        &self,
        requester: Option<&Requester>,
        conversation_id: Uuid,
        action: Action,
    ) -> Result<Requester> {
        let existing = match requester {
            Some(_) => self.repo.find_conversation(conversation_id).await?,
            None => None,
        };

        enforce(
            requester,
            ResourceKind::Conversation,
            conversation_id,
            existing.as_ref().map(owned).as_ref(),
            action,
        )?;

        requester
            .copied()
            .ok_or_else(|| AuthzError::Unauthenticated.into())
    }
}
