/// User service - public profiles, activity stats, and self-service profile edits
use std::sync::Arc;
use uuid::Uuid;

use super::validation;
use crate::db::ForumRepository;
use crate::error::{AppError, Result};
use crate::middleware::permissions::Requester;
use crate::models::{User, UserStats};

/// How many conversations the stats page lists
pub const RECENT_CONVERSATIONS_LIMIT: i64 = 10;

pub struct UserService {
    repo: Arc<dyn ForumRepository>,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

impl UserService {
    pub fn new(repo: Arc<dyn ForumRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User> {
        self.repo.find_user(user_id).await?.ok_or_else(user_not_found)
    }

    pub async fn stats(&self, user_id: Uuid) -> Result<UserStats> {
        if self.repo.find_user(user_id).await?.is_none() {
            return Err(user_not_found());
        }

        let conversations_count = self.repo.count_conversations_by_author(user_id).await?;
        let messages_count = self.repo.count_messages_by_author(user_id).await?;
        let recent_conversations = self
            .repo
            .recent_conversations_for_user(user_id, RECENT_CONVERSATIONS_LIMIT)
            .await?;

        Ok(UserStats {
            conversations_count,
            messages_count,
            recent_conversations,
        })
    }

    /// Update the caller's own profile. There is no way to target another user.
    pub async fn update_profile(
        &self,
        requester: &Requester,
        name: Option<&str>,
        bio: Option<&str>,
        image: Option<&str>,
    ) -> Result<User> {
        let update = validation::normalize_profile(name, bio, image)?;
        if update.is_empty() {
            return self.get_profile(requester.user_id).await;
        }

        let user = self
            .repo
            .update_profile(requester.user_id, &update)
            .await?
            .ok_or_else(user_not_found)?;

        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}
