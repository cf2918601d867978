use std::sync::Arc;

use crate::config::Config;
use crate::db::ForumRepository;
use crate::services::{AuthService, ConversationService, Mailer, MessageService, UserService};

/// Shared application state, cloned into every worker
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ForumRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ForumRepository>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        Self {
            repo,
            mailer,
            config: Arc::new(config),
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.config.session.clone(),
            self.config.mail.app_url.clone(),
        )
    }

    pub fn conversations(&self) -> ConversationService {
        ConversationService::new(self.repo.clone(), self.config.limits)
    }

    pub fn messages(&self) -> MessageService {
        MessageService::new(self.repo.clone(), self.config.limits)
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.repo.clone())
    }
}
