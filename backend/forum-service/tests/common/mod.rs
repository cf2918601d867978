//! Shared fixtures for the HTTP integration tests.
//!
//! `InMemoryRepository` implements the storage traits over plain maps so the
//! real routes, middleware and services run without a database.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use forum_service::db::{
    ConversationRepository, ForumRepository, MessageRepository, PasswordResetRepository,
    SessionRepository, UserRepository,
};
use forum_service::models::{
    AuthorSummary, Conversation, ConversationDetail, ConversationSummary, ConversationWithAuthor,
    Message, MessageWithAuthor, ProfileUpdate, Role, Session, User,
};
use forum_service::security::{generate_token, hash_token};
use forum_service::services::Mailer;
use forum_service::{AppError, AppState, Config, Result};

/// Build the service with the production routes and session middleware
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .wrap(forum_service::middleware::SessionMiddleware::new(
                    $state.clone(),
                ))
                .configure(forum_service::handlers::configure),
        )
        .await
    };
}

struct ResetRow {
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    clock: i64,
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    sessions: HashMap<String, Session>,
    resets: Vec<ResetRow>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

impl Store {
    /// Strictly increasing timestamps so ordering assertions are deterministic
    fn now(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_millis_opt(1_700_000_000_000 + self.clock)
            .single()
            .expect("valid timestamp")
    }

    fn author(&self, user_id: Uuid) -> AuthorSummary {
        self.users
            .get(&user_id)
            .map(AuthorSummary::from)
            .unwrap_or(AuthorSummary {
                id: user_id,
                name: String::new(),
                email: String::new(),
                image: None,
            })
    }

    fn live_message_count(&self, conversation_id: Uuid) -> i64 {
        self.messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.deleted_at.is_none())
            .count() as i64
    }

    fn summary(&self, conversation: &Conversation) -> ConversationSummary {
        ConversationSummary {
            conversation: conversation.clone(),
            author: self.author(conversation.author_id),
            messages_count: self.live_message_count(conversation.id),
        }
    }

    fn with_author(&self, conversation: &Conversation) -> ConversationWithAuthor {
        ConversationWithAuthor {
            conversation: conversation.clone(),
            author: self.author(conversation.author_id),
        }
    }

    fn message_with_author(&self, message: &Message) -> MessageWithAuthor {
        MessageWithAuthor {
            message: message.clone(),
            author: self.author(message.author_id),
        }
    }

    fn live_conversation_mut(&mut self, id: Uuid) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
    }

    fn live_message_mut(&mut self, id: Uuid) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id && m.deleted_at.is_none())
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("store mutex poisoned")
    }

    /// Insert a user directly, bypassing sign-up (no password account)
    pub fn insert_user(&self, name: &str, role: Role) -> User {
        let mut store = self.lock();
        let now = store.now();
        let id = Uuid::new_v4();
        let user = User {
            id,
            email: format!("{}@forum.test", id.simple()),
            name: name.to_string(),
            bio: None,
            image: None,
            role,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(id, user.clone());
        user
    }

    /// Create a live session for a user and return the raw token
    pub fn issue_token(&self, user_id: Uuid) -> String {
        let token = generate_token();
        let mut store = self.lock();
        let created_at = store.now();
        store.sessions.insert(
            hash_token(&token),
            Session {
                id: Uuid::new_v4(),
                user_id,
                expires_at: Utc::now() + Duration::days(1),
                created_at,
            },
        );
        token
    }

    /// Create a session that has already expired
    pub fn issue_expired_token(&self, user_id: Uuid) -> String {
        let token = generate_token();
        let mut store = self.lock();
        let created_at = store.now();
        store.sessions.insert(
            hash_token(&token),
            Session {
                id: Uuid::new_v4(),
                user_id,
                expires_at: Utc::now() - Duration::minutes(1),
                created_at,
            },
        );
        token
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn sessions_for(&self, user_id: Uuid) -> usize {
        self.lock()
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    /// Store a reset token directly, e.g. one that is already expired
    pub fn issue_reset_token(&self, user_id: Uuid, expires_at: DateTime<Utc>) -> String {
        let token = generate_token();
        self.lock().resets.push(ResetRow {
            user_id,
            token_hash: hash_token(&token),
            expires_at,
            used: false,
            created_at: Utc::now(),
        });
        token
    }

    pub fn seed_conversation(&self, author_id: Uuid, title: Option<&str>) -> Conversation {
        let mut store = self.lock();
        let now = store.now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: title.map(str::to_string),
            author_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        store.conversations.push(conversation.clone());
        conversation
    }

    pub fn seed_message(&self, author_id: Uuid, conversation_id: Uuid, content: &str) -> Message {
        let mut store = self.lock();
        let now = store.now();
        let message = Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author_id,
            conversation_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        store.messages.push(message.clone());
        message
    }

    /// Raw rows, including soft-deleted ones
    pub fn raw_conversation(&self, id: Uuid) -> Option<Conversation> {
        self.lock().conversations.iter().find(|c| c.id == id).cloned()
    }

    pub fn raw_message(&self, id: Uuid) -> Option<Message> {
        self.lock().messages.iter().find(|m| m.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let mut store = self.lock();
        if store
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = store.now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            bio: None,
            image: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());
        store.passwords.insert(user.id, password_hash.to_string());
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let store = self.lock();
        Ok(store
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .and_then(|u| {
                store
                    .passwords
                    .get(&u.id)
                    .map(|hash| (u.clone(), hash.clone()))
            }))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(user) = store.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(bio) = &update.bio {
            user.bio = bio.clone();
        }
        if let Some(image) = &update.image {
            user.image = image.clone();
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Session> {
        let mut store = self.lock();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            expires_at,
            created_at: store.now(),
        };
        store
            .sessions
            .insert(token_hash.to_string(), session.clone());
        Ok(session)
    }

    async fn find_session_user(&self, token_hash: &str) -> Result<Option<(Session, User)>> {
        let store = self.lock();
        Ok(store
            .sessions
            .get(token_hash)
            .filter(|s| s.expires_at > Utc::now())
            .and_then(|s| store.users.get(&s.user_id).map(|u| (s.clone(), u.clone()))))
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool> {
        Ok(self.lock().sessions.remove(token_hash).is_some())
    }

    async fn delete_expired_sessions(&self, user_id: Uuid) -> Result<u64> {
        let mut store = self.lock();
        let before = store.sessions.len();
        let now = Utc::now();
        store
            .sessions
            .retain(|_, s| s.user_id != user_id || s.expires_at > now);
        Ok((before - store.sessions.len()) as u64)
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryRepository {
    async fn create_password_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut store = self.lock();
        for row in store.resets.iter_mut().filter(|r| r.user_id == user_id) {
            row.used = true;
        }
        store.resets.push(ResetRow {
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            used: false,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn has_recent_password_reset(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self
            .lock()
            .resets
            .iter()
            .any(|r| r.user_id == user_id && r.created_at > since))
    }

    async fn reset_password(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>> {
        let mut store = self.lock();
        let now = Utc::now();
        let Some(row) = store
            .resets
            .iter_mut()
            .find(|r| r.token_hash == token_hash && !r.used && r.expires_at > now)
        else {
            return Ok(None);
        };
        row.used = true;
        let user_id = row.user_id;

        for row in store.resets.iter_mut().filter(|r| r.user_id == user_id) {
            row.used = true;
        }
        store.passwords.insert(user_id, password_hash.to_string());
        store.sessions.retain(|_, s| s.user_id != user_id);
        Ok(Some(user_id))
    }
}

#[async_trait]
impl ConversationRepository for InMemoryRepository {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let store = self.lock();
        let mut live: Vec<&Conversation> = store
            .conversations
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live.into_iter().map(|c| store.summary(c)).collect())
    }

    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.id == conversation_id && c.deleted_at.is_none())
            .cloned())
    }

    async fn find_conversation_detail(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationDetail>> {
        let store = self.lock();
        let Some(conversation) = store
            .conversations
            .iter()
            .find(|c| c.id == conversation_id && c.deleted_at.is_none())
        else {
            return Ok(None);
        };

        let mut messages: Vec<&Message> = store
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.deleted_at.is_none())
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(Some(ConversationDetail {
            conversation: conversation.clone(),
            author: store.author(conversation.author_id),
            messages: messages
                .into_iter()
                .map(|m| store.message_with_author(m))
                .collect(),
        }))
    }

    async fn create_conversation(
        &self,
        author_id: Uuid,
        title: Option<&str>,
    ) -> Result<ConversationWithAuthor> {
        let mut store = self.lock();
        let now = store.now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: title.map(str::to_string),
            author_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        store.conversations.push(conversation.clone());
        Ok(store.with_author(&conversation))
    }

    async fn update_conversation_title(
        &self,
        conversation_id: Uuid,
        title: Option<Option<&str>>,
    ) -> Result<Option<ConversationWithAuthor>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(conversation) = store.live_conversation_mut(conversation_id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            conversation.title = title.map(str::to_string);
        }
        conversation.updated_at = now;
        let conversation = conversation.clone();
        Ok(Some(store.with_author(&conversation)))
    }

    async fn soft_delete_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(conversation) = store.live_conversation_mut(conversation_id) else {
            return Ok(None);
        };
        conversation.deleted_at = Some(now);
        let conversation = conversation.clone();

        for message in store
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.deleted_at.is_none())
        {
            message.deleted_at = Some(now);
        }
        Ok(Some(conversation))
    }

    async fn count_conversations_by_author(&self, author_id: Uuid) -> Result<i64> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .filter(|c| c.author_id == author_id && c.deleted_at.is_none())
            .count() as i64)
    }

    async fn recent_conversations_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ConversationSummary>> {
        let store = self.lock();
        let mut matching: Vec<&Conversation> = store
            .conversations
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .filter(|c| {
                c.author_id == user_id
                    || store.messages.iter().any(|m| {
                        m.conversation_id == c.id && m.author_id == user_id && m.deleted_at.is_none()
                    })
            })
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(matching
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|c| store.summary(c))
            .collect())
    }
}

#[async_trait]
impl MessageRepository for InMemoryRepository {
    async fn list_messages(&self, conversation_id: Option<Uuid>) -> Result<Vec<MessageWithAuthor>> {
        let store = self.lock();
        let mut live: Vec<&Message> = store
            .messages
            .iter()
            .filter(|m| m.deleted_at.is_none())
            .filter(|m| conversation_id.map_or(true, |id| m.conversation_id == id))
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live
            .into_iter()
            .map(|m| store.message_with_author(m))
            .collect())
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .find(|m| m.id == message_id && m.deleted_at.is_none())
            .cloned())
    }

    async fn create_message(
        &self,
        author_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(conversation) = store.live_conversation_mut(conversation_id) else {
            return Ok(None);
        };
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            author_id,
            conversation_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        store.messages.push(message.clone());
        Ok(Some(store.message_with_author(&message)))
    }

    async fn update_message_content(
        &self,
        message_id: Uuid,
        content: &str,
    ) -> Result<Option<MessageWithAuthor>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(message) = store.live_message_mut(message_id) else {
            return Ok(None);
        };
        message.content = content.to_string();
        message.updated_at = now;
        let message = message.clone();
        Ok(Some(store.message_with_author(&message)))
    }

    async fn soft_delete_message(&self, message_id: Uuid) -> Result<Option<Message>> {
        let mut store = self.lock();
        let now = store.now();
        let Some(message) = store.live_message_mut(message_id) else {
            return Ok(None);
        };
        message.deleted_at = Some(now);
        Ok(Some(message.clone()))
    }

    async fn count_messages_by_author(&self, author_id: Uuid) -> Result<i64> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.author_id == author_id && m.deleted_at.is_none())
            .count() as i64)
    }
}

impl ForumRepository for InMemoryRepository {}

/// Email captured by `RecordingMailer`
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub link: String,
}

/// Keeps outgoing emails in memory instead of sending them
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    /// Token carried by the most recent reset link
    pub fn last_reset_token(&self) -> Option<String> {
        self.sent()
            .last()
            .and_then(|mail| mail.link.split_once("token="))
            .map(|(_, token)| token.to_string())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(
        &self,
        recipient: &str,
        link: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(SentEmail {
                recipient: recipient.to_string(),
                link: link.to_string(),
            });
        Ok(())
    }
}

/// Fresh state backed by an empty in-memory store
pub fn test_state() -> (AppState, Arc<InMemoryRepository>) {
    let (state, repo, _mailer) = test_state_with_mailer();
    (state, repo)
}

pub fn test_state_with_mailer() -> (AppState, Arc<InMemoryRepository>, Arc<RecordingMailer>) {
    let repo = Arc::new(InMemoryRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(repo.clone(), mailer.clone(), Config::default());
    (state, repo, mailer)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
