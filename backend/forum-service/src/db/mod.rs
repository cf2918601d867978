pub mod conversation_repo;
pub mod message_repo;
pub mod password_reset_repo;
pub mod repository;
pub mod session_repo;
pub mod user_repo;

pub use repository::{
    ConversationRepository, ForumRepository, MessageRepository, PasswordResetRepository,
    PgForumRepository, SessionRepository, UserRepository,
};

/// Embedded schema migrations, applied at startup
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
