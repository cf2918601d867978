/// Data models for forum-service
///
/// This module defines structures for:
/// - User / Role: forum members and their moderation role
/// - Session: server-side login sessions
/// - Conversation: discussion threads owned by their author
/// - Message: posts inside a conversation
mod conversation;
mod message;
mod role;
mod session;
mod user;

pub use conversation::{
    Conversation, ConversationDetail, ConversationSummary, ConversationWithAuthor,
};
pub use message::{Message, MessageWithAuthor};
pub use role::Role;
pub use session::Session;
pub use user::{AuthorSummary, ProfileUpdate, User, UserStats};
