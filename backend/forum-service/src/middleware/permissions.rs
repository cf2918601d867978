/// Authorization module for forum-service
///
/// Decides whether a requester may update or delete a conversation or a
/// message. Owners can always edit and delete their own content; moderators
/// can delete any message and admins can delete any message or conversation.
/// Nobody edits content they did not write.
///
/// Everything here is pure: no I/O, no web framework types.
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Conversation,
    Message,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller, as far as authorization cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: Uuid,
    pub role: Role,
}

impl From<&User> for Requester {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// A live (not soft-deleted) resource with an author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owned {
    pub kind: ResourceKind,
    pub id: Uuid,
    pub author_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("The {0} does not exist")]
    NotFound(ResourceKind),

    #[error("You don't have permission to {action} this {kind}")]
    Forbidden { kind: ResourceKind, action: Action },
}

pub fn is_admin(role: Role) -> bool {
    role == Role::Admin
}

pub fn is_moderator(role: Role) -> bool {
    role == Role::Moderator
}

pub fn is_moderator_or_admin(role: Role) -> bool {
    is_moderator(role) || is_admin(role)
}

/// Moderators and admins may delete any message
pub fn can_delete_message(role: Role) -> bool {
    is_moderator_or_admin(role)
}

/// Only admins may delete conversations they did not start
pub fn can_delete_any_conversation(role: Role) -> bool {
    is_admin(role)
}

pub fn is_owner(requester_id: Uuid, author_id: Uuid) -> bool {
    requester_id == author_id
}

/// Whether `role` alone grants `action` on someone else's `kind`
pub fn role_grants(kind: ResourceKind, action: Action, role: Role) -> bool {
    match (kind, action) {
        (ResourceKind::Conversation, Action::Delete) => can_delete_any_conversation(role),
        (ResourceKind::Message, Action::Delete) => can_delete_message(role),
        (_, Action::Update) => false,
    }
}

/// Single authorization decision for a mutating operation.
///
/// Order matters: an anonymous caller gets `Unauthenticated` even for ids
/// that do not exist, and a missing resource is `NotFound` for every role.
pub fn authorize(
    requester: Option<&Requester>,
    kind: ResourceKind,
    resource: Option<&Owned>,
    action: Action,
) -> Result<(), AuthzError> {
    let requester = requester.ok_or(AuthzError::Unauthenticated)?;
    let resource = resource.ok_or(AuthzError::NotFound(kind))?;

    if is_owner(requester.user_id, resource.author_id)
        || role_grants(resource.kind, action, requester.role)
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            kind: resource.kind,
            action,
        })
    }
}
