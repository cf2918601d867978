/// Service layer for forum-service
///
/// Services own the business rules: input normalization, the authorization
/// decision for every mutation, and the calls into the repository.
use uuid::Uuid;

use crate::error::Result;
use crate::metrics;
use crate::middleware::permissions::{authorize, Action, Owned, Requester, ResourceKind};

pub mod auth;
pub mod conversations;
pub mod email;
pub mod messages;
pub mod users;
pub mod validation;

pub use auth::{AuthService, IssuedSession};
pub use email::{Mailer, SmtpMailer};
pub use conversations::ConversationService;
pub use messages::MessageService;
pub use users::UserService;

/// Run the authorization decision, record it and log denials
pub(crate) fn enforce(
    requester: Option<&Requester>,
    kind: ResourceKind,
    resource_id: Uuid,
    resource: Option<&Owned>,
    action: Action,
) -> Result<()> {
    let outcome = authorize(requester, kind, resource, action);
    metrics::record_authz(kind, action, &outcome);

    if let Err(reason) = &outcome {
        tracing::warn!(
            user_id = ?requester.map(|r| r.user_id),
            resource = %kind,
            resource_id = %resource_id,
            action = %action,
            reason = %reason,
            "authorization denied"
        );
    }

    Ok(outcome?)
}
