/// Conversation handlers - HTTP endpoints for conversation operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
}

/// An absent `title` keeps the current one; `null` or blank clears it
#[derive(Debug, Deserialize)]
pub struct UpdateConversationRequest {
    #[serde(default, deserialize_with = "super::present")]
    pub title: Option<Option<String>>,
}

/// List live conversations, newest first
pub async fn list_conversations(state: web::Data<AppState>) -> Result<HttpResponse> {
    let conversations = state.conversations().list().await?;
    Ok(HttpResponse::Ok().json(conversations))
}

pub async fn create_conversation(
    user: CurrentUser,
    state: web::Data<AppState>,
    req: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse> {
    let conversation = state
        .conversations()
        .create(Some(&user.requester()), req.title.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(conversation))
}

/// Get a conversation with its messages
pub async fn get_conversation(
    state: web::Data<AppState>,
    conversation_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let conversation = state.conversations().get(*conversation_id).await?;
    Ok(HttpResponse::Ok().json(conversation))
}

/// Edit the title (author only)
pub async fn update_conversation(
    user: CurrentUser,
    state: web::Data<AppState>,
    conversation_id: web::Path<Uuid>,
    req: web::Json<UpdateConversationRequest>,
) -> Result<HttpResponse> {
    let conversation = state
        .conversations()
        .update_title(
            Some(&user.requester()),
            *conversation_id,
            req.title.as_ref().map(Option::as_deref),
        )
        .await?;

    Ok(HttpResponse::Ok().json(conversation))
}

/// Soft delete (author or admin)
pub async fn delete_conversation(
    user: CurrentUser,
    state: web::Data<AppState>,
    conversation_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let conversation = state
        .conversations()
        .delete(Some(&user.requester()), *conversation_id)
        .await?;

    Ok(HttpResponse::Ok().json(conversation))
}
