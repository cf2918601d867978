/// Message handlers - HTTP endpoints for message operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub content: String,
    pub conversation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub content: String,
}

pub async fn list_messages(
    state: web::Data<AppState>,
    query: web::Query<ListMessagesQuery>,
) -> Result<HttpResponse> {
    let messages = state.messages().list(query.conversation_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn create_message(
    user: CurrentUser,
    state: web::Data<AppState>,
    req: web::Json<CreateMessageRequest>,
) -> Result<HttpResponse> {
    let message = state
        .messages()
        .create(Some(&user.requester()), req.conversation_id, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(message))
}

/// Edit content (author only)
pub async fn update_message(
    user: CurrentUser,
    state: web::Data<AppState>,
    message_id: web::Path<Uuid>,
    req: web::Json<UpdateMessageRequest>,
) -> Result<HttpResponse> {
    let message = state
        .messages()
        .update(Some(&user.requester()), *message_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(message))
}

/// Soft delete (author, moderator or admin)
pub async fn delete_message(
    user: CurrentUser,
    state: web::Data<AppState>,
    message_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let message = state
        .messages()
        .delete(Some(&user.requester()), *message_id)
        .await?;

    Ok(HttpResponse::Ok().json(message))
}
