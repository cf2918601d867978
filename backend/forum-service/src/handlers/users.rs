/// User handlers - own profile edits, public profiles and stats
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// PATCH /api/profile - always targets the signed-in user
pub async fn update_profile(
    user: CurrentUser,
    state: web::Data<AppState>,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let updated = state
        .users()
        .update_profile(
            &user.requester(),
            req.name.as_deref(),
            req.bio.as_deref(),
            req.image.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

pub async fn get_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = state.users().get_profile(*user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn get_user_stats(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let stats = state.users().stats(*user_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}
