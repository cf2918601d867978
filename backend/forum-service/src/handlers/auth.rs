/// Auth handlers - sign-up, sign-in, sign-out, the current session and password resets
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::middleware::{session_token, CurrentUser};
use crate::models::User;
use crate::services::IssuedSession;
use crate::state::AppState;

/// The email is checked after trimming, in the service
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgetPasswordRequest {
    pub email: String,
    /// Client path that receives the token, e.g. `/reset-password`
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub new_password: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
}

fn session_cookie(config: &SessionConfig, session: &IssuedSession) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), session.token.clone())
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::days(config.ttl_days))
        .finish()
}

fn expired_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

/// Register an account and start a session
pub async fn sign_up(
    state: web::Data<AppState>,
    req: web::Json<SignUpRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let (user, session) = state
        .auth()
        .sign_up(&req.email, &req.name, &req.password)
        .await?;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(&state.config.session, &session))
        .json(AuthResponse {
            user,
            token: session.token,
            expires_at: session.expires_at,
        }))
}

pub async fn sign_in(
    state: web::Data<AppState>,
    req: web::Json<SignInRequest>,
) -> Result<HttpResponse> {
    let (user, session) = state.auth().sign_in(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.config.session, &session))
        .json(AuthResponse {
            user,
            token: session.token,
            expires_at: session.expires_at,
        }))
}

/// End the current session and expire the cookie
pub async fn sign_out(state: web::Data<AppState>, http_req: HttpRequest) -> Result<HttpResponse> {
    let token = session_token(&http_req, &state.config.session.cookie_name);
    state.auth().sign_out(token.as_deref()).await?;

    Ok(HttpResponse::NoContent()
        .cookie(expired_cookie(&state.config.session))
        .finish())
}

pub async fn get_session(user: CurrentUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(SessionResponse { user: user.0 }))
}

/// Send a reset link. Answers the same whether or not the email is known.
pub async fn forget_password(
    state: web::Data<AppState>,
    req: web::Json<ForgetPasswordRequest>,
) -> Result<HttpResponse> {
    state
        .auth()
        .request_password_reset(&req.email, req.redirect_to.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(StatusResponse { status: true }))
}

/// Set a new password from an emailed token. Signs the user out everywhere.
pub async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    state
        .auth()
        .reset_password(&req.token, &req.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(StatusResponse { status: true }))
}
