/// Auth service - email/password accounts, server-side sessions and password resets
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::{validation, Mailer};
use crate::config::SessionConfig;
use crate::db::ForumRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Session, User};
use crate::security::{
    generate_token, hash_password, hash_token, verify_dummy_password, verify_password,
};

/// Reset links stay valid for an hour
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// At most one reset email per user in this window
pub const RESET_REQUEST_COOLDOWN_MINUTES: i64 = 2;

/// A freshly created session. `token` is only ever handed to the client.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    repo: Arc<dyn ForumRepository>,
    mailer: Arc<dyn Mailer>,
    session: SessionConfig,
    app_url: String,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn ForumRepository>,
        mailer: Arc<dyn Mailer>,
        session: SessionConfig,
        app_url: String,
    ) -> Self {
        Self {
            repo,
            mailer,
            session,
            app_url,
        }
    }

    /// Register a new USER account and sign it in
    pub async fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<(User, IssuedSession)> {
        let email = validation::validate_email(email)?;
        let name = validation::normalize_name(name)?;
        let password_hash = hash_password(password)?;

        let user = self.repo.create_user(&email, &name, &password_hash).await?;
        let session = self.issue_session(&user).await?;

        metrics::record_auth_event("sign_up");
        tracing::info!(user_id = %user.id, "user registered");
        Ok((user, session))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(User, IssuedSession)> {
        let email = validation::normalize_email(email);

        let Some((user, password_hash)) = self.repo.find_credentials(&email).await? else {
            verify_dummy_password(password);
            metrics::record_auth_event("sign_in_failed");
            return Err(invalid_credentials());
        };

        if !verify_password(password, &password_hash)? {
            metrics::record_auth_event("sign_in_failed");
            tracing::warn!(user_id = %user.id, "sign-in rejected: wrong password");
            return Err(invalid_credentials());
        }

        let session = self.issue_session(&user).await?;
        metrics::record_auth_event("sign_in");
        tracing::info!(user_id = %user.id, "user signed in");
        Ok((user, session))
    }

    /// Drop the session behind `token`, if any. Signing out twice is harmless.
    pub async fn sign_out(&self, token: Option<&str>) -> Result<()> {
        if let Some(token) = token {
            if self.repo.delete_session(&hash_token(token)).await? {
                metrics::record_auth_event("sign_out");
            }
        }
        Ok(())
    }

    /// Resolve a client token to its live session and user
    pub async fn resolve(&self, token: &str) -> Result<Option<(Session, User)>> {
        self.repo.find_session_user(&hash_token(token)).await
    }

    /// Email a reset link when the address belongs to an account.
    /// The outcome is the same for unknown addresses, so registered emails
    /// cannot be enumerated.
    pub async fn request_password_reset(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<()> {
        let email = validation::normalize_email(email);

        let Some((user, _)) = self.repo.find_credentials(&email).await? else {
            tracing::info!("password reset requested for an unknown email");
            return Ok(());
        };

        let since = Utc::now() - Duration::minutes(RESET_REQUEST_COOLDOWN_MINUTES);
        if self.repo.has_recent_password_reset(user.id, since).await? {
            tracing::info!(user_id = %user.id, "password reset rate limited");
            return Ok(());
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.repo
            .create_password_reset(user.id, &hash_token(&token), expires_at)
            .await?;

        let link = format!(
            "{}{}?token={}",
            self.app_url,
            validation::reset_redirect_path(redirect_to),
            token
        );

        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &link, expires_at)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "failed to send password reset email");
        } else {
            metrics::record_auth_event("password_reset_requested");
            tracing::info!(user_id = %user.id, %expires_at, "password reset email sent");
        }

        Ok(())
    }

    /// Redeem a reset token. Every session of the user is revoked.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Reset token is required".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        let Some(user_id) = self
            .repo
            .reset_password(&hash_token(token), &password_hash)
            .await?
        else {
            metrics::record_auth_event("password_reset_failed");
            return Err(AppError::Validation(
                "Invalid or expired reset token".to_string(),
            ));
        };

        metrics::record_auth_event("password_reset");
        tracing::info!(user_id = %user_id, "password reset; sessions revoked");
        Ok(())
    }

    async fn issue_session(&self, user: &User) -> Result<IssuedSession> {
        let purged = self.repo.delete_expired_sessions(user.id).await?;
        if purged > 0 {
            tracing::debug!(user_id = %user.id, purged, "expired sessions removed");
        }

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(self.session.ttl_days);

        self.repo
            .create_session(user.id, &hash_token(&token), expires_at)
            .await?;

        Ok(IssuedSession { token, expires_at })
    }
}
