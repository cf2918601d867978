/// Outgoing email: password reset links
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::MailConfig;
use crate::error::{AppError, Result};

/// Delivery of account emails. `link` already carries the token.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(
        &self,
        recipient: &str,
        link: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// SMTP mailer (or log-only when no host is configured)
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.is_empty() {
            warn!("SMTP_HOST not configured; emails will be logged, not sent");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {}", e)))?
            .port(config.smtp_port);

            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        recipient: &str,
        link: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let subject = "Reset your forum password";

        let Some(transport) = &self.transport else {
            info!(subject, "mailer in log-only mode; reset email not sent");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid recipient address: {}", e)))?;

        let body = format!(
            "We received a request to reset your password.\n\n\
             Open the following link to choose a new one:\n{}\n\n\
             The link expires at {} UTC and can be used once.\n\
             If you did not ask for this, you can ignore this email.",
            link,
            expires_at.format("%Y-%m-%d %H:%M"),
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        info!(subject, "email sent");
        Ok(())
    }
}
