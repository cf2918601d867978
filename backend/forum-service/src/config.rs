/// Configuration management for Forum Service
///
/// Values come from environment variables (optionally seeded from `.env`).
/// Pool tuning (`DB_*`) is read by the `db-pool` crate.
use db_pool::env_utils::{parse_env_or, parse_flag_or};

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/forum";
pub const DEFAULT_SESSION_COOKIE: &str = "forum.session_token";
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub limits: LimitsConfig,
    pub mail: MailConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .finish()
    }
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_days: i64,
    pub secure_cookie: bool,
}

/// Outgoing mail (password reset links).
/// An empty `smtp_host` puts the mailer in log-only mode.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub use_starttls: bool,
    /// Public origin of the web client, used to build links in emails
    pub app_url: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "<redacted>"))
            .field("smtp_from", &self.smtp_from)
            .field("use_starttls", &self.use_starttls)
            .field("app_url", &self.app_url)
            .finish()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "Forum <no-reply@forum.local>".to_string(),
            use_starttls: true,
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

/// Content size limits, in characters
#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    pub max_message_length: usize,
    pub max_title_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_length: 5000,
            max_title_length: 200,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: "development".to_string(),
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            cors: CorsConfig {
                allowed_origins: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
            },
            session: SessionConfig {
                cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
                ttl_days: 7,
                secure_cookie: false,
            },
            limits: LimitsConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| defaults.app.env.clone());
        let production = app_env.eq_ignore_ascii_case("production");

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            Err(_) => defaults.cors.allowed_origins.clone(),
        };
        if production && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let cookie_name = std::env::var("SESSION_COOKIE_NAME")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.session.cookie_name.clone());

        let ttl_days: i64 = parse_env_or("SESSION_TTL_DAYS", defaults.session.ttl_days)?;
        if ttl_days <= 0 {
            return Err("SESSION_TTL_DAYS must be positive".to_string());
        }

        let limits = LimitsConfig {
            max_message_length: parse_env_or(
                "MAX_MESSAGE_LENGTH",
                defaults.limits.max_message_length,
            )?,
            max_title_length: parse_env_or("MAX_TITLE_LENGTH", defaults.limits.max_title_length)?,
        };
        if limits.max_message_length == 0 || limits.max_title_length == 0 {
            return Err("MAX_MESSAGE_LENGTH and MAX_TITLE_LENGTH must be positive".to_string());
        }

        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mail = MailConfig {
            smtp_host: non_empty("SMTP_HOST").unwrap_or_default(),
            smtp_port: parse_env_or("SMTP_PORT", defaults.mail.smtp_port)?,
            smtp_username: non_empty("SMTP_USERNAME"),
            smtp_password: non_empty("SMTP_PASSWORD"),
            smtp_from: non_empty("SMTP_FROM").unwrap_or_else(|| defaults.mail.smtp_from.clone()),
            use_starttls: parse_flag_or("SMTP_STARTTLS", defaults.mail.use_starttls)?,
            app_url: non_empty("PUBLIC_APP_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| defaults.mail.app_url.clone()),
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("FORUM_SERVICE_HOST")
                    .unwrap_or_else(|_| defaults.app.host.clone()),
                port: parse_env_or("FORUM_SERVICE_PORT", defaults.app.port)?,
            },
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| defaults.database.url.clone()),
            },
            session: SessionConfig {
                cookie_name,
                ttl_days,
                secure_cookie: parse_flag_or("SESSION_COOKIE_SECURE", production)?,
            },
            limits,
            mail,
        })
    }
}
