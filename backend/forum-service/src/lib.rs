/// Forum Service Library
///
/// Conversations, messages and user profiles for a discussion forum, with
/// role-based moderation on top of ownership.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `services`: Business logic and the authorization choke point
/// - `middleware`: Session resolution and the permission policy
/// - `db`: Repository traits and the PostgreSQL implementation
/// - `models`: Data structures for users, sessions, conversations, messages
/// - `security`: Password hashing and session tokens
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
