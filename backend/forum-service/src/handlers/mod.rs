/// HTTP handlers for forum-service
///
/// Handlers are thin: extract, call a service, serialize. Extractor
/// failures (bad JSON, bad path or query) are rendered as validation errors
/// with the same body shape as every other error.
use actix_web::web;

use crate::error::AppError;
use crate::metrics;

pub mod auth;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod users;

/// Deserialize a field that is present in the body, even as `null`.
/// Paired with `#[serde(default)]`, an absent field stays `None` while
/// `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query: {}", err)).into())
}

/// Register every route. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .route("/metrics", web::get().to(metrics::serve_metrics))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_summary))
                .route("/health/live", web::get().to(health::liveness_check))
                .route("/health/ready", web::get().to(health::readiness_check))
                .service(
                    web::scope("/auth")
                        .route("/sign-up", web::post().to(auth::sign_up))
                        .route("/sign-in", web::post().to(auth::sign_in))
                        .route("/sign-out", web::post().to(auth::sign_out))
                        .route("/session", web::get().to(auth::get_session))
                        .route("/forget-password", web::post().to(auth::forget_password))
                        .route("/reset-password", web::post().to(auth::reset_password)),
                )
                .service(
                    web::resource("/conversations")
                        .route(web::get().to(conversations::list_conversations))
                        .route(web::post().to(conversations::create_conversation)),
                )
                .service(
                    web::resource("/conversations/{id}")
                        .route(web::get().to(conversations::get_conversation))
                        .route(web::patch().to(conversations::update_conversation))
                        .route(web::delete().to(conversations::delete_conversation)),
                )
                .service(
                    web::resource("/messages")
                        .route(web::get().to(messages::list_messages))
                        .route(web::post().to(messages::create_message)),
                )
                .service(
                    web::resource("/messages/{id}")
                        .route(web::patch().to(messages::update_message))
                        .route(web::delete().to(messages::delete_message)),
                )
                .route("/profile", web::patch().to(users::update_profile))
                .route("/users/{id}", web::get().to(users::get_user))
                .route("/users/{id}/stats", web::get().to(users::get_user_stats)),
        );
}
