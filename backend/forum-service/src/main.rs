use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use forum_service::db::{PgForumRepository, MIGRATOR};
use forum_service::middleware::SessionMiddleware;
use forum_service::services::SmtpMailer;
use forum_service::{handlers, logging, AppState, Config};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Forum Service
///
/// # Routes
///
/// - `/api/auth/*` - Sign-up, sign-in, sign-out, current session, password reset
/// - `/api/conversations/*` - List, create, read, edit, delete conversations
/// - `/api/messages/*` - List, post, edit, delete messages
/// - `/api/profile`, `/api/users/*` - Profiles and activity stats
/// - `/api/health/*`, `/metrics` - Operational endpoints
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    tracing::info!(
        env = %config.app.env,
        host = %config.app.host,
        port = config.app.port,
        "Starting forum-service"
    );

    let db_config = db_pool::DbConfig::from_env("forum-service", &config.database.url)
        .map_err(anyhow::Error::msg)
        .context("Invalid database configuration")?;
    db_config.log_config();

    let pool = db_pool::create_pool(db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;

    db_pool::run_migrations(&pool, &MIGRATOR)
        .await
        .context("Failed to run database migrations")?;

    let mailer = SmtpMailer::new(&config.mail).context("Failed to configure mailer")?;

    let bind_address = (config.app.host.clone(), config.app.port);
    let state = AppState::new(
        Arc::new(PgForumRepository::new(pool)),
        Arc::new(mailer),
        config,
    );

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in state.config.cors.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(SessionMiddleware::new(state.clone()))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(bind_address)
    .context("Failed to bind HTTP listener")?
    .run();

    let server_handle = server.handle();
    tracing::info!("HTTP server is running");

    tokio::select! {
        result = server => {
            result.context("HTTP server error")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("forum-service stopped");
    Ok(())
}
