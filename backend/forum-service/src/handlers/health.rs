/// Health endpoints for orchestrators and load balancers
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    postgresql: ComponentCheck,
    timestamp: String,
}

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.repo.health_check().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "forum-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "forum-service"
            }))
        }
    }
}

pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.repo.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let postgresql = match result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms,
        },
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: "PostgreSQL connection failed".to_string(),
                latency_ms,
            }
        }
    };

    let ready = matches!(postgresql.status, ComponentStatus::Healthy);
    let response = ReadinessResponse {
        ready,
        postgresql,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
