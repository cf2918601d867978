//! Prometheus metrics for forum-service.
//!
//! Exposes moderation and authentication collectors and an HTTP handler for
//! the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use crate::middleware::permissions::{Action, AuthzError, ResourceKind};

lazy_static! {
    /// Authorization decisions on mutating operations (allowed/forbidden/not_found/unauthenticated).
    pub static ref AUTHZ_DECISIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "forum_authz_decisions_total",
        "Authorization decisions segmented by resource, action and outcome",
        &["resource", "action", "outcome"]
    )
    .expect("failed to register forum_authz_decisions_total");

    /// Sign-up / sign-in / sign-out events.
    pub static ref AUTH_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "forum_auth_events_total",
        "Authentication events segmented by kind",
        &["event"]
    )
    .expect("failed to register forum_auth_events_total");
}

pub fn record_authz(kind: ResourceKind, action: Action, outcome: &Result<(), AuthzError>) {
    let label = match outcome {
        Ok(()) => "allowed",
        Err(AuthzError::Unauthenticated) => "unauthenticated",
        Err(AuthzError::NotFound(_)) => "not_found",
        Err(AuthzError::Forbidden { .. }) => "forbidden",
    };
    AUTHZ_DECISIONS_TOTAL
        .with_label_values(&[kind.as_str(), action.as_str(), label])
        .inc();
}

pub fn record_auth_event(event: &str) {
    AUTH_EVENTS_TOTAL.with_label_values(&[event]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
