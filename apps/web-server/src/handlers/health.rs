//! Liveness and storage check.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub groups: Option<u64>,
    pub timestamp: String,
}

/// GET /api/health - 503 when the store does not answer.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let groups = match state.groups.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::error!(storage = state.storage, "Health check failed: {}", e);
            None
        }
    };

    let body = HealthResponse {
        status: if groups.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        groups,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if groups.is_some() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
