//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = if database_reachable(&state).await {
        "ok"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.as_str(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg_attr(not(feature = "postgres"), allow(unused_variables))]
async fn database_reachable(state: &AppState) -> bool {
    #[cfg(feature = "postgres")]
    if let Some(db) = &state.db {
        if let Err(e) = db.ping().await {
            tracing::warn!(error = %e, "Database ping failed");
            return false;
        }
    }
    true
}
