//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `up`, `down`, or `in-memory` when no database is configured.
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => "up",
            Err(e) => {
                tracing::error!(error = %e, "Database ping failed");
                "down"
            }
        },
        None => "in-memory",
    };

    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}
