//! # Folio API Server
//!
//! Actix-web server for the post review workflow and anonymous likes.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod client;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::auth::SessionGate;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        "Starting Folio API server"
    );

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application state");
        std::io::Error::other(e)
    })?;

    HttpServer::new(move || {
        let like_limiter = state.like_limiter.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(SessionGate)
            .wrap(TracingLogger::default())
            .configure(move |cfg| handlers::configure_routes(cfg, like_limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
