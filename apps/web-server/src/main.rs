//! # Yatube web server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::HttpServer;

use web_server::build_app;
use web_server::config::AppConfig;
use web_server::state::AppState;
use web_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!("Starting Yatube on {}:{}", config.host, config.port);

    let state = AppState::new(&config).await.map_err(std::io::Error::other)?;

    if let Some(admin) = &config.admin {
        state
            .bootstrap_admin(admin)
            .await
            .map_err(std::io::Error::other)?;
    }

    HttpServer::new(move || build_app(state.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
