// Transit arrival board server
// Serves the bus and subway countdown APIs polled by the board page.

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transit_board::api::{self, AppState};
use transit_board::config::Config;

// ============================================================================
// Server Setup
// ============================================================================

async fn run_server(config: Config) -> std::io::Result<()> {
    let app_state = AppState::from_config(&config).map_err(std::io::Error::other)?;

    info!("🚀 Transit board server on http://{}:{}", config.bind_addr, config.port);
    info!("   GET  /api/bus             - B52 arrivals");
    info!("   GET  /api/subway?stopId=  - J/Z arrivals (J30N | J30S | auto)");
    info!("   GET  /health              - Health check");

    if config.bus_api_key.is_none() {
        warn!("⚠️  MTA_BUS_TIME_KEY is not set, /api/bus will answer 503");
    }

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(api::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();

    actix_web::rt::System::new().block_on(run_server(config))
}
