// HTTP surface polled by the board page
//
//   GET /api/bus                    - B52 arrivals, or { error, kind, details }
//   GET /api/subway?stopId=J30N     - J/Z arrivals (stopId: J30N | J30S | auto)
//   GET /health                     - Health check

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::debug;

use crate::bus::BusFeedAdapter;
use crate::config::Config;
use crate::error::BusError;
use crate::subway::SubwayFeedAdapter;

#[derive(Debug, Clone)]
pub struct AppState {
    pub bus: BusFeedAdapter,
    pub subway: SubwayFeedAdapter,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("transit_board/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(AppState {
            bus: BusFeedAdapter::new(client.clone(), config),
            subway: SubwayFeedAdapter::new(client, config),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SubwayQuery {
    #[serde(rename = "stopId")]
    pub stop_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_bus_arrivals(state: web::Data<AppState>) -> Result<HttpResponse, BusError> {
    let arrivals = state.bus.fetch_arrivals().await?;
    debug!("🚌 Bus arrivals requested: {} returned", arrivals.arrivals.len());
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(arrivals))
}

async fn get_subway_arrivals(
    state: web::Data<AppState>,
    query: web::Query<SubwayQuery>,
) -> HttpResponse {
    let arrivals = state.subway.fetch_arrivals(query.stop_id.as_deref()).await;
    debug!(
        "🚇 Subway arrivals requested for {}: {} returned",
        arrivals.stop_id,
        arrivals.arrivals.len()
    );
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(arrivals)
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "Transit Board API",
        "version": env!("CARGO_PKG_VERSION"),
        "sources": ["MTA Bus Time", "NYCT GTFS-RT"],
        "timestamp": crate::get_current_timestamp(),
    }))
}

// ============================================================================
// Routes
// ============================================================================

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api")
            .route("/bus", web::get().to(get_bus_arrivals))
            .route("/subway", web::get().to(get_subway_arrivals)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    fn state(config: &Config) -> web::Data<AppState> {
        web::Data::new(AppState::from_config(config).unwrap())
    }

    #[actix_web::test]
    async fn test_bus_without_key_is_503() {
        // Unroutable feed URL: the request must fail before any network call
        let config = Config {
            bus_feed_url: "http://127.0.0.1:1/unused".to_string(),
            ..Config::default()
        };
        let app = test::init_service(App::new().app_data(state(&config)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/bus").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers().get("Cache-Control").unwrap(), "no-store");

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "MTA_BUS_TIME_KEY not configured");
        assert_eq!(body["kind"], "missing-config");
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(state(&Config::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }
}
