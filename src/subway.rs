// J/Z arrivals at Gates Av from the NYCT GTFS-RT feed (protobuf)
// Endpoint: https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-jz
//
// This tile never reports an error to the caller: a failed fetch or an
// undecodable feed shows as an empty board for that tick.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::config::Config;
use crate::feed::{self, FeedMessage};
use crate::models::{self, Arrival, SubwayArrivals};
use crate::platform::Platform;

#[derive(Debug, Clone)]
pub struct SubwayFeedAdapter {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    default_stop: Option<String>,
}

impl SubwayFeedAdapter {
    pub const DEFAULT_ROUTE: &'static str = "J";
    /// How far back an estimate may be and still show (feed / clock skew).
    pub const GRACE_SECS: i64 = 2 * 60;
    /// How far ahead to look so a quiet feed still fills the board.
    pub const WINDOW_SECS: i64 = 90 * 60;

    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        SubwayFeedAdapter {
            client,
            url: config.subway_feed_url.clone(),
            api_key: config.subway_api_key.clone(),
            default_stop: config.subway_stop_id.clone(),
        }
    }

    pub fn resolve_platform(&self, requested: Option<&str>) -> Platform {
        Platform::resolve(requested, self.default_stop.as_deref())
    }

    pub async fn fetch_arrivals(&self, requested: Option<&str>) -> SubwayArrivals {
        let platform = self.resolve_platform(requested);
        let wire_stop = platform.wire_stop_id();

        let arrivals = match self.fetch_feed().await {
            Some(feed) => parse_trip_updates(&feed, wire_stop, Utc::now()),
            None => Vec::new(),
        };

        debug!(
            "🚇 {} subway arrivals for {} (feed stop {})",
            arrivals.len(),
            platform,
            wire_stop
        );

        SubwayArrivals {
            arrivals,
            stop_id: platform.label().to_string(),
        }
    }

    async fn fetch_feed(&self) -> Option<FeedMessage> {
        let mut request = self
            .client
            .get(&self.url)
            .header("Accept", "application/x-protobuf")
            .header("Cache-Control", "no-cache");
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Subway fetch failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Subway feed returned {}", response.status());
            return None;
        }

        let body: Bytes = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read subway feed body: {}", e);
                return None;
            }
        };

        match feed::decode(&body) {
            Ok(feed) => {
                if let Some(ts) = feed.header.as_ref().and_then(|h| h.timestamp) {
                    debug!("Subway feed generated at {}", crate::format_timestamp_full(ts as i64));
                }
                Some(feed)
            }
            Err(e) => {
                warn!("Failed to decode subway feed ({} bytes): {}", body.len(), e);
                None
            }
        }
    }
}

/// Arrivals at `wire_stop` between two minutes ago and ninety minutes out,
/// soonest first, at most `MAX_ARRIVALS`.
pub fn parse_trip_updates(feed: &FeedMessage, wire_stop: &str, now: DateTime<Utc>) -> Vec<Arrival> {
    let earliest = now - Duration::seconds(SubwayFeedAdapter::GRACE_SECS);
    let latest = now + Duration::seconds(SubwayFeedAdapter::WINDOW_SECS);

    let mut arrivals = Vec::new();

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            continue;
        };
        if trip_update.stop_time_update.is_empty() {
            continue;
        }

        let route = trip_update
            .route_id()
            .unwrap_or(SubwayFeedAdapter::DEFAULT_ROUTE);
        let destination = trip_update.destination();

        for stu in &trip_update.stop_time_update {
            if stu.stop_id.as_deref() != Some(wire_stop) {
                continue;
            }
            let Some(at) = stu.event_time() else {
                continue;
            };
            if at < earliest || at > latest {
                continue;
            }

            arrivals.push(Arrival {
                route: route.to_string(),
                destination: destination.clone(),
                minutes_until_arrival: models::minutes_until(at, now),
                stop_id: Some(wire_stop.to_string()),
            });
        }
    }

    models::finalize(arrivals)
}
