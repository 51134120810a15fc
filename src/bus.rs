// B52 arrivals from MTA Bus Time (SIRI stop-monitoring, JSON)
// Endpoint: https://bustime.mta.info/api/siri/stop-monitoring.json
//
// Every level of the SIRI payload may be missing. A visit that can't be read
// is dropped on its own; the rest of the batch still renders.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BusError;
use crate::models::{self, Arrival, BusArrivals, MAX_ARRIVALS};

// ============================================================================
// SIRI payload (partial)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StopMonitoringResponse {
    siri: Option<Siri>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Siri {
    service_delivery: Option<ServiceDelivery>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceDelivery {
    // Only the first delivery is read; its siblings may be anything
    stop_monitoring_delivery: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StopMonitoringDelivery {
    // Kept raw so one malformed visit doesn't sink the others
    monitored_stop_visit: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MonitoredStopVisit {
    monitored_vehicle_journey: Option<MonitoredVehicleJourney>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MonitoredVehicleJourney {
    published_line_name: Option<String>,
    destination_name: Option<String>,
    monitored_call: Option<MonitoredCall>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MonitoredCall {
    expected_arrival_time: Option<String>,
}

// ============================================================================
// Adapter
// ============================================================================

#[derive(Debug, Clone)]
pub struct BusFeedAdapter {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl BusFeedAdapter {
    pub const OPERATOR_REF: &'static str = "MTA";
    /// B52 towards Ridgewood at Gates Av / Evergreen Av
    pub const MONITORING_REF: &'static str = "307688";
    pub const LINE_REF: &'static str = "MTA NYCT_B52";
    pub const DEFAULT_ROUTE: &'static str = "B52";

    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        BusFeedAdapter {
            client,
            url: config.bus_feed_url.clone(),
            api_key: config.bus_api_key.clone(),
        }
    }

    pub async fn fetch_arrivals(&self) -> Result<BusArrivals, BusError> {
        let key = self.api_key.as_deref().ok_or(BusError::MissingKey)?;
        let max_visits = MAX_ARRIVALS.to_string();

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("key", key),
                ("OperatorRef", Self::OPERATOR_REF),
                ("MonitoringRef", Self::MONITORING_REF),
                ("LineRef", Self::LINE_REF),
                ("MaximumStopVisits", max_visits.as_str()),
            ])
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .map_err(|e| {
                let err = BusError::from(e);
                warn!("Bus fetch failed: {}", err.details().unwrap_or_default());
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = BusError::from_status(status.as_u16(), &text);
            warn!(status = status.as_u16(), kind = ?err.kind(), "Bus API rejected request: {}", err);
            return Err(err);
        }

        let body = response.text().await?;
        let arrivals = match serde_json::from_str::<Value>(&body) {
            Ok(data) => parse_stop_monitoring(&data, Utc::now()),
            Err(e) => {
                warn!("Bus response was not valid JSON: {}", e);
                Vec::new()
            }
        };

        debug!("🚌 {} bus arrivals", arrivals.len());
        Ok(BusArrivals { arrivals })
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Turns a stop-monitoring payload into at most `MAX_ARRIVALS` arrivals, soonest first.
pub fn parse_stop_monitoring(data: &Value, now: DateTime<Utc>) -> Vec<Arrival> {
    let response = match StopMonitoringResponse::deserialize(data) {
        Ok(response) => response,
        Err(e) => {
            warn!("Unexpected stop-monitoring shape: {}", e);
            return Vec::new();
        }
    };

    let visits = response
        .siri
        .and_then(|s| s.service_delivery)
        .and_then(|d| d.stop_monitoring_delivery)
        .and_then(|deliveries| deliveries.into_iter().next())
        .and_then(|first| match StopMonitoringDelivery::deserialize(&first) {
            Ok(delivery) => delivery.monitored_stop_visit,
            Err(e) => {
                warn!("Unexpected StopMonitoringDelivery shape: {}", e);
                None
            }
        })
        .unwrap_or_default();

    let arrivals = visits
        .iter()
        .filter_map(|visit| parse_visit(visit, now))
        .collect();

    models::finalize(arrivals)
}

fn parse_visit(raw: &Value, now: DateTime<Utc>) -> Option<Arrival> {
    let visit = match MonitoredStopVisit::deserialize(raw) {
        Ok(visit) => visit,
        Err(e) => {
            debug!("Skipping unreadable stop visit: {}", e);
            return None;
        }
    };

    let journey = visit.monitored_vehicle_journey?;
    let expected = journey
        .monitored_call
        .as_ref()
        .and_then(|c| c.expected_arrival_time.as_deref())
        .filter(|t| !t.is_empty())?;

    let expected = match DateTime::parse_from_rfc3339(expected) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            debug!("Skipping visit with bad ExpectedArrivalTime {:?}: {}", expected, e);
            return None;
        }
    };

    Some(Arrival {
        route: journey
            .published_line_name
            .unwrap_or_else(|| BusFeedAdapter::DEFAULT_ROUTE.to_string()),
        destination: journey.destination_name,
        minutes_until_arrival: models::minutes_until(expected, now),
        stop_id: None,
    })
}
