// Transit arrival board: B52 bus + J/Z subway at Gates Av, Brooklyn
//
// Upstream feeds:
// - MTA Bus Time SIRI stop-monitoring (JSON): https://bustime.mta.info/api/siri/stop-monitoring.json
// - NYCT GTFS-RT J/Z feed (protobuf): https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-jz
//
// Each adapter fetches, decodes and trims its feed to a short countdown list.
// Nothing is cached between calls.

pub mod api;
pub mod bus;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod platform;
pub mod subway;

use chrono::{TimeZone, Utc};
use chrono_tz::America::New_York;

pub use bus::BusFeedAdapter;
pub use config::Config;
pub use error::BusError;
pub use models::{Arrival, BusArrivals, SubwayArrivals};
pub use platform::Platform;
pub use subway::SubwayFeedAdapter;

/// Local (New York) wall-clock rendering of a POSIX timestamp, for logs.
pub fn format_timestamp_full(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt
            .with_timezone(&New_York)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("Invalid timestamp: {}", timestamp),
    }
}

pub fn get_current_timestamp() -> i64 {
    Utc::now().timestamp()
}
