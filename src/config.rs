// Runtime configuration for the board server
// Read once at startup from flags / environment and handed to each adapter.

use clap::Parser;

pub const DEFAULT_BUS_FEED_URL: &str = "https://bustime.mta.info/api/siri/stop-monitoring.json";
pub const DEFAULT_SUBWAY_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-jz";

#[derive(Debug, Clone, Parser)]
#[command(name = "transit_board", version, about = "B52 + J/Z arrival board server")]
pub struct Config {
    /// MTA Bus Time API key
    #[arg(long, env = "MTA_BUS_TIME_KEY", hide_env_values = true)]
    pub bus_api_key: Option<String>,

    /// API key for the subway GTFS-RT feed, sent as x-api-key
    #[arg(long, env = "MTA_SUBWAY_GTFS_RT_KEY", hide_env_values = true)]
    pub subway_api_key: Option<String>,

    /// Default subway platform (J30N or J30S)
    #[arg(long, env = "SUBWAY_STOP_ID")]
    pub subway_stop_id: Option<String>,

    #[arg(long, env = "BUS_FEED_URL", default_value = DEFAULT_BUS_FEED_URL)]
    pub bus_feed_url: String,

    #[arg(long, env = "SUBWAY_FEED_URL", default_value = DEFAULT_SUBWAY_FEED_URL)]
    pub subway_feed_url: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

impl Config {
    /// Parses flags and environment, dropping blank optional values.
    pub fn load() -> Self {
        Self::parse().normalized()
    }

    pub fn normalized(mut self) -> Self {
        self.bus_api_key = non_empty(self.bus_api_key);
        self.subway_api_key = non_empty(self.subway_api_key);
        self.subway_stop_id = non_empty(self.subway_stop_id);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus_api_key: None,
            subway_api_key: None,
            subway_stop_id: None,
            bus_feed_url: DEFAULT_BUS_FEED_URL.to_string(),
            subway_feed_url: DEFAULT_SUBWAY_FEED_URL.to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "transit_board",
            "--bus-api-key",
            "abc",
            "--subway-stop-id",
            "J30S",
            "--port",
            "9000",
        ])
        .unwrap();

        assert_eq!(config.bus_api_key.as_deref(), Some("abc"));
        assert_eq!(config.subway_stop_id.as_deref(), Some("J30S"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let config = Config {
            bus_api_key: Some("  ".to_string()),
            subway_api_key: Some(String::new()),
            subway_stop_id: Some("J30N".to_string()),
            ..Config::default()
        }
        .normalized();

        assert_eq!(config.bus_api_key, None);
        assert_eq!(config.subway_api_key, None);
        assert_eq!(config.subway_stop_id.as_deref(), Some("J30N"));
    }
}
