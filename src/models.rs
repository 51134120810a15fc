// Shared arrival shapes returned by the bus and subway adapters
// Both tiles of the board render the same `Arrival` list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FailureKind;

/// Maximum number of arrivals a tile ever shows.
pub const MAX_ARRIVALS: usize = 4;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub minutes_until_arrival: u32,
    /// Wire stop identifier the arrival was matched against (subway only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusArrivals {
    pub arrivals: Vec<Arrival>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubwayArrivals {
    pub arrivals: Vec<Arrival>,
    /// Human platform label the request resolved to.
    pub stop_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Whole minutes from `now` until `target`, rounded to nearest and clamped at zero.
pub fn minutes_until(target: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let millis = (target - now).num_milliseconds();
    let minutes = (millis as f64 / 60_000.0).round();
    if minutes <= 0.0 {
        0
    } else {
        minutes.min(u32::MAX as f64) as u32
    }
}

/// Sorts soonest first and keeps at most `MAX_ARRIVALS` entries.
pub fn finalize(mut arrivals: Vec<Arrival>) -> Vec<Arrival> {
    arrivals.sort_by_key(|a| a.minutes_until_arrival);
    arrivals.truncate(MAX_ARRIVALS);
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    fn arrival(route: &str, minutes: u32) -> Arrival {
        Arrival {
            route: route.to_string(),
            destination: None,
            minutes_until_arrival: minutes,
            stop_id: None,
        }
    }

    #[test]
    fn test_minutes_until_rounds_to_nearest() {
        assert_eq!(minutes_until(now() + Duration::seconds(89), now()), 1);
        assert_eq!(minutes_until(now() + Duration::seconds(90), now()), 2);
        assert_eq!(minutes_until(now() + Duration::minutes(12), now()), 12);
    }

    #[test]
    fn test_minutes_until_clamps_past_to_zero() {
        assert_eq!(minutes_until(now() - Duration::minutes(5), now()), 0);
        assert_eq!(minutes_until(now() - Duration::seconds(20), now()), 0);
        assert_eq!(minutes_until(now(), now()), 0);
    }

    #[test]
    fn test_finalize_sorts_and_truncates() {
        let arrivals = vec![
            arrival("B52", 9),
            arrival("B52", 1),
            arrival("B52", 14),
            arrival("B52", 3),
            arrival("B52", 0),
            arrival("B52", 6),
        ];

        let minutes: Vec<u32> = finalize(arrivals)
            .iter()
            .map(|a| a.minutes_until_arrival)
            .collect();
        assert_eq!(minutes, vec![0, 1, 3, 6]);
    }

    #[test]
    fn test_arrival_serializes_camel_case_without_empty_fields() {
        let json = serde_json::to_value(arrival("J", 4)).unwrap();
        assert_eq!(json, serde_json::json!({ "route": "J", "minutesUntilArrival": 4 }));

        let with_stop = Arrival {
            destination: Some("Broad St".to_string()),
            stop_id: Some("J30S".to_string()),
            ..arrival("J", 4)
        };
        let json = serde_json::to_value(with_stop).unwrap();
        assert_eq!(json["destination"], "Broad St");
        assert_eq!(json["stopId"], "J30S");
    }
}
