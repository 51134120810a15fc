// Partial GTFS-realtime schema
// Only the fields the subway tile reads are declared; every field is optional
// and anything else on the wire (NYCT extensions included) is skipped by prost.
// Tags follow https://gtfs.org/realtime/proto/

use chrono::{DateTime, TimeZone, Utc};
use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct FeedMessage {
    #[prost(message, optional, tag = "1")]
    pub header: Option<FeedHeader>,
    #[prost(message, repeated, tag = "2")]
    pub entity: Vec<FeedEntity>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FeedHeader {
    #[prost(string, optional, tag = "1")]
    pub gtfs_realtime_version: Option<String>,
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: Option<u64>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FeedEntity {
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    #[prost(message, optional, tag = "3")]
    pub trip_update: Option<TripUpdate>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TripUpdate {
    #[prost(message, optional, tag = "1")]
    pub trip: Option<TripDescriptor>,
    #[prost(message, repeated, tag = "2")]
    pub stop_time_update: Vec<StopTimeUpdate>,
    #[prost(message, optional, tag = "6")]
    pub trip_properties: Option<TripProperties>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TripDescriptor {
    #[prost(string, optional, tag = "1")]
    pub trip_id: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub route_id: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TripProperties {
    #[prost(string, optional, tag = "5")]
    pub trip_headsign: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub trip_short_name: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StopTimeUpdate {
    #[prost(uint32, optional, tag = "1")]
    pub stop_sequence: Option<u32>,
    #[prost(message, optional, tag = "2")]
    pub arrival: Option<StopTimeEvent>,
    #[prost(message, optional, tag = "3")]
    pub departure: Option<StopTimeEvent>,
    #[prost(string, optional, tag = "4")]
    pub stop_id: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StopTimeEvent {
    #[prost(int32, optional, tag = "1")]
    pub delay: Option<i32>,
    #[prost(int64, optional, tag = "2")]
    pub time: Option<i64>,
}

pub fn decode(body: &[u8]) -> Result<FeedMessage, prost::DecodeError> {
    FeedMessage::decode(body)
}

/// Converts POSIX seconds into a UTC instant. Out-of-range values are `None`.
pub fn epoch_seconds(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

impl StopTimeUpdate {
    /// Arrival time, or departure time when the feed only gives that.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        let arrival = self.arrival.as_ref().and_then(|e| e.time);
        let departure = self.departure.as_ref().and_then(|e| e.time);
        arrival.or(departure).and_then(epoch_seconds)
    }
}

impl TripUpdate {
    /// Short trip name, falling back to the headsign.
    pub fn destination(&self) -> Option<String> {
        let props = self.trip_properties.as_ref()?;
        props
            .trip_short_name
            .clone()
            .or_else(|| props.trip_headsign.clone())
    }

    pub fn route_id(&self) -> Option<&str> {
        self.trip.as_ref().and_then(|t| t.route_id.as_deref())
    }
}
