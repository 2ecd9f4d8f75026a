//! Feed builders shared by the unit tests.

use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use crate::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};

pub(crate) const FEED_TIMESTAMP: u64 = 1_700_000_000;

pub(crate) fn feed(updates: Vec<TripUpdate>) -> FeedMessage {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(FEED_TIMESTAMP),
            ..Default::default()
        },
        entity: updates
            .into_iter()
            .enumerate()
            .map(|(i, update)| FeedEntity {
                id: format!("trip-{i}"),
                trip_update: Some(update),
                ..Default::default()
            })
            .collect(),
    }
}

pub(crate) fn trip(route_id: &str, stops: Vec<StopTimeUpdate>) -> TripUpdate {
    TripUpdate {
        trip: TripDescriptor {
            route_id: Some(route_id.to_string()),
            ..Default::default()
        },
        stop_time_update: stops,
        ..Default::default()
    }
}

pub(crate) fn stop(stop_id: &str, arrival: Option<i64>, departure: Option<i64>) -> StopTimeUpdate {
    let event = |time: Option<i64>| {
        time.map(|t| StopTimeEvent {
            time: Some(t),
            ..Default::default()
        })
    };
    StopTimeUpdate {
        stop_id: Some(stop_id.to_string()),
        arrival: event(arrival),
        departure: event(departure),
        ..Default::default()
    }
}
