//! Extracts one station's stop-time updates from a decoded feed.

use serde::Serialize;
use tracing::trace;

use crate::config::{Direction, StationConfig};
use crate::gtfs_rt::FeedMessage;
use crate::gtfs_rt::TripUpdate;
use crate::gtfs_rt::trip_update::StopTimeUpdate;

/// Predicted times of one trip at one platform, in epoch seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationItem {
    pub arrival: Option<i64>,
    pub departure: Option<i64>,
}

impl From<&StopTimeUpdate> for StationItem {
    fn from(stu: &StopTimeUpdate) -> Self {
        Self {
            arrival: stu.arrival.as_ref().and_then(|e| e.time),
            departure: stu.departure.as_ref().and_then(|e| e.time),
        }
    }
}

/// Station items split by direction, in feed entity order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectionalResult {
    #[serde(rename = "northStopTimes")]
    pub north: Vec<StationItem>,
    #[serde(rename = "southStopTimes")]
    pub south: Vec<StationItem>,
}

impl DirectionalResult {
    pub fn get(&self, direction: Direction) -> &[StationItem] {
        match direction {
            Direction::North => &self.north,
            Direction::South => &self.south,
        }
    }

    fn push(&mut self, direction: Direction, item: StationItem) {
        match direction {
            Direction::North => self.north.push(item),
            Direction::South => self.south.push(item),
        }
    }
}

/// Collects the configured route's stop-time updates at the station's two
/// platforms.
///
/// A trip contributes to a direction only when exactly one of its stop-time
/// updates names that platform. A trip listing the same platform twice is
/// ambiguous and contributes nothing for that direction.
pub fn filter_station(feed: &FeedMessage, station: &StationConfig) -> DirectionalResult {
    let mut result = DirectionalResult::default();

    for trip_update in feed.entity.iter().filter_map(|e| e.trip_update.as_ref()) {
        if trip_update.trip.route_id.as_deref() != Some(station.route_id()) {
            continue;
        }

        for direction in Direction::ALL {
            let stop_id = station.stop_id(direction);
            if let Some(stu) = single_match(trip_update, stop_id) {
                result.push(direction, StationItem::from(stu));
            }
        }
    }

    result
}

fn single_match<'a>(trip_update: &'a TripUpdate, stop_id: &str) -> Option<&'a StopTimeUpdate> {
    let mut matches = trip_update
        .stop_time_update
        .iter()
        .filter(|stu| stu.stop_id.as_deref() == Some(stop_id));

    let first = matches.next()?;
    if matches.next().is_some() {
        trace!(
            trip_id = trip_update.trip.trip_id.as_deref().unwrap_or(""),
            stop_id,
            "Trip lists stop more than once, skipping"
        );
        return None;
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::FeedEntity;
    use crate::testing::{feed, stop, trip};

    fn station() -> StationConfig {
        StationConfig::new("719", "7").unwrap()
    }

    #[test]
    fn test_other_routes_never_contribute() {
        let feed = feed(vec![
            trip("7X", vec![stop("719N", Some(100), Some(110))]),
            trip("N", vec![stop("719S", Some(200), None)]),
            trip("77", vec![stop("719N", Some(300), None)]),
        ]);

        let result = filter_station(&feed, &station());

        assert!(result.north.is_empty());
        assert!(result.south.is_empty());
    }

    #[test]
    fn test_single_match_copies_times_verbatim() {
        let feed = feed(vec![trip(
            "7",
            vec![
                stop("718N", Some(50), Some(60)),
                stop("719N", Some(100), None),
                stop("720N", Some(150), Some(160)),
            ],
        )]);

        let result = filter_station(&feed, &station());

        assert_eq!(
            result.north,
            vec![StationItem {
                arrival: Some(100),
                departure: None
            }]
        );
        assert!(result.south.is_empty());
    }

    #[test]
    fn test_duplicate_stop_in_trip_is_dropped() {
        let feed = feed(vec![trip(
            "7",
            vec![
                stop("719N", Some(100), Some(110)),
                stop("719N", Some(400), Some(410)),
                stop("719S", Some(500), Some(510)),
            ],
        )]);

        let result = filter_station(&feed, &station());

        assert!(result.north.is_empty());
        assert_eq!(result.south.len(), 1);
        assert_eq!(result.south[0].arrival, Some(500));
    }

    #[test]
    fn test_stop_id_match_is_exact() {
        let feed = feed(vec![trip(
            "7",
            vec![stop("719", Some(100), None), stop("719n", Some(200), None)],
        )]);

        let result = filter_station(&feed, &station());

        assert_eq!(result, DirectionalResult::default());
    }

    #[test]
    fn test_missing_events_map_to_none() {
        let feed = feed(vec![trip("7", vec![stop("719S", None, None)])]);

        let result = filter_station(&feed, &station());

        assert_eq!(result.south, vec![StationItem::default()]);
    }

    #[test]
    fn test_entities_without_trip_update_are_skipped() {
        let mut feed = feed(vec![trip("7", vec![stop("719N", Some(100), None)])]);
        feed.entity.insert(
            0,
            FeedEntity {
                id: "alert-1".to_string(),
                ..Default::default()
            },
        );

        let result = filter_station(&feed, &station());

        assert_eq!(result.north.len(), 1);
    }

    #[test]
    fn test_results_keep_feed_order() {
        let feed = feed(vec![
            trip("7", vec![stop("719N", Some(300), None)]),
            trip("7", vec![stop("719N", Some(100), None)]),
            trip("7", vec![stop("719N", Some(200), None)]),
        ]);

        let result = filter_station(&feed, &station());

        let arrivals: Vec<_> = result.north.iter().map(|i| i.arrival).collect();
        assert_eq!(arrivals, vec![Some(300), Some(100), Some(200)]);
    }

    #[test]
    fn test_serializes_with_stop_times_keys() {
        let result = DirectionalResult {
            north: vec![StationItem {
                arrival: Some(1),
                departure: None,
            }],
            south: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "northStopTimes": [{ "arrival": 1, "departure": null }],
                "southStopTimes": []
            })
        );
    }
}
