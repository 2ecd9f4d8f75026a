//! One poll cycle: fetch, decode, filter, project.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::StationConfig;
use crate::error::Result;
use crate::fetch::FeedSource;
use crate::filter::{DirectionalResult, filter_station};
use crate::gtfs_rt::FeedMessage;
use crate::parser::parse_feed;
use crate::projector::{ArrivalMinutes, NullArrivalPolicy, project};

/// The unit handed to consumers after each successful cycle.
///
/// `updated_at` is the instant the minutes were computed against and
/// `feed_timestamp` the producer's header timestamp, so a consumer can tell
/// how stale the board is when later cycles keep failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalBoard {
    pub station_id: String,
    pub route_id: String,
    pub minutes: ArrivalMinutes,
    pub updated_at: DateTime<Utc>,
    pub feed_timestamp: Option<DateTime<Utc>>,
}

/// Builds the board for `feed` as seen at `now`. Pure; the same inputs always
/// give the same board.
pub fn board_from_feed(
    feed: &FeedMessage,
    station: &StationConfig,
    now: DateTime<Utc>,
    policy: NullArrivalPolicy,
) -> ArrivalBoard {
    let items = filter_station(feed, station);
    debug!(
        north = items.north.len(),
        south = items.south.len(),
        "Station items extracted"
    );

    ArrivalBoard {
        station_id: station.station_id().to_string(),
        route_id: station.route_id().to_string(),
        minutes: project(&items, now, policy),
        updated_at: now,
        feed_timestamp: feed
            .header
            .timestamp
            .and_then(|t| i64::try_from(t).ok())
            .and_then(|t| DateTime::from_timestamp(t, 0)),
    }
}

async fn fetch_feed<S: FeedSource + ?Sized>(source: &S) -> Result<FeedMessage> {
    let bytes = source.fetch().await?;
    let feed = parse_feed(&bytes)?;
    debug!(entity_count = feed.entity.len(), "Feed parsed");
    Ok(feed)
}

/// Fetches the feed and returns the station's raw, unprojected items.
pub async fn fetch_station_items<S: FeedSource + ?Sized>(
    source: &S,
    station: &StationConfig,
) -> Result<DirectionalResult> {
    let feed = fetch_feed(source).await?;
    Ok(filter_station(&feed, station))
}

/// Runs one complete cycle against `source`, projecting against the clock
/// at the moment the feed has been decoded.
pub async fn poll_once<S: FeedSource + ?Sized>(
    source: &S,
    station: &StationConfig,
    policy: NullArrivalPolicy,
) -> Result<ArrivalBoard> {
    let feed = fetch_feed(source).await?;
    Ok(board_from_feed(&feed, station, Utc::now(), policy))
}
