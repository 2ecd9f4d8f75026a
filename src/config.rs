//! Station and feed configuration.
//!
//! Both types are validated once at startup; a bad value is an
//! [`Error::Config`] and nothing is polled.

use std::time::Duration;

use reqwest::Url;

use crate::error::{Error, Result};

/// NYCT numbered-lines feed (1-7, S), which carries the 7 train.
pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs";
/// 103 St - Corona Plaza.
pub const DEFAULT_STATION_ID: &str = "719";
pub const DEFAULT_ROUTE_ID: &str = "7";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Header the MTA endpoints read the credential from.
pub const API_KEY_HEADER: &str = "x-api-key";

/// One of the two travel directions served by a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::North, Direction::South];

    /// Suffix appended to the parent station id to form the platform stop id.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::South => "S",
        }
    }
}

/// The station and route whose arrivals are tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    station_id: String,
    route_id: String,
    north_stop_id: String,
    south_stop_id: String,
}

impl StationConfig {
    pub fn new(station_id: impl Into<String>, route_id: impl Into<String>) -> Result<Self> {
        let station_id = station_id.into().trim().to_string();
        let route_id = route_id.into().trim().to_string();

        if station_id.is_empty() {
            return Err(Error::config("station id must not be empty"));
        }
        if route_id.is_empty() {
            return Err(Error::config("route id must not be empty"));
        }

        Ok(Self {
            north_stop_id: format!("{station_id}{}", Direction::North.suffix()),
            south_stop_id: format!("{station_id}{}", Direction::South.suffix()),
            station_id,
            route_id,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Platform stop id for `direction`, e.g. `719N`.
    pub fn stop_id(&self, direction: Direction) -> &str {
        match direction {
            Direction::North => &self.north_stop_id,
            Direction::South => &self.south_stop_id,
        }
    }
}

/// Where and how the feed is fetched.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: Url,
    /// Sent as-is in the credential header. `None` sends an empty value and
    /// leaves rejection to the upstream.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl FeedConfig {
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::config(format!("feed url '{url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "feed url must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if timeout.is_zero() {
            return Err(Error::config("request timeout must be greater than zero"));
        }

        Ok(Self {
            url,
            api_key,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_derives_directional_stop_ids() {
        let station = StationConfig::new("719", "7").unwrap();
        assert_eq!(station.stop_id(Direction::North), "719N");
        assert_eq!(station.stop_id(Direction::South), "719S");
        assert_eq!(station.route_id(), "7");
    }

    #[test]
    fn test_station_trims_whitespace() {
        let station = StationConfig::new(" 719 ", "7\n").unwrap();
        assert_eq!(station.station_id(), "719");
        assert_eq!(station.stop_id(Direction::North), "719N");
        assert_eq!(station.route_id(), "7");
    }

    #[test]
    fn test_station_rejects_blank_ids() {
        assert!(matches!(StationConfig::new("", "7"), Err(Error::Config(_))));
        assert!(matches!(StationConfig::new("719", "  "), Err(Error::Config(_))));
    }

    #[test]
    fn test_feed_config_accepts_default_url() {
        let config = FeedConfig::new(DEFAULT_FEED_URL, None, DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(config.url.host_str(), Some("api-endpoint.mta.info"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_feed_config_rejects_bad_url() {
        let err = FeedConfig::new("not a url", None, DEFAULT_REQUEST_TIMEOUT).unwrap_err();
        assert_eq!(err.kind(), "config");

        let err = FeedConfig::new("ftp://example.com/feed", None, DEFAULT_REQUEST_TIMEOUT)
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_feed_config_rejects_zero_timeout() {
        assert!(FeedConfig::new(DEFAULT_FEED_URL, None, Duration::ZERO).is_err());
    }
}
