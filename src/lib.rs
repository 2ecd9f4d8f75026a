//! Live arrival times for one station from a GTFS Realtime feed.
//!
//! A [`Scheduler`] polls a [`FeedSource`], decodes the payload, keeps the
//! configured route's stop-time updates at the station's two platforms and
//! publishes them as ascending "minutes until arrival" lists.

pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod projector;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}

pub use config::{Direction, FeedConfig, StationConfig};
pub use error::{Error, Result};
pub use fetch::{FeedClient, FeedSource, FileSource};
pub use filter::{DirectionalResult, StationItem, filter_station};
pub use pipeline::{ArrivalBoard, board_from_feed, fetch_station_items, poll_once};
pub use projector::{ArrivalMinutes, NullArrivalPolicy, project};
pub use scheduler::{ArrivalSink, Scheduler};
