//! Turns predicted arrival timestamps into "minutes from now".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Direction;
use crate::error::{Error, Result};
use crate::filter::{DirectionalResult, StationItem};

/// How to treat a station item whose arrival time is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullArrivalPolicy {
    /// Show the trip as due now (0 minutes).
    #[default]
    DueNow,
    /// Leave the trip out of the list.
    Exclude,
}

impl FromStr for NullArrivalPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "due-now" => Ok(Self::DueNow),
            "exclude" => Ok(Self::Exclude),
            other => Err(Error::config(format!(
                "unknown null arrival policy '{other}' (expected 'due-now' or 'exclude')"
            ))),
        }
    }
}

impl fmt::Display for NullArrivalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DueNow => "due-now",
            Self::Exclude => "exclude",
        })
    }
}

/// Ascending minutes until each arrival, one list per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalMinutes {
    pub north: Vec<i64>,
    pub south: Vec<i64>,
}

impl ArrivalMinutes {
    pub fn get(&self, direction: Direction) -> &[i64] {
        match direction {
            Direction::North => &self.north,
            Direction::South => &self.south,
        }
    }
}

/// Whole minutes from `now` until `arrival`, rounded half away from zero.
///
/// Returns `None` when the arrival is missing and `policy` excludes it, or
/// when `arrival - now` does not fit in an `i64` (an arrival that far out is
/// treated as already passed). Negative values are returned as-is; callers
/// drop them.
pub fn minutes_until(arrival: Option<i64>, now: i64, policy: NullArrivalPolicy) -> Option<i64> {
    match (arrival, policy) {
        (Some(arrival), _) => arrival
            .checked_sub(now)
            .map(|secs| (secs as f64 / 60.0).round() as i64),
        (None, NullArrivalPolicy::DueNow) => Some(0),
        (None, NullArrivalPolicy::Exclude) => None,
    }
}

/// Projects one direction's items: past arrivals are dropped and the rest
/// sorted ascending. Equal values are kept.
pub fn project_direction(items: &[StationItem], now: i64, policy: NullArrivalPolicy) -> Vec<i64> {
    let mut minutes: Vec<i64> = items
        .iter()
        .filter_map(|item| minutes_until(item.arrival, now, policy))
        .filter(|m| *m >= 0)
        .collect();
    minutes.sort_unstable();
    minutes
}

pub fn project(
    result: &DirectionalResult,
    now: DateTime<Utc>,
    policy: NullArrivalPolicy,
) -> ArrivalMinutes {
    let now = now.timestamp();
    ArrivalMinutes {
        north: project_direction(result.get(Direction::North), now, policy),
        south: project_direction(result.get(Direction::South), now, policy),
    }
}
