//! Rendering and persistence of published arrival boards.
//!
//! Supports a one-line summary, JSON printing, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::pipeline::ArrivalBoard;

/// One CSV row per published board. Minute lists are `;`-joined so the row
/// stays flat.
#[derive(Debug, Serialize)]
pub struct BoardRecord {
    pub updated_at: DateTime<Utc>,
    pub feed_timestamp: Option<DateTime<Utc>>,
    pub station_id: String,
    pub route_id: String,
    pub next_north: Option<i64>,
    pub next_south: Option<i64>,
    pub north: String,
    pub south: String,
}

impl BoardRecord {
    pub fn from_board(board: &ArrivalBoard) -> Self {
        Self {
            updated_at: board.updated_at,
            feed_timestamp: board.feed_timestamp,
            station_id: board.station_id.clone(),
            route_id: board.route_id.clone(),
            next_north: board.minutes.north.first().copied(),
            next_south: board.minutes.south.first().copied(),
            north: join_minutes(&board.minutes.north),
            south: join_minutes(&board.minutes.south),
        }
    }
}

fn join_minutes(minutes: &[i64]) -> String {
    minutes
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

/// Human-readable single line, e.g. `719 (7) N: 2, 6 min | S: none`.
pub fn render_board(board: &ArrivalBoard) -> String {
    let side = |minutes: &[i64]| {
        if minutes.is_empty() {
            "none".to_string()
        } else {
            format!(
                "{} min",
                minutes
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    };
    format!(
        "{} ({}) N: {} | S: {}",
        board.station_id,
        board.route_id,
        side(&board.minutes.north),
        side(&board.minutes.south)
    )
}

/// Prints any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`BoardRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &BoardRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
