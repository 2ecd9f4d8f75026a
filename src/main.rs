//! CLI entry point for the station arrivals board.
//!
//! `watch` polls the feed on an interval and logs every board; `once` runs a
//! single cycle against a URL or a saved payload and prints the result.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use station_arrivals::config::{
    DEFAULT_FEED_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_ROUTE_ID,
    DEFAULT_STATION_ID,
};
use station_arrivals::output::{BoardRecord, append_record, print_json, render_board};
use station_arrivals::{
    ArrivalBoard, FeedClient, FeedConfig, FeedSource, FileSource, NullArrivalPolicy, Scheduler,
    StationConfig, fetch_station_items, poll_once,
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_arrivals")]
#[command(about = "Live arrival times for one subway station", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed on an interval and log each arrivals board
    Watch {
        #[command(flatten)]
        station: StationArgs,

        /// GTFS-RT trip updates endpoint
        #[arg(short, long, default_value = DEFAULT_FEED_URL)]
        url: String,

        /// Seconds between polls
        #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval: u64,

        /// Optional: CSV file to append every published board to
        #[arg(long)]
        record: Option<String>,
    },
    /// Run a single cycle from a file or URL and print the result as JSON
    Once {
        /// Path to a saved feed payload or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = DEFAULT_FEED_URL)]
        source: String,

        #[command(flatten)]
        station: StationArgs,

        /// Print the unprojected stop times instead of minutes
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
}

#[derive(Args)]
struct StationArgs {
    /// Parent station id; platforms are <id>N and <id>S
    #[arg(short, long, default_value = DEFAULT_STATION_ID)]
    station: String,

    /// Route id whose trips are kept
    #[arg(short, long, default_value = DEFAULT_ROUTE_ID)]
    route: String,

    /// Trips without a predicted arrival: due-now or exclude
    #[arg(long, default_value_t = NullArrivalPolicy::DueNow)]
    null_arrival: NullArrivalPolicy,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout: u64,
}

impl StationArgs {
    fn station_config(&self) -> station_arrivals::Result<StationConfig> {
        StationConfig::new(&self.station, &self.route)
    }

    fn feed_config(&self, url: &str) -> station_arrivals::Result<FeedConfig> {
        let api_key = std::env::var("API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("API_KEY is not set; the feed endpoint may reject requests");
        }
        FeedConfig::new(url, api_key, Duration::from_secs(self.timeout))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            station,
            url,
            interval,
            record,
        } => {
            let station_config = station.station_config()?;
            let client = FeedClient::from_config(&station.feed_config(&url)?)?;

            let sink = move |board: &ArrivalBoard| {
                info!(board = %render_board(board), "Arrivals updated");
                // Blocking write on the cycle task: one short row per poll.
                if let Some(path) = &record {
                    if let Err(e) = append_record(path, &BoardRecord::from_board(board)) {
                        error!(path = %path, error = %e, "Failed to record arrivals");
                    }
                }
            };

            let scheduler = Scheduler::new(client, station_config, station.null_arrival, sink);
            scheduler.start(Duration::from_secs(interval))?;

            info!("Polling. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await?;
            scheduler.stop();

            if let Some(board) = scheduler.latest() {
                info!(updated_at = %board.updated_at, board = %render_board(&board), "Last arrivals");
            }
        }
        Commands::Once {
            source,
            station,
            raw,
        } => {
            let station_config = station.station_config()?;
            if source.starts_with("http") {
                let client = FeedClient::from_config(&station.feed_config(&source)?)?;
                run_once(&client, &station_config, station.null_arrival, raw).await?;
            } else {
                let file = FileSource::new(&source);
                run_once(&file, &station_config, station.null_arrival, raw).await?;
            }
        }
    }

    Ok(())
}

/// Colored stderr output plus a JSON daily rolling log file. The returned
/// guard flushes the file writer on drop.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_arrivals.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_arrivals.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

#[tracing::instrument(skip(source, station), fields(station = station.station_id()))]
async fn run_once<S: FeedSource>(
    source: &S,
    station: &StationConfig,
    policy: NullArrivalPolicy,
    raw: bool,
) -> Result<()> {
    if raw {
        let items = fetch_station_items(source, station).await?;
        print_json(&items)?;
    } else {
        let board = poll_once(source, station, policy).await?;
        info!(board = %render_board(&board), "Arrivals");
        print_json(&board)?;
    }
    Ok(())
}
