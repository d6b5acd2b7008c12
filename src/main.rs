use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, Command};
use colored::*;
use url::Url;

use fleetmon::core::{FeedRuntime, TelemetryStore};
use fleetmon::ui::run_dashboard;

const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:9100/telemetry";

fn main() -> Result<()> {
    fleetmon::init_logging();

    let matches = Command::new("fleetmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal dashboard for per-host and per-container telemetry streams")
        .subcommand(
            Command::new("watch")
                .about("Watch a live telemetry feed")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .value_name("URL")
                        .help("WebSocket URL of the telemetry feed")
                        .default_value(DEFAULT_FEED_URL),
                )
                .arg(
                    Arg::new("tick-ms")
                        .long("tick-ms")
                        .help("UI refresh interval in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay recorded snapshots from a file (one JSON message per line)")
                .arg(
                    Arg::new("file")
                        .help("Path to the snapshot file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .help("Delay between replayed snapshots in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("3000"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("watch", sub)) => {
            let url = Url::parse(sub.get_one::<String>("url").expect("has default"))?;
            let tick_ms = *sub.get_one::<u64>("tick-ms").expect("has default");
            run_watch(url, tick_ms)
        }
        Some(("replay", sub)) => {
            let path = PathBuf::from(sub.get_one::<String>("file").expect("required"));
            let interval_ms = *sub.get_one::<u64>("interval-ms").expect("has default");
            run_replay(path, interval_ms)
        }
        _ => {
            // No subcommand: watch the default feed
            run_watch(Url::parse(DEFAULT_FEED_URL)?, 1000)
        }
    };

    if let Err(ref e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
    }
    result
}

fn run_watch(url: Url, tick_ms: u64) -> Result<()> {
    let store = Arc::new(TelemetryStore::new());
    let feed = FeedRuntime::websocket(Arc::clone(&store), url)?;

    let result = run_dashboard(Arc::clone(&store), Duration::from_millis(tick_ms));

    feed.shutdown();
    store.dispose();
    result
}

fn run_replay(path: PathBuf, interval_ms: u64) -> Result<()> {
    let store = Arc::new(TelemetryStore::new());
    let feed = FeedRuntime::replay(
        Arc::clone(&store),
        path,
        Duration::from_millis(interval_ms),
    )?;

    let result = run_dashboard(Arc::clone(&store), Duration::from_millis(500));

    feed.shutdown();
    store.dispose();
    result
}
