//! CLI entry point for the NL rail disruption pipeline.
//!
//! Provides subcommands for ingesting a disruption feed (fetch or local
//! file, clean, append to the row store) and for producing the windowed
//! daily metrics report.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use nl_rail_disruptions::analyzers::aggregate::{WINDOW_DAYS, aggregate_window};
use nl_rail_disruptions::cleaner::clean_disruptions;
use nl_rail_disruptions::feed::parse_disruptions;
use nl_rail_disruptions::fetch::auth::ApiKey;
use nl_rail_disruptions::fetch::{BasicClient, fetch_bytes};
use nl_rail_disruptions::store::{RowStore, StoreConfig};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nl_rail_disruptions")]
#[command(about = "Ingest and analyze NL rail disruption feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch or read a disruption feed, clean it, and append it to the store
    Ingest {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// CSV file backing the row store
        #[arg(short, long, default_value = "data/disruptions.csv")]
        store: String,
    },
    /// Compute daily disruption metrics over the trailing window
    Report {
        /// CSV file backing the row store
        #[arg(short, long, default_value = "data/disruptions.csv")]
        store: String,

        /// Length of the trailing analysis window in days
        #[arg(short, long, default_value_t = WINDOW_DAYS)]
        window_days: i64,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/nl_rail_disruptions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nl_rail_disruptions.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { source, store } => ingest(&source, &store).await?,
        Commands::Report {
            store,
            window_days,
            output,
        } => report(&store, window_days, output.as_deref())?,
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP, sending
/// the `NS_API_KEY` subscription key when one is configured.
#[tracing::instrument(fields(source = %source))]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        match std::env::var("NS_API_KEY") {
            Ok(key) => {
                let client = ApiKey::subscription(BasicClient::new(), key);
                fetch_bytes(&client, source).await?
            }
            Err(_) => fetch_bytes(&BasicClient::new(), source).await?,
        }
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}

async fn ingest(source: &str, store_path: &str) -> Result<()> {
    let bytes = fetcher(source).await?;
    let records = parse_disruptions(&bytes)?;

    let rows = clean_disruptions(&records, Utc::now());
    info!(
        received = records.len(),
        kept = rows.len(),
        dropped = records.len() - rows.len(),
        "disruption batch cleaned"
    );

    let store = RowStore::new(StoreConfig {
        path: store_path.into(),
    });
    store.append_rows(&rows)?;
    info!(rows = rows.len(), store = store_path, "rows appended");

    Ok(())
}

fn report(store_path: &str, window_days: i64, output: Option<&str>) -> Result<()> {
    let since = Utc::now() - Duration::days(window_days);

    let store = RowStore::new(StoreConfig {
        path: store_path.into(),
    });
    let rows = store.fetch_rows(since)?;
    let metrics = aggregate_window(&rows, since);
    info!(
        rows = rows.len(),
        metric_rows = metrics.len(),
        window_days,
        "aggregation complete"
    );

    let json = serde_json::to_string_pretty(&metrics)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
