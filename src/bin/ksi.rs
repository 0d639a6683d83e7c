use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ksi_feed::feed::{
    CompositeObserver, DEFAULT_BASE_URL, DEFAULT_INDEX_END, FeedClient, FeedObserver, FeedOptions,
    FeedQuery, FeedSeverity, FileObserver, StdErrObserver,
};
use ksi_feed::frame::to_data_frame;
use ksi_feed::FeedResult;

#[derive(Parser, Debug)]
#[command(name = "ksi")]
#[command(about = "Fetch KSI collision records and print them as a typed table")]
#[command(version)]
struct Args {
    /// First index to fetch (inclusive)
    #[arg(long, default_value_t = 1)]
    start: i64,

    /// Last index to fetch (inclusive)
    #[arg(long, default_value_t = DEFAULT_INDEX_END)]
    end: i64,

    /// Feature layer `query` endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Log the query, response summary and column mapping
    #[arg(long)]
    debug: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Append fetch outcomes to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fetch failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> FeedResult<()> {
    let mut observers: Vec<Arc<dyn FeedObserver>> = Vec::new();
    if args.debug {
        observers.push(Arc::new(StdErrObserver));
    }
    if let Some(path) = &args.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let options = FeedOptions {
        query: FeedQuery {
            base_url: args.url,
            index_start: args.start,
            index_end: args.end,
            ..FeedQuery::default()
        },
        debug: args.debug,
        accept_invalid_certs: args.insecure,
        observer: (!observers.is_empty())
            .then(|| Arc::new(CompositeObserver::new(observers)) as Arc<dyn FeedObserver>),
        alert_at_or_above: FeedSeverity::Critical,
        ..Default::default()
    };

    let data = FeedClient::new(options)?.fetch()?;
    let df = to_data_frame(&data.dataset)?;

    for column in df.columns() {
        println!("{:<24} {}", column.name().as_str(), column.dtype());
    }
    println!("{df}");
    Ok(())
}
