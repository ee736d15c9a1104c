//! CLI entry point for the popularity rater.
//!
//! Resolves a Spotify playlist or artist, aggregates the popularity of its
//! tracks and prints a report. A local JSON batch can be analyzed without
//! touching the network.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use popularity_rater::analyzers::analyzer::{
    AnalysisRequest, Report, analyze_request, report_from_collection,
};
use popularity_rater::analyzers::grade::TierPreset;
use popularity_rater::analyzers::types::RawTrackEntry;
use popularity_rater::config::{RatingOptions, Settings};
use popularity_rater::fetch::RetryPolicy;
use popularity_rater::infra::keys::SpotifyCredentials;
use popularity_rater::infra::spotify::SpotifyClient;
use popularity_rater::output::{OutputFormat, append_records, render};
use popularity_rater::services::catalog_api::{AnalysisKind, Collection};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "popularity_rater")]
#[command(about = "Rate the track popularity of Spotify playlists and artists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON settings file (tier preset or custom tiers, thresholds, market, retry)
    #[arg(long, global = true)]
    config: Option<String>,

    /// JSON secrets file with {"spotify": {"client_id", "client_secret"}}
    #[arg(long, global = true)]
    secrets: Option<String>,

    /// Built-in tier table, overrides the settings file
    #[arg(long, global = true, value_enum)]
    preset: Option<TierPreset>,

    /// Tracks scoring below this are listed as high-risk
    #[arg(long, global = true)]
    threshold: Option<i32>,

    /// Market used for artist top tracks (e.g., "US", "IT")
    #[arg(long, global = true)]
    market: Option<String>,

    /// Fail on the first transient catalog error instead of retrying
    #[arg(long, global = true)]
    no_retry: bool,

    /// Report format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// CSV file to append per-track rows to
    #[arg(long, global = true)]
    csv: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a playlist from its URL, URI or id
    Playlist {
        #[arg(value_name = "URL_OR_ID")]
        source: String,
    },
    /// Analyze an artist's top tracks from a URL, URI or name
    Artist {
        #[arg(value_name = "NAME_OR_URL")]
        source: String,
    },
    /// Analyze a local JSON array of {id, name, artist, popularity} entries
    File {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Print the active tier table
    Tiers,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/popularity_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("popularity_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let options = settings.rating_options()?;

    match &cli.command {
        Commands::Playlist { source } => {
            let request = AnalysisRequest::new(AnalysisKind::Playlist, source);
            let report = run_remote(&request, &cli, &settings, &options).await?;
            emit(&report, &cli)?;
        }
        Commands::Artist { source } => {
            let request = AnalysisRequest::new(AnalysisKind::Artist, source);
            let report = run_remote(&request, &cli, &settings, &options).await?;
            emit(&report, &cli)?;
        }
        Commands::File { path } => {
            let report = run_file(path, &options)?;
            emit(&report, &cli)?;
        }
        Commands::Tiers => {
            print!("{}", options.scheme);
        }
    }

    Ok(())
}

/// Settings file (if any) with CLI flags applied on top.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(preset) = cli.preset {
        settings.preset = preset;
        settings.tiers = None;
    }
    if let Some(threshold) = cli.threshold {
        settings.low_score_threshold = threshold;
    }
    if let Some(market) = &cli.market {
        settings.market = market.clone();
    }
    if cli.no_retry {
        settings.retry = RetryPolicy::none();
    }

    Ok(settings)
}

/// Authenticates against Spotify and analyzes one playlist or artist.
#[tracing::instrument(skip_all, fields(kind = %request.kind))]
async fn run_remote(
    request: &AnalysisRequest,
    cli: &Cli,
    settings: &Settings,
    options: &RatingOptions,
) -> Result<Report> {
    let credentials = SpotifyCredentials::resolve(cli.secrets.as_deref())?;
    let client = SpotifyClient::connect(&credentials, &settings.market, settings.retry).await?;

    match analyze_request(&client, request, options).await {
        Ok(report) => Ok(report),
        Err(e) => {
            error!(error = %e, identifier = %request.identifier, "Analysis failed");
            Err(e.into())
        }
    }
}

/// Analyzes a local JSON batch, treated as a playlist named after the file.
fn run_file(path: &str, options: &RatingOptions) -> Result<Report> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
    let entries: Vec<RawTrackEntry> =
        serde_json::from_str(&content).with_context(|| format!("failed to parse '{path}'"))?;

    info!(path, entries = entries.len(), "Loaded local batch");

    let name = Path::new(path)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(path)
        .to_string();

    let collection = Collection {
        kind: AnalysisKind::Playlist,
        name,
        image_url: None,
        entries,
    };
    Ok(report_from_collection(collection, options))
}

/// Renders the report to stdout or a file and appends CSV rows if requested.
fn emit(report: &Report, cli: &Cli) -> Result<()> {
    let rendered = render(report, cli.format)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("failed to write '{path}'"))?;
            info!(path = %path, "Report written");
        }
        None => print!("{rendered}"),
    }

    if let Some(path) = &cli.csv {
        append_records(path, report)?;
        info!(path = %path, rows = report.tracks.len(), "CSV rows appended");
    }

    Ok(())
}
