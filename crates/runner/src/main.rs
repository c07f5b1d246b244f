use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{ArgAction, Parser};
use pitwall_gateway::{FileSource, GatewayConfig, OpenF1Client};
use pitwall_ports::TelemetrySource;
use pitwall_runner::{
    MinuteSelector, RunConfig, SessionPipeline, SessionReport, SessionSelector, resolve_session,
    season_summary, watch,
};
use pitwall_strategy::StrategyParams;

/// Env var that lowers the default log level to debug
const DEBUG_ENV: &str = "OF1_DEBUG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Pit-stop strategy advice from OpenF1 race telemetry", long_about = None)]
struct Cli {
    /// Season to analyse when no meeting or session is given
    #[arg(long)]
    year: Option<i32>,

    /// Analyse the last race session of this meeting
    #[arg(long, alias = "meeting_key")]
    meeting_key: Option<i64>,

    /// Analyse this session (accepts `latest`)
    #[arg(long, alias = "session_key")]
    session_key: Option<String>,

    /// Print advice for every driver, not just the leader
    #[arg(long, action = ArgAction::SetTrue)]
    all: bool,

    /// Absolute UTC minute, e.g. 2024-05-05T20:30:00Z
    #[arg(long, conflicts_with_all = ["tplus", "lap"])]
    minute: Option<String>,

    /// Offset from the actual start, HH:MM[:SS]
    #[arg(long, conflicts_with = "lap")]
    tplus: Option<String>,

    /// Start of lap L
    #[arg(long)]
    lap: Option<u32>,

    /// Re-run periodically (live)
    #[arg(long, action = ArgAction::SetTrue)]
    watch: bool,

    /// Seconds between live runs (minimum 9)
    #[arg(long, default_value_t = 12)]
    poll: u64,

    /// Summarise every race of --year
    #[arg(long, action = ArgAction::SetTrue)]
    summary_year: bool,

    /// JSON file overriding strategy parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Read endpoint dumps from <dir>/<endpoint>.json instead of the API
    #[arg(long)]
    replay: Option<PathBuf>,
}

impl Cli {
    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }

    fn session_selector(&self) -> SessionSelector {
        match (&self.session_key, self.meeting_key) {
            (Some(key), _) => SessionSelector::Key(key.clone()),
            (None, Some(meeting)) => SessionSelector::Meeting(meeting),
            (None, None) => SessionSelector::Year(self.year()),
        }
    }

    fn minute_selector(&self) -> Result<MinuteSelector> {
        let selector = match (&self.minute, &self.tplus, self.lap) {
            (Some(minute), _, _) => MinuteSelector::at(minute)?,
            (None, Some(tplus), _) => MinuteSelector::tplus(tplus)?,
            (None, None, Some(lap)) => MinuteSelector::Lap(lap),
            (None, None, None) => MinuteSelector::Last,
        };
        Ok(selector)
    }
}

fn init_logging() {
    let debug = std::env::var(DEBUG_ENV).is_ok_and(|v| v.trim() == "1");
    let default = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn build_source(cli: &Cli) -> Result<Arc<dyn TelemetrySource>> {
    let source: Arc<dyn TelemetrySource> = match &cli.replay {
        Some(dir) => {
            log::info!("Replaying from {}", dir.display());
            Arc::new(FileSource::new(dir))
        }
        None => {
            let config = GatewayConfig::from_env();
            log::info!("Using OpenF1 at {}", config.base_url);
            Arc::new(OpenF1Client::new(config).context("failed to build HTTP client")?)
        }
    };
    Ok(source)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let params = match &cli.params {
        Some(path) => StrategyParams::from_file(path)
            .with_context(|| format!("failed to load params from {}", path.display()))?,
        None => StrategyParams::default(),
    };
    let pipeline = SessionPipeline::new(params);
    let source = build_source(&cli)?;

    if cli.summary_year && cli.session_key.is_none() && cli.meeting_key.is_none() {
        let rows = season_summary(source.as_ref(), &pipeline, cli.year()).await?;
        return print_json(&rows);
    }

    let minute = cli.minute_selector()?;
    let meta = resolve_session(source.as_ref(), &cli.session_selector()).await?;
    log::info!(
        "Session {} ({}) of meeting {}",
        meta.session_key,
        meta.session_name,
        meta.meeting_key
    );

    if cli.watch {
        let config = RunConfig::default()
            .with_poll_secs(cli.poll)
            .with_all_drivers(cli.all);
        watch(source.as_ref(), &pipeline, &meta, &minute, &config, |report| {
            if let Err(e) = print_json(&report) {
                log::error!("Failed to write report: {}", e);
            }
        })
        .await;
        return Ok(());
    }

    let analysis = pipeline.run(source.as_ref(), meta).await?;
    let report = SessionReport::build(&pipeline, &analysis, &minute, cli.all)?;
    print_json(&report)
}
