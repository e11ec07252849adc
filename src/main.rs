use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use lumena::{
    common::{logger, types::AnyResult},
    configs::Config,
    library::InMemoryTrackStore,
    log_println,
    protocol::tracks::TrackCandidate,
    search::SearchAggregator,
    sources::YouTubeSource,
};

#[derive(Parser, Debug)]
#[command(name = "lumena")]
#[command(about = "Search YouTube and the local library, resolve playable audio streams")]
#[command(version)]
struct Args {
    /// Config file; defaults to config.toml, then config.default.toml
    #[arg(short, long, env = "LUMENA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the local library and YouTube
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Resolve a video id or YouTube URL to a playable stream URL
    Resolve { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> AnyResult<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("{}, using built-in defaults", e);
            Config::default()
        }),
    };
    logger::init(&config);

    let source = Arc::new(YouTubeSource::from_config(&config.youtube)?);

    let result = match args.command {
        Command::Resolve { id } => {
            source.check_ytdlp().await;
            resolve(&source, &id).await
        }
        Command::Search { query } => search(&config, source.clone(), &query.join(" ")).await,
    };

    source.shutdown();
    result
}

async fn resolve(source: &YouTubeSource, id: &str) -> AnyResult<()> {
    let stream = source.resolve(id).await?;
    log_println!("{}", stream.url);
    log_println!("resolved by {}", stream.resolved_by);
    Ok(())
}

async fn search(config: &Config, source: Arc<YouTubeSource>, query: &str) -> AnyResult<()> {
    let store = Arc::new(InMemoryTrackStore::load(&config.library.path)?);
    let aggregator = SearchAggregator::new(store, source);

    let session = aggregator.search(query);
    if !session.local_results().is_empty() {
        log_println!("Local:");
        for track in session.local_results() {
            log_println!("  {}", describe(track));
        }
    }

    let results = session.finish().await?;
    log_println!("Results for \"{}\":", query);
    for (i, track) in results.iter().enumerate() {
        log_println!("{:>3}. {}", i + 1, describe(track));
    }
    Ok(())
}

fn describe(track: &TrackCandidate) -> String {
    let secs = track.duration_ms / 1000;
    format!(
        "{} - {} [{}:{:02}] {}",
        track.title,
        track.artist,
        secs / 60,
        secs % 60,
        track
            .watch_url()
            .unwrap_or_else(|| track.playback_reference.as_str().to_string())
    )
}
