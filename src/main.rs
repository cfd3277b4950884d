use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use log::info;
use std::sync::Arc;
use std::time::Duration;

use tunemates::cli::{self, Command, RankingArgs};
use tunemates::completion;
use tunemates::config::{self, RuntimeConfig};
use tunemates::music_api::{HttpMusicApi, MusicApiConfig};
use tunemates::profile::ProfileStore;
use tunemates::server::{self, RequestsLoggingLevel, ServerConfig, ServerState};
use tunemates::similarity::{self, RankingOptions};
use tunemates::snapshot::SnapshotCache;
use tunemates::stats;

fn runtime_config(args: &cli::Args, ranking: Option<&RankingArgs>) -> Result<RuntimeConfig> {
    let config = RuntimeConfig::new(&args.corpus, args.snapshot.as_deref())?;
    Ok(match ranking {
        Some(ranking) => config.with_ranking(RankingOptions::from(ranking)),
        None => config,
    })
}

fn load_profiles(config: &RuntimeConfig) -> Result<ProfileStore> {
    ProfileStore::load_dir(&config.corpus_dir).with_context(|| {
        format!(
            "Could not load profiles. Point --corpus at a directory of JSON snapshots (currently {}).",
            config.corpus_dir.display()
        )
    })
}

fn print_similar(config: &RuntimeConfig, username: &str) -> Result<()> {
    let store = load_profiles(config)?;
    let Some(profile) = store.get(username) else {
        bail!("User '{username}' not found in {}", config.corpus_dir.display());
    };

    let similar = similarity::rank_similar(profile, &store, &config.ranking);
    if similar.is_empty() {
        println!("No listeners similar to {username}.");
        return Ok(());
    }

    println!("Listeners similar to {username}:");
    for (rank, result) in similar.iter().enumerate() {
        println!("{:>3}. {} ({:.1}%)", rank + 1, result.username, result.percent());
    }
    Ok(())
}

fn write_snapshot(config: &RuntimeConfig) -> Result<()> {
    let store = load_profiles(config)?;
    let mut cache = SnapshotCache::open(config.snapshot_path.clone(), config.ranking)?;
    cache.refresh(&store)?;

    info!("Similarity snapshot written to {}", config.snapshot_path.display());
    println!(
        "Saved similarity for {} users to {}",
        cache.snapshot().results.len(),
        config.snapshot_path.display()
    );
    Ok(())
}

fn print_top_artists(config: &RuntimeConfig, artists: usize, listeners: usize) -> Result<()> {
    let store = load_profiles(config)?;
    for entry in stats::top_artists(&store, artists, listeners) {
        println!(
            "{}: {} listeners ({})",
            entry.artist,
            entry.count,
            entry.top_users.join(", ")
        );
    }
    Ok(())
}

fn serve(
    config: RuntimeConfig,
    server_config: ServerConfig,
    api_config: MusicApiConfig,
) -> Result<()> {
    let store = load_profiles(&config)?;
    let cache = SnapshotCache::open(config.snapshot_path.clone(), config.ranking)?;
    let api = HttpMusicApi::new(api_config).context("Failed to build the music API client")?;
    let state = ServerState::new(server_config, store, cache, Arc::new(api));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(server::run_server(state))
}

/// Entry point: loads `.env`, initializes logging and routes commands.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug tunemates serve` - Enable debug logging
/// - `RUST_LOG=tunemates::server=info tunemates serve` - Module-specific logging
fn main() -> Result<()> {
    // before parsing, so clap's env fallbacks see the .env values
    config::load_dotenv();
    env_logger::init();

    let args = cli::Args::parse();

    match &args.command {
        Command::Serve {
            bind,
            port,
            logging_level,
            session_idle_minutes,
            client_id,
            client_secret,
            redirect_uri,
            ranking,
        } => {
            let config = runtime_config(&args, Some(ranking))?;
            let server_config = ServerConfig {
                bind: bind.clone(),
                port: *port,
                requests_logging_level: *logging_level,
                session_idle_timeout: Duration::from_secs(
                    session_idle_minutes.saturating_mul(60),
                ),
                ..ServerConfig::default()
            };
            let api_config = MusicApiConfig {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: redirect_uri.clone(),
                ..MusicApiConfig::default()
            };
            if *logging_level == RequestsLoggingLevel::None {
                info!("Request logging disabled");
            }
            serve(config, server_config, api_config)?;
        }
        Command::Similar { username, ranking } => {
            let config = runtime_config(&args, Some(ranking))?;
            print_similar(&config, username)?;
        }
        Command::Snapshot { ranking } => {
            let config = runtime_config(&args, Some(ranking))?;
            write_snapshot(&config)?;
        }
        Command::TopArtists { artists, listeners } => {
            let config = runtime_config(&args, None)?;
            print_top_artists(&config, *artists, *listeners)?;
        }
        Command::Users => {
            let config = runtime_config(&args, None)?;
            for username in load_profiles(&config)?.usernames() {
                println!("{username}");
            }
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
        Command::CompleteUsers => {
            completion::print_user_completions(&args.corpus);
        }
    }

    Ok(())
}
