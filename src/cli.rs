//! # Command-Line Interface Module
//!
//! Command-line interface for Tunemates, built with Clap derive macros.
//!
//! ## Commands
//!
//! - `serve`: Run the web application
//! - `similar`: Rank the listeners closest to a user
//! - `snapshot`: Recompute and persist the similarity snapshot
//! - `top-artists`: Most shared artists and who listens to them
//! - `users`: List the usernames in the corpus
//!
//! ## Examples
//!
//! ```bash
//! tunemates --corpus ./data users
//! tunemates similar alice --top-k 3
//! SPOTIPY_CLIENT_ID=... SPOTIPY_CLIENT_SECRET=... tunemates serve --port 5000
//! ```

use crate::encoder::EncodingPolicy;
use crate::server::RequestsLoggingLevel;
use crate::similarity::RankingOptions;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// The corpus and snapshot locations are global so every subcommand sees the
/// same data.
#[derive(Parser, Debug)]
#[command(name = "tunemates")]
#[command(about = "Tunemates: find listeners who share your taste")]
#[command(version)]
pub struct Args {
    /// Directory of JSON profile snapshots
    #[arg(
        long = "corpus",
        visible_alias = "data-dir",
        global = true,
        env = "TUNEMATES_DATA_DIR",
        default_value = "data"
    )]
    pub corpus: PathBuf,

    /// Similarity snapshot file (defaults to the platform data directory)
    #[arg(long, global = true, env = "TUNEMATES_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Ranking flags shared by the commands that compute similarity.
#[derive(clap::Args, Debug, Clone)]
pub struct RankingArgs {
    /// Maximum number of similar users to return
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Only keep scores strictly above this value
    #[arg(long, default_value_t = 0.5)]
    pub min_score: f64,

    /// Keep every score, ignoring --min-score
    #[arg(long)]
    pub no_threshold: bool,

    /// Feature encoding used to build the vectors
    #[arg(long, value_enum, default_value_t = EncodingPolicy::OneHot)]
    pub policy: EncodingPolicy,

    /// Slots per segment for the fixed-slot policy
    #[arg(long, default_value_t = 5)]
    pub slots: usize,
}

impl From<&RankingArgs> for RankingOptions {
    fn from(args: &RankingArgs) -> Self {
        RankingOptions {
            top_k: args.top_k,
            min_score: (!args.no_threshold).then_some(args.min_score),
            policy: args.policy,
            fixed_slots: args.slots,
        }
    }
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web application
    ///
    /// Loads the corpus and the similarity snapshot, then serves the OAuth
    /// login flow, the dashboard and the social routes until interrupted.
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,

        /// How much of each request to log
        #[arg(long, value_enum, default_value_t = RequestsLoggingLevel::Path)]
        logging_level: RequestsLoggingLevel,

        /// Minutes of inactivity before a login session expires
        #[arg(long, default_value_t = 1440)]
        session_idle_minutes: u64,

        /// OAuth client id of the music API application
        #[arg(long, env = "SPOTIPY_CLIENT_ID", hide_env_values = true)]
        client_id: String,

        /// OAuth client secret of the music API application
        #[arg(long, env = "SPOTIPY_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        /// Callback URL registered with the music API
        #[arg(
            long,
            env = "SPOTIPY_REDIRECT_URI",
            default_value = "http://127.0.0.1:5000/callback"
        )]
        redirect_uri: String,

        #[command(flatten)]
        ranking: RankingArgs,
    },

    /// Rank the listeners whose taste is closest to a user
    ///
    /// Scores are cosine similarities of the users' feature vectors, shown as
    /// percentages.
    Similar {
        /// Username from the corpus
        #[arg(value_hint = clap::ValueHint::Other)]
        username: String,

        #[command(flatten)]
        ranking: RankingArgs,
    },

    /// Recompute the similarity snapshot for every user and save it
    Snapshot {
        #[command(flatten)]
        ranking: RankingArgs,
    },

    /// Most shared artists across the corpus
    TopArtists {
        /// Number of artists to show
        #[arg(long, default_value_t = 5)]
        artists: usize,

        /// Listeners shown per artist
        #[arg(long, default_value_t = 5)]
        listeners: usize,
    },

    /// List the usernames in the corpus
    Users,

    /// Generate shell completions
    ///
    /// Usage: tunemates completion bash > ~/.local/share/bash-completion/completions/tunemates
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List usernames for completion (hidden command)
    #[command(hide = true)]
    CompleteUsers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_similar_defaults() {
        let args = Args::try_parse_from(["tunemates", "similar", "ana"]).unwrap();
        match args.command {
            Command::Similar { username, ranking } => {
                assert_eq!(username, "ana");
                let options = RankingOptions::from(&ranking);
                assert_eq!(options, RankingOptions::default());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_no_threshold_disables_min_score() {
        let args = Args::try_parse_from([
            "tunemates",
            "similar",
            "ana",
            "--no-threshold",
            "--policy",
            "fixed-slot",
        ])
        .unwrap();
        let Command::Similar { ranking, .. } = args.command else {
            panic!("expected similar");
        };
        let options = RankingOptions::from(&ranking);
        assert_eq!(options.min_score, None);
        assert_eq!(options.policy, EncodingPolicy::FixedSlot);
    }

    #[test]
    fn test_global_corpus_flag() {
        let args =
            Args::try_parse_from(["tunemates", "users", "--data-dir", "/tmp/corpus"]).unwrap();
        assert_eq!(args.corpus, PathBuf::from("/tmp/corpus"));
    }
}
