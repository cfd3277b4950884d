//! Find listeners who share your taste.
//!
//! Tunemates compares users' listening profiles (top artists, top songs,
//! genres) from a music-streaming API and ranks the most similar listeners.
//! Around that core sits a small social web app: follows, direct messages,
//! comments, likes, ratings, groups and playlist pass-through.
//!
//! Core modules:
//! - [`profile`] - User profiles and the JSON snapshot corpus
//! - [`vocabulary`] - Stable index assignment for artists, songs and genres
//! - [`encoder`] - Profile to feature vector encodings
//! - [`similarity`] - Cosine similarity and top-K ranking
//! - [`snapshot`] - Persisted similarity results
//!
//! ### Supporting Modules
//!
//! - [`stats`] - Artist popularity across the corpus
//! - [`music_api`] - OAuth-protected music API client
//! - [`social`] / [`groups`] - Social state owned by the server
//! - [`server`] - HTTP routes, sessions and request logging
//! - [`config`] - Data directory and runtime configuration
//! - [`cli`] / [`completion`] - Command-line interface and shell completions
//!
//! ## Quick Start Example
//!
//! ```
//! use tunemates::profile::{ProfileStore, UserProfile};
//! use tunemates::similarity::{rank_similar, RankingOptions};
//!
//! let store: ProfileStore = [
//!     UserProfile::new("ana").with_artists(["Radiohead", "Bjork"]),
//!     UserProfile::new("ben").with_artists(["Radiohead", "Bjork"]),
//!     UserProfile::new("cleo").with_artists(["ABBA"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let ana = store.get("ana").unwrap();
//! let similar = rank_similar(ana, &store, &RankingOptions::default());
//!
//! assert_eq!(similar.len(), 1);
//! assert_eq!(similar[0].username, "ben");
//! ```
//!
//! ## Similarity
//!
//! Every computation builds a [`vocabulary::Vocabulary`] from all known
//! profiles, with keys sorted so indices are reproducible. Profiles are
//! one-hot encoded over `[artists | songs | genres]` and compared by cosine
//! similarity. Results keep scores strictly above 0.5 and at most five users.
//!
//! ## Error Handling
//!
//! Library and CLI code returns `anyhow::Result` with context. The HTTP layer,
//! the music API client and the social rules use typed `thiserror` errors.

pub mod cli;
pub mod completion;
pub mod config;
pub mod encoder;
pub mod groups;
pub mod music_api;
pub mod profile;
pub mod server;
pub mod similarity;
pub mod snapshot;
pub mod social;
pub mod stats;
pub mod vocabulary;
