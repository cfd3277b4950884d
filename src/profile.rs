//! # Profile Module
//!
//! User profiles and the corpus they are loaded from.
//!
//! A profile is what the music API tells us about a listener: their top artists,
//! their top songs and the genres attached to those artists. Profiles are read
//! once from a directory of JSON snapshot files and later replaced in place when
//! a live profile is fetched for a logged-in user.
//!
//! ## Snapshot Files
//!
//! Every `*.json` file in the corpus directory holds either a single profile
//! object or an array of them:
//!
//! ```json
//! {
//!   "username": "ana",
//!   "top_artists": ["Radiohead", "Portishead"],
//!   "top_songs": ["Reckoner", "Roads"],
//!   "genres": ["trip hop", "art rock"]
//! }
//! ```
//!
//! Files are read in file-name order. When two files describe the same username
//! the later one wins.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// A listener's taste as reported by the music API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identifier of the user on the music service
    pub username: String,
    /// Top artists, most listened first
    #[serde(default)]
    pub top_artists: Vec<String>,
    /// Top tracks, most listened first
    #[serde(default)]
    pub top_songs: Vec<String>,
    /// Genres of the top artists
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

impl UserProfile {
    /// Create an empty profile for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            top_artists: Vec::new(),
            top_songs: Vec::new(),
            genres: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_artists = artists.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_songs<I, S>(mut self, songs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_songs = songs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// True when the profile carries no listening data at all.
    pub fn is_empty(&self) -> bool {
        self.top_artists.is_empty() && self.top_songs.is_empty() && self.genres.is_empty()
    }
}

/// On-disk layout of a single snapshot file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many(Vec<UserProfile>),
    One(UserProfile),
}

impl SnapshotFile {
    fn into_profiles(self) -> Vec<UserProfile> {
        match self {
            SnapshotFile::Many(profiles) => profiles,
            SnapshotFile::One(profile) => vec![profile],
        }
    }
}

/// All known profiles, keyed and iterated by username.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, UserProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` snapshot file found directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be read or when any snapshot file is not
    /// valid profile JSON. The error names the offending file.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read profile directory {}", dir.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut store = Self::new();
        for file in &files {
            let count = store.load_file(file)?;
            debug!("Loaded {count} profiles from {}", file.display());
        }

        info!(
            "Loaded {} profiles from {} snapshot files in {}",
            store.len(),
            files.len(),
            dir.display()
        );
        Ok(store)
    }

    /// Load one snapshot file into the store, returning how many profiles it held.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
        let parsed: SnapshotFile = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed profile JSON in {}", path.display()))?;

        let profiles = parsed.into_profiles();
        let count = profiles.len();
        for profile in profiles {
            if let Some(previous) = self.insert(profile) {
                warn!(
                    "Profile '{}' redefined in {}, replacing earlier entry",
                    previous.username,
                    path.display()
                );
            }
        }
        Ok(count)
    }

    /// Insert or replace a profile, returning the one it replaced.
    pub fn insert(&mut self, profile: UserProfile) -> Option<UserProfile> {
        self.profiles.insert(profile.username.clone(), profile)
    }

    pub fn get(&self, username: &str) -> Option<&UserProfile> {
        self.profiles.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.profiles.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProfile> {
        self.profiles.values()
    }
}

impl FromIterator<UserProfile> for ProfileStore {
    fn from_iter<T: IntoIterator<Item = UserProfile>>(iter: T) -> Self {
        let mut store = Self::new();
        for profile in iter {
            store.insert(profile);
        }
        store
    }
}
