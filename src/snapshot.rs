//! # Similarity Snapshot
//!
//! Computed similarity results persisted to a single JSON file and reloaded at
//! process start.
//!
//! Writes go through a temporary file in the same directory followed by a
//! rename, so a crash mid-write never leaves a truncated snapshot behind.

use crate::profile::ProfileStore;
use crate::similarity::{self, RankingOptions, SimilarityResult};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Ranked results for every known user at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySnapshot {
    /// Unix timestamp (seconds) of the computation
    pub generated_at: u64,
    /// Ranking parameters the results were computed with
    pub options: RankingOptions,
    pub results: BTreeMap<String, Vec<SimilarityResult>>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl SimilaritySnapshot {
    pub fn empty(options: RankingOptions) -> Self {
        Self {
            generated_at: unix_now(),
            options,
            results: BTreeMap::new(),
        }
    }

    /// Rank every user in `store`.
    pub fn compute(store: &ProfileStore, options: &RankingOptions) -> Self {
        Self {
            generated_at: unix_now(),
            options: *options,
            results: similarity::rank_all(store, options),
        }
    }

    /// Read a snapshot file. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No similarity snapshot at {}", path.display());
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read snapshot {}", path.display()))
            }
        };

        let snapshot: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed similarity snapshot {}", path.display()))?;
        info!(
            "Loaded similarity snapshot with {} users from {}",
            snapshot.results.len(),
            path.display()
        );
        Ok(Some(snapshot))
    }

    /// Write the snapshot atomically to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create snapshot directory {}", parent.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
        serde_json::to_writer_pretty(&mut tmp, self).context("Failed to serialize snapshot")?;
        tmp.flush().context("Failed to flush snapshot")?;
        tmp.persist(path)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

        debug!("Saved similarity snapshot to {}", path.display());
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&[SimilarityResult]> {
        self.results.get(username).map(Vec::as_slice)
    }
}

/// Snapshot kept in memory, backed by its file.
#[derive(Debug)]
pub struct SnapshotCache {
    path: PathBuf,
    options: RankingOptions,
    snapshot: SimilaritySnapshot,
}

impl SnapshotCache {
    /// Load the snapshot at `path`, or start empty when there is none.
    ///
    /// A snapshot computed with different ranking options is discarded.
    pub fn open(path: PathBuf, options: RankingOptions) -> Result<Self> {
        let snapshot = match SimilaritySnapshot::load(&path)? {
            Some(snapshot) if snapshot.options == options => snapshot,
            Some(snapshot) => {
                info!(
                    "Ignoring snapshot computed with {:?}, ranking uses {:?}",
                    snapshot.options, options
                );
                SimilaritySnapshot::empty(options)
            }
            None => SimilaritySnapshot::empty(options),
        };
        Ok(Self {
            path,
            options,
            snapshot,
        })
    }

    pub fn options(&self) -> &RankingOptions {
        &self.options
    }

    pub fn snapshot(&self) -> &SimilaritySnapshot {
        &self.snapshot
    }

    /// Cached results for `username`, computed on a miss.
    ///
    /// Returns `None` when the user is not in `store`. Cached entries naming
    /// users that left the corpus are skipped.
    pub fn results_for(
        &mut self,
        username: &str,
        store: &ProfileStore,
    ) -> Option<Vec<SimilarityResult>> {
        if !store.contains(username) {
            return None;
        }
        if let Some(cached) = self.snapshot.get(username) {
            return Some(
                cached
                    .iter()
                    .filter(|result| store.contains(&result.username))
                    .cloned()
                    .collect(),
            );
        }

        let profile = store.get(username)?;
        let ranked = similarity::rank_similar(profile, store, &self.options);
        self.snapshot
            .results
            .insert(username.to_owned(), ranked.clone());
        Some(ranked)
    }

    /// Recompute every user's results and persist them.
    pub fn refresh(&mut self, store: &ProfileStore) -> Result<()> {
        self.snapshot = SimilaritySnapshot::compute(store, &self.options);
        self.snapshot.save(&self.path)
    }
}
