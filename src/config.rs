//! # Configuration Module
//!
//! Data directory setup, `.env` loading and the runtime configuration shared by
//! the CLI commands and the server.
//!
//! ## Data Storage
//!
//! Without an explicit `--snapshot`, Tunemates keeps its similarity snapshot in
//! the platform-standard data directory:
//! - Linux: `~/.local/share/tunemates/`
//! - macOS: `~/Library/Application Support/tunemates/`
//! - Windows: `%APPDATA%\tunemates\`
//!
//! The profile corpus is a separate directory of JSON files, `data/` by default,
//! set with `--corpus` (alias `--data-dir`).

use crate::similarity::RankingOptions;
use anyhow::{Context, Result};
use log::debug;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the persisted similarity snapshot.
pub const SNAPSHOT_FILE_NAME: &str = "similarity.json";

/// Returns the platform-appropriate data directory for Tunemates, creating it
/// when missing.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The tunemates subdirectory cannot be created due to permissions
///
/// # Examples
///
/// ```no_run
/// use tunemates::config::get_data_dir;
///
/// let dir = get_data_dir()?;
/// println!("Data location: {}", dir.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_data_dir() -> Result<PathBuf> {
    let app_dir = app_data_dir(dirs::data_dir())?;
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create Tunemates data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

fn app_data_dir(system_data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let data_dir = system_data_dir.ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please pass --snapshot explicitly."
        )
    })?;
    Ok(data_dir.join("tunemates"))
}

/// Default location of the similarity snapshot.
///
/// Nothing is created here; saving the snapshot creates missing directories.
pub fn default_snapshot_path() -> Result<PathBuf> {
    Ok(app_data_dir(dirs::data_dir())?.join(SNAPSHOT_FILE_NAME))
}

/// Load variables from a `.env` file in the working directory, if present.
///
/// Returns the path of the loaded file. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(err) => {
            debug!("No .env loaded: {err}");
            None
        }
    }
}

/// Turn `path` into an absolute path without touching the filesystem.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("Invalid path {}", path.display()))?
        .into_owned())
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory of profile snapshot files
    pub corpus_dir: PathBuf,
    /// Path to the similarity snapshot file
    pub snapshot_path: PathBuf,
    /// Ranking parameters used for every similarity computation
    #[serde(default)]
    pub ranking: RankingOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            snapshot_path: default_snapshot_path()
                .unwrap_or_else(|_| PathBuf::from(SNAPSHOT_FILE_NAME)),
            ranking: RankingOptions::default(),
        }
    }
}

impl RuntimeConfig {
    /// Build a configuration from command-line paths.
    ///
    /// Both paths are made absolute. Without `snapshot_path` the platform data
    /// directory is used.
    pub fn new(corpus_dir: &Path, snapshot_path: Option<&Path>) -> Result<Self> {
        let snapshot_path = match snapshot_path {
            Some(path) => normalize_path(path)?,
            None => default_snapshot_path()?,
        };
        Ok(Self {
            corpus_dir: normalize_path(corpus_dir)?,
            snapshot_path,
            ranking: RankingOptions::default(),
        })
    }

    pub fn with_ranking(mut self, ranking: RankingOptions) -> Self {
        self.ranking = ranking;
        self
    }
}
