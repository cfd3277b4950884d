//! # Integration Tests for Tunemates
//!
//! End-to-end tests over the public API and the compiled binary: corpus
//! loading, similarity ranking, snapshots and the CLI commands.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test helper to create a corpus directory with sample profiles
fn create_test_corpus() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let corpus = temp_dir.path().join("data");
    fs::create_dir_all(&corpus)?;

    fs::write(
        corpus.join("01_users.json"),
        r#"[
            {
                "username": "alice",
                "top_artists": ["Radiohead", "Bjork", "Portishead"],
                "top_songs": ["Idioteque", "Hyperballad"],
                "genres": ["art rock", "trip hop"]
            },
            {
                "username": "bob",
                "top_artists": ["Radiohead", "Bjork", "Massive Attack"],
                "top_songs": ["Idioteque", "Teardrop"],
                "genres": ["art rock", "trip hop"]
            }
        ]"#,
    )?;
    fs::write(
        corpus.join("02_carol.json"),
        r#"{
            "username": "carol",
            "top_artists": ["ABBA"],
            "top_songs": ["Dancing Queen"],
            "genres": ["europop"]
        }"#,
    )?;
    // not a snapshot file
    fs::write(corpus.join("notes.txt"), "ignored")?;

    Ok((temp_dir, corpus))
}

fn tunemates(corpus: &Path, snapshot: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tunemates"))
        .arg("--corpus")
        .arg(corpus)
        .arg("--snapshot")
        .arg(snapshot)
        .args(args)
        .output()
        .expect("Failed to run tunemates")
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = Command::new(env!("CARGO_BIN_EXE_tunemates"))
            .arg("--help")
            .output()
            .expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("tunemates"));
        assert!(stdout.contains("serve"));
        assert!(stdout.contains("similar"));
        assert!(stdout.contains("top-artists"));
    }

    #[test]
    fn test_completion_generation() {
        let output = Command::new(env!("CARGO_BIN_EXE_tunemates"))
            .args(["completion", "bash"])
            .output()
            .expect("Failed to run completion command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_tunemates"));
        assert!(stdout.contains("complete"));
    }

    #[test]
    fn test_users_and_similar_commands() -> Result<()> {
        let (temp_dir, corpus) = create_test_corpus()?;
        let snapshot = temp_dir.path().join("similarity.json");

        let output = tunemates(&corpus, &snapshot, &["users"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "alice\nbob\ncarol\n");

        let output = tunemates(&corpus, &snapshot, &["similar", "alice"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("bob"));
        assert!(!stdout.contains("carol"));

        Ok(())
    }

    #[test]
    fn test_similar_unknown_user_fails() -> Result<()> {
        let (temp_dir, corpus) = create_test_corpus()?;
        let output = tunemates(
            &corpus,
            &temp_dir.path().join("s.json"),
            &["similar", "nobody"],
        );

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("nobody"));
        Ok(())
    }

    #[test]
    fn test_snapshot_command_writes_file() -> Result<()> {
        let (temp_dir, corpus) = create_test_corpus()?;
        let snapshot = temp_dir.path().join("out").join("similarity.json");

        let output = tunemates(&corpus, &snapshot, &["snapshot"]);
        assert!(output.status.success());
        assert!(snapshot.exists());
        Ok(())
    }
}

#[cfg(test)]
mod similarity_integration_tests {
    use super::*;
    use tunemates::profile::ProfileStore;
    use tunemates::similarity::{self, RankingOptions};

    #[test]
    fn test_corpus_loads_every_profile() -> Result<()> {
        let (_temp_dir, corpus) = create_test_corpus()?;
        let store = ProfileStore::load_dir(&corpus)?;

        assert_eq!(store.len(), 3);
        assert_eq!(
            store.usernames().collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );
        Ok(())
    }

    #[test]
    fn test_malformed_corpus_names_the_file() -> Result<()> {
        let (_temp_dir, corpus) = create_test_corpus()?;
        fs::write(corpus.join("03_broken.json"), "{ not json")?;

        let err = ProfileStore::load_dir(&corpus).unwrap_err();
        assert!(format!("{err:#}").contains("03_broken.json"));
        Ok(())
    }

    #[test]
    fn test_ranking_properties_hold_across_corpus() -> Result<()> {
        let (_temp_dir, corpus) = create_test_corpus()?;
        let store = ProfileStore::load_dir(&corpus)?;
        let options = RankingOptions {
            min_score: None,
            ..RankingOptions::default()
        };

        for profile in store.iter() {
            let ranked = similarity::rank_similar(profile, &store, &options);

            assert!(ranked.len() <= options.top_k);
            assert!(ranked.iter().all(|r| r.username != profile.username));
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
            assert!(ranked.iter().all(|r| r.score.is_finite()));
        }
        Ok(())
    }

    #[test]
    fn test_similarity_is_symmetric() -> Result<()> {
        let (_temp_dir, corpus) = create_test_corpus()?;
        let store = ProfileStore::load_dir(&corpus)?;
        let options = RankingOptions {
            min_score: None,
            ..RankingOptions::default()
        };

        let all = similarity::rank_all(&store, &options);
        let score = |from: &str, to: &str| {
            all[from]
                .iter()
                .find(|r| r.username == to)
                .map(|r| r.score)
                .unwrap()
        };

        assert!((score("alice", "bob") - score("bob", "alice")).abs() < 1e-12);
        assert_eq!(score("alice", "carol"), 0.0);
        Ok(())
    }
}

#[cfg(test)]
mod snapshot_integration_tests {
    use super::*;
    use tunemates::profile::ProfileStore;
    use tunemates::similarity::RankingOptions;
    use tunemates::snapshot::{SimilaritySnapshot, SnapshotCache};

    #[test]
    fn test_snapshot_survives_restart() -> Result<()> {
        let (temp_dir, corpus) = create_test_corpus()?;
        let store = ProfileStore::load_dir(&corpus)?;
        let path = temp_dir.path().join("similarity.json");

        let mut cache = SnapshotCache::open(path.clone(), RankingOptions::default())?;
        cache.refresh(&store)?;

        let reloaded = SimilaritySnapshot::load(&path)?.expect("snapshot should exist");
        assert_eq!(reloaded.results.len(), 3);
        assert_eq!(reloaded.get("alice").unwrap()[0].username, "bob");
        assert!(reloaded.get("carol").unwrap().is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod configuration_tests {
    use tunemates::config::{get_data_dir, RuntimeConfig};
    use super::*;

    #[test]
    fn test_data_directory_creation() -> Result<()> {
        let data_dir = get_data_dir()?;
        assert!(data_dir.exists());
        assert!(data_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_runtime_config_creation() -> Result<()> {
        let config = RuntimeConfig::new(Path::new("data"), None)?;
        assert!(config.corpus_dir.is_absolute());
        assert!(config.snapshot_path.ends_with("similarity.json"));
        Ok(())
    }
}
