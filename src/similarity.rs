//! User similarity ranking.
//!
//! Scores other listeners against a query profile by cosine similarity of their
//! feature vectors and returns the closest ones.

use crate::encoder::{self, EncodingPolicy};
use crate::profile::{ProfileStore, UserProfile};
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ranking parameters with the defaults the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Maximum number of results
    pub top_k: usize,
    /// Keep only scores strictly above this value
    pub min_score: Option<f64>,
    pub policy: EncodingPolicy,
    /// Slots per segment for [`EncodingPolicy::FixedSlot`]
    pub fixed_slots: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: Some(0.5),
            policy: EncodingPolicy::OneHot,
            fixed_slots: 5,
        }
    }
}

/// One ranked listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub username: String,
    pub score: f64,
}

impl SimilarityResult {
    /// Score as a percentage, the way it is shown to users.
    pub fn percent(&self) -> f64 {
        self.score * 100.0
    }
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when either vector has zero magnitude, so the result is
/// never `NaN`. The result is clamped to `[-1.0, 1.0]`.
///
/// # Examples
///
/// ```
/// use tunemates::similarity::cosine_similarity;
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
/// assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|y| y * y).sum();

    // one sqrt keeps equal integer norms exact
    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (dot / denominator).clamp(-1.0, 1.0)
}

/// Similarity of two profiles over a shared vocabulary.
#[must_use]
pub fn profile_similarity(
    a: &UserProfile,
    b: &UserProfile,
    vocab: &Vocabulary,
    options: &RankingOptions,
) -> f64 {
    let va = encoder::encode(a, vocab, options.policy, options.fixed_slots);
    let vb = encoder::encode(b, vocab, options.policy, options.fixed_slots);
    cosine_similarity(&va, &vb)
}

/// Descending by score, then ascending by username.
fn by_score_desc(a: &SimilarityResult, b: &SimilarityResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.username.cmp(&b.username))
}

/// Score every other profile against `query` using a prebuilt vocabulary.
fn rank_with_vocabulary(
    query: &UserProfile,
    store: &ProfileStore,
    vocab: &Vocabulary,
    options: &RankingOptions,
) -> Vec<SimilarityResult> {
    let query_vector = encoder::encode(query, vocab, options.policy, options.fixed_slots);

    let mut ranked: Vec<SimilarityResult> = store
        .iter()
        .filter(|other| other.username != query.username)
        .map(|other| {
            let other_vector = encoder::encode(other, vocab, options.policy, options.fixed_slots);
            SimilarityResult {
                username: other.username.clone(),
                score: cosine_similarity(&query_vector, &other_vector),
            }
        })
        .filter(|result| options.min_score.map_or(true, |min| result.score > min))
        .collect();

    ranked.sort_by(by_score_desc);
    ranked.truncate(options.top_k);
    ranked
}

/// Rank the listeners in `store` by similarity to `query`.
///
/// The vocabulary covers the store plus the query itself, so a live profile
/// that has not been inserted yet is still encoded fully. The query's own
/// username never appears in the result.
///
/// # Examples
///
/// ```
/// use tunemates::profile::{ProfileStore, UserProfile};
/// use tunemates::similarity::{rank_similar, RankingOptions};
///
/// let store: ProfileStore = [
///     UserProfile::new("ana").with_artists(["a", "b"]),
///     UserProfile::new("ben").with_artists(["a", "b"]),
///     UserProfile::new("cleo").with_artists(["c"]),
/// ]
/// .into_iter()
/// .collect();
///
/// let ranked = rank_similar(store.get("ana").unwrap(), &store, &RankingOptions::default());
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].username, "ben");
/// ```
#[must_use]
pub fn rank_similar(
    query: &UserProfile,
    store: &ProfileStore,
    options: &RankingOptions,
) -> Vec<SimilarityResult> {
    let vocab = Vocabulary::build(store.iter().chain(std::iter::once(query)));
    rank_with_vocabulary(query, store, &vocab, options)
}

/// Rank every listener in `store`, sharing one vocabulary.
#[must_use]
pub fn rank_all(
    store: &ProfileStore,
    options: &RankingOptions,
) -> BTreeMap<String, Vec<SimilarityResult>> {
    let vocab = Vocabulary::build(store.iter());
    store
        .iter()
        .map(|profile| {
            (
                profile.username.clone(),
                rank_with_vocabulary(profile, store, &vocab, options),
            )
        })
        .collect()
}
