//! # Vector Encoder
//!
//! Projects a [`UserProfile`] into a numeric feature vector over a
//! [`Vocabulary`].
//!
//! ## Policies
//!
//! - **One-hot** (default): one dimension per vocabulary entry, laid out as
//!   `[artists | songs | genres]`, `1.0` wherever the profile has the item.
//!   Cosine similarity over these vectors measures shared taste directly.
//! - **Fixed-slot** (legacy): the first `slots` artists, songs and genres are
//!   written as `index + 1` into `slots` positions per segment, padded with
//!   `0.0`. Older snapshots were computed this way. It mixes indices from
//!   unrelated vocabularies in one vector, so scores are not a meaningful
//!   measure of overlap; use it only to reproduce those snapshots.
//!
//! Items that are missing from the vocabulary never fail the encoding. They
//! simply contribute nothing.

use crate::profile::UserProfile;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};

/// How profiles are turned into vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingPolicy {
    /// Binary vector over the whole vocabulary
    #[default]
    OneHot,
    /// Top-N item indices per segment, zero padded
    FixedSlot,
}

impl std::fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingPolicy::OneHot => write!(f, "one-hot"),
            EncodingPolicy::FixedSlot => write!(f, "fixed-slot"),
        }
    }
}

/// Encode `profile` under `policy`.
///
/// `slots` is only consulted by [`EncodingPolicy::FixedSlot`].
#[must_use]
pub fn encode(
    profile: &UserProfile,
    vocab: &Vocabulary,
    policy: EncodingPolicy,
    slots: usize,
) -> Vec<f64> {
    match policy {
        EncodingPolicy::OneHot => encode_one_hot(profile, vocab),
        EncodingPolicy::FixedSlot => encode_fixed_slot(profile, vocab, slots),
    }
}

/// One-hot encoding over `[artists | songs | genres]`.
///
/// # Examples
///
/// ```
/// use tunemates::encoder::encode_one_hot;
/// use tunemates::profile::UserProfile;
/// use tunemates::vocabulary::Vocabulary;
///
/// let x = UserProfile::new("x").with_artists(["a"]);
/// let others = UserProfile::new("y").with_artists(["b", "c"]);
/// let vocab = Vocabulary::build([&x, &others]);
///
/// assert_eq!(encode_one_hot(&x, &vocab), vec![1.0, 0.0, 0.0]);
/// ```
#[must_use]
pub fn encode_one_hot(profile: &UserProfile, vocab: &Vocabulary) -> Vec<f64> {
    let song_offset = vocab.artist_count();
    let genre_offset = song_offset + vocab.song_count();
    let mut vector = vec![0.0; vocab.dimension()];

    let positions = profile
        .top_artists
        .iter()
        .filter_map(|artist| vocab.artist_index(artist))
        .chain(
            profile
                .top_songs
                .iter()
                .filter_map(|song| vocab.song_index(song).map(|idx| song_offset + idx)),
        )
        .chain(
            profile
                .genres
                .iter()
                .filter_map(|genre| vocab.genre_index(genre).map(|idx| genre_offset + idx)),
        );

    for position in positions {
        vector[position] = 1.0;
    }
    vector
}

/// Fixed-slot encoding: `slots` positions per segment, `index + 1` or `0.0`.
#[must_use]
pub fn encode_fixed_slot(profile: &UserProfile, vocab: &Vocabulary, slots: usize) -> Vec<f64> {
    let mut vector = Vec::with_capacity(slots * 3);

    vector.extend(pad_slots(
        profile.top_artists.iter().map(|a| vocab.artist_index(a)),
        slots,
    ));
    vector.extend(pad_slots(
        profile.top_songs.iter().map(|s| vocab.song_index(s)),
        slots,
    ));
    vector.extend(pad_slots(
        profile.genres.iter().map(|g| vocab.genre_index(g)),
        slots,
    ));
    vector
}

/// Truncate or pad to exactly `slots` values; unknown items leave a zero.
fn pad_slots<I>(indices: I, slots: usize) -> impl Iterator<Item = f64>
where
    I: Iterator<Item = Option<usize>>,
{
    indices
        .map(|idx| idx.map_or(0.0, |i| (i + 1) as f64))
        .chain(std::iter::repeat(0.0))
        .take(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab_for(profiles: &[UserProfile]) -> Vocabulary {
        Vocabulary::build(profiles)
    }

    #[test]
    fn test_one_hot_layout_is_artists_songs_genres() {
        let ana = UserProfile::new("ana")
            .with_artists(["b"])
            .with_songs(["s2"])
            .with_genres(["g1"]);
        let ben = UserProfile::new("ben")
            .with_artists(["a"])
            .with_songs(["s1"])
            .with_genres(["g2"]);
        let vocab = vocab_for(&[ana.clone(), ben]);

        // artists [a, b], songs [s1, s2], genres [g1, g2]
        assert_eq!(
            encode_one_hot(&ana, &vocab),
            vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_one_hot_skips_items_missing_from_vocabulary() {
        let known = UserProfile::new("ana").with_artists(["a"]);
        let vocab = vocab_for(&[known]);

        let stranger = UserProfile::new("zed").with_artists(["a", "unheard of"]);
        assert_eq!(encode_one_hot(&stranger, &vocab), vec![1.0]);
    }

    #[test]
    fn test_one_hot_same_artist_and_song_name_are_separate_dimensions() {
        let profile = UserProfile::new("ana")
            .with_artists(["Heroes"])
            .with_songs(["Heroes"]);
        let vocab = vocab_for(&[profile.clone()]);

        assert_eq!(encode_one_hot(&profile, &vocab), vec![1.0, 1.0]);
    }

    #[test]
    fn test_fixed_slot_pads_and_truncates() {
        let profile = UserProfile::new("ana")
            .with_artists(["a", "b", "c"])
            .with_songs(["s"]);
        let vocab = vocab_for(&[profile.clone()]);

        let vector = encode_fixed_slot(&profile, &vocab, 2);

        assert_eq!(vector, vec![1.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fixed_slot_unknown_item_leaves_zero() {
        let vocab = vocab_for(&[UserProfile::new("ana").with_artists(["a"])]);
        let stranger = UserProfile::new("zed").with_artists(["x", "a"]);

        assert_eq!(encode_fixed_slot(&stranger, &vocab, 2)[..2], [0.0, 1.0]);
    }

    #[test]
    fn test_encode_dispatches_on_policy() {
        let profile = UserProfile::new("ana").with_artists(["a"]);
        let vocab = vocab_for(&[profile.clone()]);

        assert_eq!(encode(&profile, &vocab, EncodingPolicy::OneHot, 5).len(), 1);
        assert_eq!(encode(&profile, &vocab, EncodingPolicy::FixedSlot, 5).len(), 15);
    }
}
