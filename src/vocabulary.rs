//! Feature vocabulary: every distinct artist, song and genre mapped to an index.
//!
//! Keys are sorted before indices are handed out, so building a vocabulary
//! twice from the same profiles always yields the same vector layout.

use crate::profile::UserProfile;
use std::collections::{BTreeMap, BTreeSet};

/// Three independent item → index mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    artists: BTreeMap<String, usize>,
    songs: BTreeMap<String, usize>,
    genres: BTreeMap<String, usize>,
}

/// Assign `0..n` to the items of an already sorted set.
fn index_sorted(items: BTreeSet<&str>) -> BTreeMap<String, usize> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| (item.to_owned(), idx))
        .collect()
}

impl Vocabulary {
    /// Build the vocabulary covering the union of all items in `profiles`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tunemates::profile::UserProfile;
    /// use tunemates::vocabulary::Vocabulary;
    ///
    /// let profiles = [
    ///     UserProfile::new("x").with_artists(["c", "a"]),
    ///     UserProfile::new("y").with_artists(["b"]),
    /// ];
    /// let vocab = Vocabulary::build(&profiles);
    ///
    /// assert_eq!(vocab.artist_index("a"), Some(0));
    /// assert_eq!(vocab.artist_index("c"), Some(2));
    /// ```
    pub fn build<'a, I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = &'a UserProfile>,
    {
        let mut artists = BTreeSet::new();
        let mut songs = BTreeSet::new();
        let mut genres = BTreeSet::new();

        for profile in profiles {
            artists.extend(profile.top_artists.iter().map(String::as_str));
            songs.extend(profile.top_songs.iter().map(String::as_str));
            genres.extend(profile.genres.iter().map(String::as_str));
        }

        let vocab = Self {
            artists: index_sorted(artists),
            songs: index_sorted(songs),
            genres: index_sorted(genres),
        };
        log::debug!(
            "Built vocabulary: {} artists, {} songs, {} genres",
            vocab.artists.len(),
            vocab.songs.len(),
            vocab.genres.len()
        );
        vocab
    }

    pub fn artist_index(&self, artist: &str) -> Option<usize> {
        self.artists.get(artist).copied()
    }

    pub fn song_index(&self, song: &str) -> Option<usize> {
        self.songs.get(song).copied()
    }

    pub fn genre_index(&self, genre: &str) -> Option<usize> {
        self.genres.get(genre).copied()
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }

    /// Length of a one-hot vector over this vocabulary.
    pub fn dimension(&self) -> usize {
        self.artists.len() + self.songs.len() + self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimension() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profiles() -> Vec<UserProfile> {
        vec![
            UserProfile::new("ana")
                .with_artists(["Radiohead", "Bjork"])
                .with_songs(["Reckoner"])
                .with_genres(["art rock"]),
            UserProfile::new("ben")
                .with_artists(["Bjork", "Aphex Twin"])
                .with_songs(["Joga", "Xtal"])
                .with_genres(["idm", "art pop"]),
        ]
    }

    #[test]
    fn test_union_of_all_items() {
        let vocab = Vocabulary::build(&sample_profiles());

        assert_eq!(vocab.artist_count(), 3);
        assert_eq!(vocab.song_count(), 3);
        assert_eq!(vocab.genre_count(), 3);
        assert_eq!(vocab.dimension(), 9);
    }

    #[test]
    fn test_indices_follow_sorted_order() {
        let vocab = Vocabulary::build(&sample_profiles());

        assert_eq!(vocab.artist_index("Aphex Twin"), Some(0));
        assert_eq!(vocab.artist_index("Bjork"), Some(1));
        assert_eq!(vocab.artist_index("Radiohead"), Some(2));
        assert_eq!(vocab.genre_index("art pop"), Some(0));
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let profiles = sample_profiles();
        let mut reversed = profiles.clone();
        reversed.reverse();

        assert_eq!(Vocabulary::build(&profiles), Vocabulary::build(&profiles));
        assert_eq!(Vocabulary::build(&profiles), Vocabulary::build(&reversed));
    }

    #[test]
    fn test_unknown_items_have_no_index() {
        let vocab = Vocabulary::build(&sample_profiles());
        assert_eq!(vocab.artist_index("Unknown"), None);
        assert_eq!(vocab.song_index("Unknown"), None);
    }

    #[test]
    fn test_empty_input() {
        let vocab = Vocabulary::build(std::iter::empty::<&UserProfile>());
        assert!(vocab.is_empty());
    }
}
