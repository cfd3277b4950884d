//! Artist popularity across the corpus.

use crate::profile::ProfileStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// One artist and who listens to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistPopularity {
    pub artist: String,
    /// Number of users with the artist among their top artists
    pub count: usize,
    /// First listeners in username order
    pub top_users: Vec<String>,
}

/// The `artist_limit` most listened artists, each with up to
/// `listener_limit` of their listeners.
///
/// Artists are ordered by listener count, then by name.
pub fn top_artists(
    store: &ProfileStore,
    artist_limit: usize,
    listener_limit: usize,
) -> Vec<ArtistPopularity> {
    let mut listeners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for profile in store.iter() {
        for artist in &profile.top_artists {
            let users = listeners.entry(artist.as_str()).or_default();
            // an artist listed twice by one user still counts once
            if users.last() != Some(&profile.username.as_str()) {
                users.push(profile.username.as_str());
            }
        }
    }

    let mut ranked: Vec<(&str, Vec<&str>)> = listeners.into_iter().collect();
    // stable sort keeps the name order among equal counts
    ranked.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));

    ranked
        .into_iter()
        .take(artist_limit)
        .map(|(artist, users)| ArtistPopularity {
            artist: artist.to_owned(),
            count: users.len(),
            top_users: users
                .into_iter()
                .take(listener_limit)
                .map(str::to_owned)
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::UserProfile;

    fn store() -> ProfileStore {
        [
            UserProfile::new("ana").with_artists(["Bjork", "Radiohead"]),
            UserProfile::new("ben").with_artists(["Radiohead", "Bjork"]),
            UserProfile::new("cleo").with_artists(["Radiohead", "Air"]),
            UserProfile::new("dev").with_artists(["Radiohead", "Radiohead"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_ordered_by_listener_count_then_name() {
        let top = top_artists(&store(), 5, 5);
        let names: Vec<_> = top.iter().map(|a| a.artist.as_str()).collect();

        assert_eq!(names, vec!["Radiohead", "Bjork", "Air"]);
        assert_eq!(top[0].count, 4);
        assert_eq!(top[1].count, 2);
    }

    #[test]
    fn test_limits_are_applied() {
        let top = top_artists(&store(), 1, 2);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 4);
        assert_eq!(top[0].top_users, vec!["ana", "ben"]);
    }

    #[test]
    fn test_empty_store() {
        assert!(top_artists(&ProfileStore::new(), 5, 5).is_empty());
    }
}
