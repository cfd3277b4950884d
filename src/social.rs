//! # Social State
//!
//! Follow graph, direct messages and the comments, likes and ratings users
//! leave on entities (tracks, albums, playlists, ...).
//!
//! Everything lives in one [`SocialStore`] value that the server owns and hands
//! to request handlers. Usernames are not validated here; handlers check them
//! against the profile store first.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Rule violations in social and group operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocialError {
    #[error("Users cannot follow themselves")]
    SelfFollow,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    #[error("{0} cannot be empty")]
    EmptyContent(&'static str),

    #[error("Group '{0}' already exists")]
    GroupExists(String),

    #[error("Group '{0}' not found")]
    GroupNotFound(String),

    #[error("Not a member of group '{0}'")]
    NotAMember(String),
}

/// Something that can be commented on, liked or rated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub from: String,
    pub content: String,
}

/// Everything known about one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub entity: EntityRef,
    pub comments: Vec<Comment>,
    pub likes: u32,
    pub rating_count: usize,
    pub average_rating: Option<f64>,
}

fn non_empty(content: &str, what: &'static str) -> Result<String, SocialError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(SocialError::EmptyContent(what));
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Default)]
pub struct SocialStore {
    following: HashMap<String, BTreeSet<String>>,
    inboxes: HashMap<String, Vec<Message>>,
    comments: HashMap<EntityRef, Vec<Comment>>,
    likes: HashMap<EntityRef, HashMap<String, u32>>,
    ratings: HashMap<EntityRef, HashMap<String, Vec<u8>>>,
}

impl SocialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `from` starts following `to`. Following twice is a no-op.
    pub fn follow(&mut self, from: &str, to: &str) -> Result<(), SocialError> {
        if from == to {
            return Err(SocialError::SelfFollow);
        }
        self.following
            .entry(from.to_owned())
            .or_default()
            .insert(to.to_owned());
        Ok(())
    }

    /// Returns whether `from` was following `to`.
    pub fn unfollow(&mut self, from: &str, to: &str) -> Result<bool, SocialError> {
        if from == to {
            return Err(SocialError::SelfFollow);
        }
        Ok(self
            .following
            .get_mut(from)
            .is_some_and(|set| set.remove(to)))
    }

    pub fn is_following(&self, from: &str, to: &str) -> bool {
        self.following.get(from).is_some_and(|set| set.contains(to))
    }

    pub fn following(&self, user: &str) -> Vec<String> {
        self.following
            .get(user)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn followers(&self, user: &str) -> Vec<String> {
        let mut followers: Vec<String> = self
            .following
            .iter()
            .filter(|(_, set)| set.contains(user))
            .map(|(follower, _)| follower.clone())
            .collect();
        followers.sort();
        followers
    }

    pub fn send_message(&mut self, from: &str, to: &str, content: &str) -> Result<(), SocialError> {
        let content = non_empty(content, "Message")?;
        self.inboxes.entry(to.to_owned()).or_default().push(Message {
            from: from.to_owned(),
            content,
        });
        Ok(())
    }

    /// Messages received by `user`, oldest first.
    pub fn inbox(&self, user: &str) -> &[Message] {
        self.inboxes.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn comment(&mut self, user: &str, entity: &EntityRef, content: &str) -> Result<(), SocialError> {
        let content = non_empty(content, "Comment")?;
        self.comments.entry(entity.clone()).or_default().push(Comment {
            from: user.to_owned(),
            content,
        });
        Ok(())
    }

    pub fn comments(&self, entity: &EntityRef) -> &[Comment] {
        self.comments.get(entity).map(Vec::as_slice).unwrap_or_default()
    }

    /// Record a like and return the entity's total.
    ///
    /// Repeated likes from the same user keep counting.
    pub fn like(&mut self, user: &str, entity: &EntityRef) -> u32 {
        *self
            .likes
            .entry(entity.clone())
            .or_default()
            .entry(user.to_owned())
            .or_default() += 1;
        self.like_count(entity)
    }

    pub fn like_count(&self, entity: &EntityRef) -> u32 {
        self.likes
            .get(entity)
            .map(|per_user| per_user.values().sum())
            .unwrap_or_default()
    }

    pub fn rate(&mut self, user: &str, entity: &EntityRef, rating: i64) -> Result<(), SocialError> {
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or(SocialError::InvalidRating(rating))?;
        self.ratings
            .entry(entity.clone())
            .or_default()
            .entry(user.to_owned())
            .or_default()
            .push(rating);
        Ok(())
    }

    fn rating_summary(&self, entity: &EntityRef) -> (usize, Option<f64>) {
        let all: Vec<u8> = self
            .ratings
            .get(entity)
            .map(|per_user| per_user.values().flatten().copied().collect())
            .unwrap_or_default();
        if all.is_empty() {
            return (0, None);
        }
        let sum: u32 = all.iter().map(|&r| u32::from(r)).sum();
        (all.len(), Some(f64::from(sum) / all.len() as f64))
    }

    pub fn entity_view(&self, entity: &EntityRef) -> EntityView {
        let (rating_count, average_rating) = self.rating_summary(entity);
        EntityView {
            entity: entity.clone(),
            comments: self.comments(entity).to_vec(),
            likes: self.like_count(entity),
            rating_count,
            average_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> EntityRef {
        EntityRef::new("track", "42")
    }

    #[test]
    fn test_follow_and_unfollow() {
        let mut social = SocialStore::new();

        social.follow("ana", "ben").unwrap();
        social.follow("ana", "ben").unwrap();
        social.follow("cleo", "ben").unwrap();

        assert!(social.is_following("ana", "ben"));
        assert!(!social.is_following("ben", "ana"));
        assert_eq!(social.following("ana"), vec!["ben"]);
        assert_eq!(social.followers("ben"), vec!["ana", "cleo"]);

        assert!(social.unfollow("ana", "ben").unwrap());
        assert!(!social.unfollow("ana", "ben").unwrap());
        assert!(!social.is_following("ana", "ben"));
    }

    #[test]
    fn test_self_follow_is_rejected() {
        let mut social = SocialStore::new();
        assert_eq!(social.follow("ana", "ana"), Err(SocialError::SelfFollow));
        assert_eq!(social.unfollow("ana", "ana"), Err(SocialError::SelfFollow));
    }

    #[test]
    fn test_messages_arrive_in_order() {
        let mut social = SocialStore::new();
        social.send_message("ana", "ben", "hi").unwrap();
        social.send_message("cleo", "ben", "  hello  ").unwrap();

        let inbox = social.inbox("ben");
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].from, "ana");
        assert_eq!(inbox[1].content, "hello");
        assert!(social.inbox("ana").is_empty());
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let mut social = SocialStore::new();
        assert_eq!(
            social.send_message("ana", "ben", "   "),
            Err(SocialError::EmptyContent("Message"))
        );
    }

    #[test]
    fn test_comments_are_scoped_to_entity_kind_and_id() {
        let mut social = SocialStore::new();
        social.comment("ana", &track(), "great").unwrap();
        social.comment("ben", &track(), "agreed").unwrap();
        social.comment("ana", &EntityRef::new("album", "42"), "meh").unwrap();

        let comments = social.comments(&track());
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[1].from, "ben");
    }

    #[test]
    fn test_likes_accumulate() {
        let mut social = SocialStore::new();
        assert_eq!(social.like("ana", &track()), 1);
        assert_eq!(social.like("ana", &track()), 2);
        assert_eq!(social.like("ben", &track()), 3);
        assert_eq!(social.like_count(&EntityRef::new("track", "7")), 0);
    }

    #[test]
    fn test_ratings_are_bounded_and_averaged() {
        let mut social = SocialStore::new();
        social.rate("ana", &track(), 5).unwrap();
        social.rate("ben", &track(), 2).unwrap();

        assert_eq!(social.rate("ana", &track(), 0), Err(SocialError::InvalidRating(0)));
        assert_eq!(social.rate("ana", &track(), 6), Err(SocialError::InvalidRating(6)));
        assert_eq!(social.rate("ana", &track(), -3), Err(SocialError::InvalidRating(-3)));

        let view = social.entity_view(&track());
        assert_eq!(view.rating_count, 2);
        assert_eq!(view.average_rating, Some(3.5));
    }

    #[test]
    fn test_entity_view_of_unknown_entity() {
        let view = SocialStore::new().entity_view(&track());
        assert!(view.comments.is_empty());
        assert_eq!(view.likes, 0);
        assert_eq!(view.average_rating, None);
    }
}
