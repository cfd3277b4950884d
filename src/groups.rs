//! Listening groups: members share recommendations with each other.
//!
//! Group names are trimmed wherever they are accepted.

use crate::social::SocialError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecommendation {
    pub from: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub members: BTreeSet<String>,
    pub recommendations: Vec<GroupRecommendation>,
}

#[derive(Debug, Default)]
pub struct GroupStore {
    groups: BTreeMap<String, Group>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group; its creator is the first member.
    pub fn create(&mut self, name: &str, creator: &str) -> Result<(), SocialError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SocialError::EmptyContent("Group name"));
        }
        if self.groups.contains_key(name) {
            return Err(SocialError::GroupExists(name.to_owned()));
        }
        let group = Group {
            members: BTreeSet::from([creator.to_owned()]),
            recommendations: Vec::new(),
        };
        self.groups.insert(name.to_owned(), group);
        Ok(())
    }

    pub fn join(&mut self, name: &str, user: &str) -> Result<(), SocialError> {
        let name = name.trim();
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| SocialError::GroupNotFound(name.to_owned()))?;
        group.members.insert(user.to_owned());
        Ok(())
    }

    pub fn leave(&mut self, name: &str, user: &str) -> Result<(), SocialError> {
        let group = self.member_group_mut(name, user)?;
        group.members.remove(user);
        Ok(())
    }

    pub fn recommend(&mut self, name: &str, user: &str, content: &str) -> Result<(), SocialError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SocialError::EmptyContent("Recommendation"));
        }
        let group = self.member_group_mut(name, user)?;
        group.recommendations.push(GroupRecommendation {
            from: user.to_owned(),
            content: content.to_owned(),
        });
        Ok(())
    }

    /// Recommendations shared in `name`, visible to members only.
    pub fn recommendations(
        &self,
        name: &str,
        user: &str,
    ) -> Result<&[GroupRecommendation], SocialError> {
        let name = name.trim();
        let group = self
            .groups
            .get(name)
            .ok_or_else(|| SocialError::GroupNotFound(name.to_owned()))?;
        if !group.members.contains(user) {
            return Err(SocialError::NotAMember(name.to_owned()));
        }
        Ok(&group.recommendations)
    }

    /// Names of the groups `user` belongs to.
    pub fn groups_of(&self, user: &str) -> Vec<String> {
        self.groups
            .iter()
            .filter(|(_, group)| group.members.contains(user))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.get(name.trim())
    }

    fn member_group_mut(&mut self, name: &str, user: &str) -> Result<&mut Group, SocialError> {
        let name = name.trim();
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| SocialError::GroupNotFound(name.to_owned()))?;
        if !group.members.contains(user) {
            return Err(SocialError::NotAMember(name.to_owned()));
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_join_leave() {
        let mut groups = GroupStore::new();
        groups.create("shoegaze", "ana").unwrap();
        groups.join("shoegaze", "ben").unwrap();

        assert_eq!(groups.groups_of("ben"), vec!["shoegaze"]);
        assert_eq!(groups.get("shoegaze").unwrap().members.len(), 2);

        groups.leave("shoegaze", "ben").unwrap();
        assert!(groups.groups_of("ben").is_empty());
    }

    #[test]
    fn test_duplicate_group_is_rejected() {
        let mut groups = GroupStore::new();
        groups.create("jazz", "ana").unwrap();
        assert_eq!(
            groups.create("jazz", "ben"),
            Err(SocialError::GroupExists("jazz".into()))
        );
    }

    #[test]
    fn test_unknown_group() {
        let mut groups = GroupStore::new();
        assert_eq!(
            groups.join("nope", "ana"),
            Err(SocialError::GroupNotFound("nope".into()))
        );
        assert_eq!(
            groups.leave("nope", "ana"),
            Err(SocialError::GroupNotFound("nope".into()))
        );
    }

    #[test]
    fn test_only_members_see_and_share_recommendations() {
        let mut groups = GroupStore::new();
        groups.create("jazz", "ana").unwrap();
        groups.recommend("jazz", "ana", "Kind of Blue").unwrap();

        assert_eq!(
            groups.recommend("jazz", "ben", "Giant Steps"),
            Err(SocialError::NotAMember("jazz".into()))
        );
        assert!(groups.recommendations("jazz", "ben").is_err());

        let recs = groups.recommendations("jazz", "ana").unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].content, "Kind of Blue");
    }

    #[test]
    fn test_group_names_are_trimmed_everywhere() {
        let mut groups = GroupStore::new();
        groups.create(" jazz ", "ana").unwrap();

        groups.join("jazz", "ben").unwrap();
        groups.join("  jazz", "cleo").unwrap();
        groups.recommend("jazz ", "ben", "Kind of Blue").unwrap();

        assert_eq!(groups.groups_of("cleo"), vec!["jazz"]);
        assert_eq!(groups.recommendations(" jazz ", "ana").unwrap().len(), 1);
        groups.leave(" jazz", "cleo").unwrap();
        assert_eq!(groups.get("jazz ").unwrap().members.len(), 2);
        assert_eq!(
            groups.join(" nope ", "ana"),
            Err(SocialError::GroupNotFound("nope".into()))
        );
    }

    #[test]
    fn test_leaving_requires_membership() {
        let mut groups = GroupStore::new();
        groups.create("jazz", "ana").unwrap();
        assert_eq!(
            groups.leave("jazz", "ben"),
            Err(SocialError::NotAMember("jazz".into()))
        );
    }
}
