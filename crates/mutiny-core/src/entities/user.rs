//! User entity - represents a chat user

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::Attachment;
use crate::error::ModelResult;
use crate::traits::{ClearMarkers, Model, RawObject};
use crate::value_objects::Id;

/// Online presence chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Presence {
    Busy,
    Idle,
    Invisible,
    #[default]
    Online,
}

/// Relationship between the authenticated user and another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipStatus {
    Blocked,
    BlockedOther,
    Friend,
    Incoming,
    None,
    Outgoing,
    /// Marks the authenticated user itself
    User,
}

impl RelationshipStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "Blocked",
            Self::BlockedOther => "BlockedOther",
            Self::Friend => "Friend",
            Self::Incoming => "Incoming",
            Self::None => "None",
            Self::Outgoing => "Outgoing",
            Self::User => "User",
        }
    }
}

/// Entry of the authenticated user's relationship list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "_id")]
    pub user_id: Id,
    pub status: RelationshipStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotInfo {
    #[serde(rename = "owner")]
    pub owner_id: Id,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub background: Option<Attachment>,
}

/// User entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<Attachment>,
    /// Only present on the authenticated user, keyed by the other user's id
    #[serde(default, deserialize_with = "relations_by_user")]
    pub relations: Option<HashMap<Id, Relationship>>,
    #[serde(default)]
    pub badges: u64,
    #[serde(default)]
    pub status: Status,
    #[serde(default, rename = "relationship")]
    pub relationship_status: Option<RelationshipStatus>,
    pub online: bool,
    #[serde(default)]
    pub flags: u64,
    #[serde(default)]
    pub bot: Option<BotInfo>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(skip)]
    raw: RawObject,
}

fn relations_by_user<'de, D>(deserializer: D) -> Result<Option<HashMap<Id, Relationship>>, D::Error>
where
    D: Deserializer<'de>,
{
    let relations = Option::<Vec<Relationship>>::deserialize(deserializer)?;
    Ok(relations.map(|list| {
        list.into_iter()
            .map(|relation| (relation.user_id.clone(), relation))
            .collect()
    }))
}

impl User {
    /// Check if this user is the authenticated user
    #[inline]
    pub fn is_self(&self) -> bool {
        self.relationship_status == Some(RelationshipStatus::User)
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot.is_some()
    }

    /// Relationship with another user, from the authenticated user's list
    pub fn relationship_with(&self, user_id: &str) -> Option<RelationshipStatus> {
        self.relations
            .as_ref()
            .and_then(|relations| relations.get(user_id))
            .map(|relation| relation.status)
    }

    /// Insert, replace or (for `None`) remove an entry of the relationship list
    pub fn update_relation(&mut self, user_id: &Id, status: RelationshipStatus) -> ModelResult<()> {
        let mut relations: Vec<Value> = self
            .raw
            .get("relations")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        relations
            .retain(|entry| entry.get("_id").and_then(Value::as_str) != Some(user_id.as_str()));
        if status != RelationshipStatus::None {
            relations.push(json!({ "_id": user_id.as_str(), "status": status.as_str() }));
        }

        self.set_field("relations", Value::Array(relations))
    }

    /// Set this user's relationship to the authenticated user
    pub fn set_relationship_status(&mut self, status: RelationshipStatus) -> ModelResult<()> {
        self.set_field("relationship", Value::String(status.as_str().to_string()))
    }
}

impl Model for User {
    const NAME: &'static str = "User";
    const CLEAR_MARKERS: ClearMarkers = &[
        ("ProfileContent", &["profile", "content"]),
        ("ProfileBackground", &["profile", "background"]),
        ("StatusText", &["status", "text"]),
        ("Avatar", &["avatar"]),
    ];

    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn set_raw(&mut self, raw: RawObject) {
        self.raw = raw;
    }
}
