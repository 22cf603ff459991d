//! Member entity - a user's membership in a server

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Attachment;
use crate::error::ModelResult;
use crate::traits::{ClearMarkers, Model, RawObject};
use crate::value_objects::Id;

/// Composite member key, unique within a server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId {
    pub server: Id,
    pub user: Id,
}

/// Server member entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: MemberId,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<Attachment>,
    #[serde(default, rename = "roles")]
    pub role_ids: Vec<Id>,
    #[serde(skip)]
    raw: RawObject,
}

impl Member {
    /// Create a member with no nickname, avatar or roles
    pub fn bare(server_id: &Id, user_id: &Id) -> ModelResult<Self> {
        Self::from_value(json!({
            "_id": { "server": server_id.as_str(), "user": user_id.as_str() },
            "roles": []
        }))
    }

    #[inline]
    pub fn server_id(&self) -> &Id {
        &self.id.server
    }

    #[inline]
    pub fn user_id(&self) -> &Id {
        &self.id.user
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|id| id == role_id)
    }

    /// Drop a role id from this member, returns whether it was present
    pub fn remove_role(&mut self, role_id: &str) -> ModelResult<bool> {
        if !self.has_role(role_id) {
            return Ok(false);
        }
        let remaining: Vec<Value> = self
            .role_ids
            .iter()
            .filter(|id| *id != role_id)
            .map(|id| Value::String(id.to_string()))
            .collect();
        self.set_field("roles", Value::Array(remaining))?;
        Ok(true)
    }
}

impl Model for Member {
    const NAME: &'static str = "Member";
    const CLEAR_MARKERS: ClearMarkers = &[("Nickname", &["nickname"]), ("Avatar", &["avatar"])];

    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn set_raw(&mut self, raw: RawObject) {
        self.raw = raw;
    }
}
