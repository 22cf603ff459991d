//! Role entity - permission group inside a server

use serde::{Deserialize, Serialize};

use crate::traits::{ClearMarkers, Model, RawObject};
use crate::value_objects::Id;

/// Raw permission values as sent on the wire: `[server, channel]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct PermissionPair {
    pub server: u64,
    pub channel: u64,
}

impl From<(u64, u64)> for PermissionPair {
    fn from((server, channel): (u64, u64)) -> Self {
        Self { server, channel }
    }
}

impl From<PermissionPair> for (u64, u64) {
    fn from(pair: PermissionPair) -> Self {
        (pair.server, pair.channel)
    }
}

/// Role entity
///
/// Roles arrive as a map keyed by id; the id is injected into the payload as `_id`
/// when the owning server is decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionPair,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub hoist: bool,
    /// Lower rank means higher in the hierarchy
    #[serde(default)]
    pub rank: i64,
    #[serde(skip)]
    raw: RawObject,
}

impl Role {
    /// Decode a role from its map entry
    pub fn from_entry(id: &Id, mut raw: RawObject) -> crate::ModelResult<Self> {
        raw.insert("_id".to_string(), serde_json::Value::String(id.to_string()));
        Self::from_raw(raw)
    }

    /// Check if this role ranks above another
    pub fn is_above(&self, other: &Role) -> bool {
        self.rank < other.rank
    }
}

impl Model for Role {
    const NAME: &'static str = "Role";
    const CLEAR_MARKERS: ClearMarkers = &[("Colour", &["colour"])];

    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn set_raw(&mut self, raw: RawObject) {
        self.raw = raw;
    }
}
