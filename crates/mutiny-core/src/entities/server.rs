//! Server entity - a community with channels, roles and members

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Attachment, Member, PermissionPair, Role};
use crate::traits::{ClearMarkers, Model, RawObject};
use crate::value_objects::Id;

/// Channel grouping shown in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(rename = "channels")]
    pub channel_ids: Vec<Id>,
}

/// Channels that receive system messages
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemMessageChannels {
    #[serde(default, rename = "user_joined")]
    pub user_joined_id: Option<Id>,
    #[serde(default, rename = "user_left")]
    pub user_left_id: Option<Id>,
    #[serde(default, rename = "user_kicked")]
    pub user_kicked_id: Option<Id>,
    #[serde(default, rename = "user_banned")]
    pub user_banned_id: Option<Id>,
}

/// Server entity
///
/// Members are not part of the server payload; they are attached from the
/// Ready event and member events and survive partial updates of the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(rename = "owner")]
    pub owner_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "channels")]
    pub channel_ids: Vec<Id>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default, rename = "system_messages")]
    pub system_message_channels: SystemMessageChannels,
    #[serde(default, deserialize_with = "roles_by_id")]
    pub roles: HashMap<Id, Role>,
    #[serde(default)]
    pub default_permissions: PermissionPair,
    #[serde(default)]
    pub icon: Option<Attachment>,
    #[serde(default)]
    pub banner: Option<Attachment>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub flags: u64,
    #[serde(skip)]
    members: HashMap<Id, Member>,
    #[serde(skip)]
    raw: RawObject,
}

fn roles_by_id<'de, D>(deserializer: D) -> Result<HashMap<Id, Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<HashMap<Id, RawObject>>::deserialize(deserializer)?.unwrap_or_default();
    entries
        .into_iter()
        .map(|(id, raw)| {
            Role::from_entry(&id, raw)
                .map(|role| (id, role))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

impl Server {
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.id.created_at()
    }

    // === Members ===

    pub fn member(&self, user_id: &str) -> Option<&Member> {
        self.members.get(user_id)
    }

    pub fn member_mut(&mut self, user_id: &str) -> Option<&mut Member> {
        self.members.get_mut(user_id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Insert or replace a member, keyed by its user id
    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(member.user_id().clone(), member);
    }

    pub fn remove_member(&mut self, user_id: &str) -> Option<Member> {
        self.members.remove(user_id)
    }

    // === Roles ===

    pub fn role(&self, role_id: &str) -> Option<&Role> {
        self.roles.get(role_id)
    }

    /// Insert or replace a role, keeping the raw payload in sync
    pub fn upsert_role(&mut self, role: Role) {
        let roles = self
            .raw
            .entry("roles")
            .or_insert_with(|| Value::Object(RawObject::new()));
        if let Value::Object(entries) = roles {
            entries.insert(role.id.to_string(), Value::Object(role.raw().clone()));
        }
        self.roles.insert(role.id.clone(), role);
    }

    /// Remove a role and strip it from every member
    pub fn remove_role(&mut self, role_id: &str) -> Option<Role> {
        if let Some(Value::Object(entries)) = self.raw.get_mut("roles") {
            entries.remove(role_id);
        }
        let removed = self.roles.remove(role_id)?;

        for member in self.members.values_mut() {
            if let Err(e) = member.remove_role(role_id) {
                tracing::debug!(
                    server_id = %self.id,
                    role_id = %role_id,
                    error = %e,
                    "Failed to strip deleted role from member"
                );
            }
        }

        Some(removed)
    }

    // === Channels ===

    pub fn has_channel(&self, channel_id: &str) -> bool {
        self.channel_ids.iter().any(|id| id == channel_id)
    }

    /// Append a channel id if not already listed
    pub fn add_channel(&mut self, channel_id: &Id) {
        if self.has_channel(channel_id.as_str()) {
            return;
        }
        self.channel_ids.push(channel_id.clone());
        self.sync_channel_ids();
    }

    /// Remove a channel id from the channel list and every category
    pub fn remove_channel(&mut self, channel_id: &str) -> bool {
        let before = self.channel_ids.len();
        self.channel_ids.retain(|id| id != channel_id);
        for category in &mut self.categories {
            category.channel_ids.retain(|id| id != channel_id);
        }
        if let Some(Value::Array(categories)) = self.raw.get_mut("categories") {
            for category in categories {
                if let Some(Value::Array(ids)) = category.get_mut("channels") {
                    ids.retain(|id| id.as_str() != Some(channel_id));
                }
            }
        }
        self.sync_channel_ids();
        self.channel_ids.len() != before
    }

    fn sync_channel_ids(&mut self) {
        let ids = self
            .channel_ids
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        self.raw.insert("channels".to_string(), Value::Array(ids));
    }
}

impl Model for Server {
    const NAME: &'static str = "Server";
    const CLEAR_MARKERS: ClearMarkers = &[
        ("Icon", &["icon"]),
        ("Banner", &["banner"]),
        ("Description", &["description"]),
    ];

    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn set_raw(&mut self, raw: RawObject) {
        self.raw = raw;
    }

    fn carry_over(&mut self, previous: &mut Self) {
        self.members = std::mem::take(&mut previous.members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server() -> Server {
        Server::from_value(json!({
            "_id": "01FD58YK5W7QRV5H3D64NTQ5HD",
            "owner": "owner",
            "name": "Test Server",
            "description": "desc",
            "channels": ["c1", "c2"],
            "categories": [{"id": "cat", "title": "Main", "channels": ["c1", "c2"]}],
            "system_messages": {"user_joined": "c1"},
            "roles": {
                "r1": {"name": "Admin", "permissions": [1, 2], "rank": 0},
                "r2": {"name": "Member", "permissions": [0, 0], "rank": 5}
            },
            "default_permissions": [3, 4]
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_server() {
        let server = server();
        assert_eq!(server.name, "Test Server");
        assert_eq!(server.roles.len(), 2);
        assert_eq!(server.role("r1").unwrap().name, "Admin");
        assert_eq!(server.role("r1").unwrap().id, "r1");
        assert_eq!(
            server.system_message_channels.user_joined_id,
            Some(Id::new("c1"))
        );
        assert_eq!(server.default_permissions.channel, 4);
        assert!(server.created_at().is_some());
    }

    #[test]
    fn test_members_survive_patch() {
        let mut server = server();
        server.insert_member(Member::bare(&server.id.clone(), &Id::new("u1")).unwrap());

        let mut data = RawObject::new();
        data.insert("name".to_string(), json!("Renamed"));
        server
            .apply_patch(&["Description".to_string()], &data)
            .unwrap();

        assert_eq!(server.name, "Renamed");
        assert!(server.description.is_none());
        assert_eq!(server.member_count(), 1);
        assert!(server.member("u1").is_some());
    }

    #[test]
    fn test_role_changes_survive_patch() {
        let mut server = server();
        let mut role = server.role("r2").unwrap().clone();
        let mut data = RawObject::new();
        data.insert("name".to_string(), json!("Regular"));
        role.apply_patch(&[], &data).unwrap();
        server.upsert_role(role);

        server.set_field("nsfw", json!(true)).unwrap();
        assert!(server.nsfw);
        assert_eq!(server.role("r2").unwrap().name, "Regular");
    }

    #[test]
    fn test_remove_role_strips_members() {
        let mut server = server();
        let member = Member::from_value(json!({
            "_id": {"server": "01FD58YK5W7QRV5H3D64NTQ5HD", "user": "u1"},
            "roles": ["r1"]
        }))
        .unwrap();
        server.insert_member(member);

        assert!(server.remove_role("r1").is_some());
        assert!(server.remove_role("r1").is_none());
        assert!(server.member("u1").unwrap().role_ids.is_empty());

        server.set_field("name", json!("again")).unwrap();
        assert!(server.role("r1").is_none());
    }

    #[test]
    fn test_channel_list_edits() {
        let mut server = server();
        server.add_channel(&Id::new("c3"));
        server.add_channel(&Id::new("c3"));
        assert_eq!(server.channel_ids.len(), 3);

        assert!(server.remove_channel("c1"));
        assert!(!server.remove_channel("missing"));
        assert!(!server.has_channel("c1"));
        assert_eq!(server.categories[0].channel_ids, vec![Id::new("c2")]);

        // Raw payload follows the typed view
        server.set_field("nsfw", json!(false)).unwrap();
        assert_eq!(server.channel_ids, vec![Id::new("c2"), Id::new("c3")]);
        assert_eq!(server.categories[0].channel_ids, vec![Id::new("c2")]);
    }
}
