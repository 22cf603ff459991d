//! Channel entity - saved messages, direct messages, groups and server channels
//!
//! The last message of a channel is stored as a bare id (`last_message_id`).
//! Payloads that carry the older nested form (`last_message: {"_id": ...}`) or a
//! bare string under `last_message` decode to the same field.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

use super::Attachment;
use crate::error::{ModelError, ModelResult};
use crate::traits::{ClearMarkers, Model, RawObject};
use crate::value_objects::Id;

/// Personal notes channel
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedMessagesChannel {
    #[serde(rename = "user")]
    pub user_id: Id,
}

/// One-to-one conversation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectMessageChannel {
    pub active: bool,
    #[serde(rename = "recipients")]
    pub recipient_ids: Vec<Id>,
    #[serde(default, alias = "last_message", deserialize_with = "last_message_id")]
    pub last_message_id: Option<Id>,
}

/// Group conversation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupChannel {
    #[serde(rename = "recipients")]
    pub recipient_ids: Vec<Id>,
    pub name: String,
    #[serde(rename = "owner")]
    pub owner_id: Id,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "last_message", deserialize_with = "last_message_id")]
    pub last_message_id: Option<Id>,
    #[serde(default)]
    pub icon: Option<Attachment>,
    #[serde(default)]
    pub permissions: u64,
    #[serde(default)]
    pub nsfw: bool,
}

/// Text channel inside a server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextChannel {
    #[serde(rename = "server")]
    pub server_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<Attachment>,
    #[serde(default)]
    pub default_permissions: u64,
    #[serde(default)]
    pub role_permissions: HashMap<Id, u64>,
    #[serde(default, alias = "last_message", deserialize_with = "last_message_id")]
    pub last_message_id: Option<Id>,
    #[serde(default)]
    pub nsfw: bool,
}

/// Voice channel inside a server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoiceChannel {
    #[serde(rename = "server")]
    pub server_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<Attachment>,
    #[serde(default)]
    pub default_permissions: u64,
    #[serde(default)]
    pub role_permissions: HashMap<Id, u64>,
    #[serde(default)]
    pub nsfw: bool,
}

/// Channel variant, selected by `channel_type`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "channel_type")]
pub enum ChannelKind {
    SavedMessages(SavedMessagesChannel),
    DirectMessage(DirectMessageChannel),
    Group(GroupChannel),
    TextChannel(TextChannel),
    VoiceChannel(VoiceChannel),
    #[serde(other)]
    Unknown,
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(flatten)]
    pub kind: ChannelKind,
    #[serde(skip)]
    raw: RawObject,
}

fn last_message_id<'de, D>(deserializer: D) -> Result<Option<Id>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LastMessage {
        Bare(Id),
        Nested {
            #[serde(rename = "_id")]
            id: Id,
        },
    }

    Ok(
        Option::<LastMessage>::deserialize(deserializer)?.map(|last| match last {
            LastMessage::Bare(id) | LastMessage::Nested { id } => id,
        }),
    )
}

impl Channel {
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.id.created_at()
    }

    /// Owning server for server channels
    pub fn server_id(&self) -> Option<&Id> {
        match &self.kind {
            ChannelKind::TextChannel(channel) => Some(&channel.server_id),
            ChannelKind::VoiceChannel(channel) => Some(&channel.server_id),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ChannelKind::Group(channel) => Some(&channel.name),
            ChannelKind::TextChannel(channel) => Some(&channel.name),
            ChannelKind::VoiceChannel(channel) => Some(&channel.name),
            _ => None,
        }
    }

    /// Recipients of direct message and group channels
    pub fn recipient_ids(&self) -> Option<&[Id]> {
        match &self.kind {
            ChannelKind::DirectMessage(channel) => Some(&channel.recipient_ids),
            ChannelKind::Group(channel) => Some(&channel.recipient_ids),
            _ => None,
        }
    }

    pub fn last_message_id(&self) -> Option<&Id> {
        match &self.kind {
            ChannelKind::DirectMessage(channel) => channel.last_message_id.as_ref(),
            ChannelKind::Group(channel) => channel.last_message_id.as_ref(),
            ChannelKind::TextChannel(channel) => channel.last_message_id.as_ref(),
            _ => None,
        }
    }

    /// Check if this channel kind tracks its last message
    pub fn tracks_last_message(&self) -> bool {
        matches!(
            self.kind,
            ChannelKind::DirectMessage(_) | ChannelKind::Group(_) | ChannelKind::TextChannel(_)
        )
    }

    /// Point the channel at a new last message
    pub fn set_last_message_id(&mut self, message_id: &Id) -> ModelResult<()> {
        let mut raw = self.raw.clone();
        raw.remove("last_message");
        raw.insert(
            "last_message_id".to_string(),
            Value::String(message_id.to_string()),
        );
        *self = Self::from_raw(raw)?;
        Ok(())
    }

    /// Append a recipient to a group or direct message channel
    pub fn add_recipient(&mut self, user_id: &Id) -> ModelResult<()> {
        let mut recipients = self.recipients_for_edit()?;
        if recipients.iter().any(|id| id == user_id) {
            return Ok(());
        }
        recipients.push(user_id.clone());
        self.set_recipients(&recipients)
    }

    /// Remove a recipient, returns whether it was present
    pub fn remove_recipient(&mut self, user_id: &str) -> ModelResult<bool> {
        let mut recipients = self.recipients_for_edit()?;
        let before = recipients.len();
        recipients.retain(|id| id != user_id);
        if recipients.len() == before {
            return Ok(false);
        }
        self.set_recipients(&recipients)?;
        Ok(true)
    }

    fn recipients_for_edit(&self) -> ModelResult<Vec<Id>> {
        self.recipient_ids()
            .map(<[Id]>::to_vec)
            .ok_or_else(|| ModelError::InvalidValue {
                field: "recipients",
                reason: format!("channel {} has no recipient list", self.id),
            })
    }

    fn set_recipients(&mut self, recipients: &[Id]) -> ModelResult<()> {
        let ids = recipients
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        self.set_field("recipients", Value::Array(ids))
    }
}

impl Model for Channel {
    const NAME: &'static str = "Channel";
    const CLEAR_MARKERS: ClearMarkers = &[("Icon", &["icon"]), ("Description", &["description"])];

    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn set_raw(&mut self, raw: RawObject) {
        self.raw = raw;
    }
}
