//! Message entity - immutable snapshot carried by message events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attachment, Embed};
use crate::value_objects::Id;

/// Message generated by the server instead of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SystemMessage {
    Text {
        content: String,
    },
    UserAdded {
        #[serde(rename = "id")]
        user_id: Id,
        #[serde(rename = "by")]
        actor_id: Id,
    },
    UserRemove {
        #[serde(rename = "id")]
        user_id: Id,
        #[serde(rename = "by")]
        actor_id: Id,
    },
    UserJoined {
        #[serde(rename = "id")]
        user_id: Id,
    },
    UserLeft {
        #[serde(rename = "id")]
        user_id: Id,
    },
    UserKicked {
        #[serde(rename = "id")]
        user_id: Id,
    },
    UserBanned {
        #[serde(rename = "id")]
        user_id: Id,
    },
    ChannelRenamed {
        name: String,
        #[serde(rename = "by")]
        actor_id: Id,
    },
    ChannelDescriptionChanged {
        #[serde(rename = "by")]
        actor_id: Id,
    },
    ChannelIconChanged {
        #[serde(rename = "by")]
        actor_id: Id,
    },
    #[serde(other)]
    Unknown,
}

/// Message body: either plain text or a system message, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    System(SystemMessage),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(rename = "channel")]
    pub channel_id: Id,
    #[serde(rename = "author")]
    pub author_id: Id,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, rename = "edited")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default, rename = "mentions")]
    pub mention_ids: Vec<Id>,
    #[serde(default, rename = "replies")]
    pub reply_ids: Vec<Id>,
}

impl Message {
    /// Check if this is a system message
    #[inline]
    pub fn is_system(&self) -> bool {
        matches!(self.content, MessageContent::System(_))
    }

    /// Text content, if this is a user message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::System(_) => None,
        }
    }

    pub fn system_message(&self) -> Option<&SystemMessage> {
        match &self.content {
            MessageContent::System(system) => Some(system),
            MessageContent::Text(_) => None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.id.created_at()
    }

    /// Check if the message was edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }
}
