//! Attachment entity - a file stored on the CDN

use serde::{Deserialize, Serialize};

use crate::value_objects::Id;

/// Bucket an attachment was uploaded to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentTag {
    Attachments,
    Avatars,
    Backgrounds,
    Banners,
    Icons,
}

impl AttachmentTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attachments => "attachments",
            Self::Avatars => "avatars",
            Self::Backgrounds => "backgrounds",
            Self::Banners => "banners",
            Self::Icons => "icons",
        }
    }
}

/// File-type specific metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttachmentMetadata {
    File,
    Text,
    Audio,
    Image { width: u32, height: u32 },
    Video { width: u32, height: u32 },
    #[serde(other)]
    Unknown,
}

impl AttachmentMetadata {
    /// Dimensions for image and video attachments
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Image { width, height } | Self::Video { width, height } => {
                Some((*width, *height))
            }
            _ => None,
        }
    }
}

/// Attachment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "_id")]
    pub id: Id,
    pub tag: AttachmentTag,
    /// Size in bytes
    pub size: u64,
    pub filename: String,
    pub metadata: AttachmentMetadata,
    pub content_type: String,
}

impl Attachment {
    /// Build the CDN URL for this attachment
    pub fn url(&self, cdn_url: &str) -> String {
        format!(
            "{}/{}/{}",
            cdn_url.trim_end_matches('/'),
            self.tag.as_str(),
            self.id
        )
    }
}
