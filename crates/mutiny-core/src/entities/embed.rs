//! Message embeds

use serde::{Deserialize, Serialize};

use super::Attachment;

/// Image size hint for embedded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    Large,
    Preview,
}

/// Image attached to a website embed, or a standalone image embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size: ImageSize,
}

/// Video attached to a website embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedVideo {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Extra information about well-known websites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmbeddedSpecial {
    None,
    #[serde(rename = "GIF")]
    Gif,
    YouTube {
        id: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
    Lightspeed {
        id: String,
        content_type: String,
    },
    Twitch {
        id: String,
        content_type: String,
    },
    Spotify {
        id: String,
        content_type: String,
    },
    Soundcloud,
    Bandcamp {
        id: String,
        content_type: String,
    },
    #[serde(other)]
    Unknown,
}

/// Embed generated for a link in message content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebsiteEmbed {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub special: Option<EmbeddedSpecial>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<EmbeddedImage>,
    #[serde(default)]
    pub video: Option<EmbeddedVideo>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
}

/// Custom text embed sent by bots
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextEmbed {
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Option<Attachment>,
    #[serde(default)]
    pub colour: Option<String>,
}

/// Embed attached to a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Embed {
    /// No embed could be generated for the first URL
    None,
    Website(WebsiteEmbed),
    Image(EmbeddedImage),
    Text(TextEmbed),
    #[serde(other)]
    Unknown,
}

impl Embed {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Website(embed) => embed.title.as_deref(),
            Self::Text(embed) => embed.title.as_deref(),
            _ => None,
        }
    }
}
