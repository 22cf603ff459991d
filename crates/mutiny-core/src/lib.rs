//! # mutiny-core
//!
//! Domain layer containing the cached entity models, the `Id` value object and the
//! raw-payload `Model` trait used to apply partial updates.
//! This crate has no I/O and no async runtime dependency.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, AttachmentMetadata, AttachmentTag, BotInfo, Category, Channel, ChannelKind,
    DirectMessageChannel, Embed, EmbeddedImage, EmbeddedSpecial, EmbeddedVideo, GroupChannel,
    ImageSize, Member, MemberId, Message, MessageContent, PermissionPair, Presence, Relationship,
    RelationshipStatus, Role, SavedMessagesChannel, Server, Status, SystemMessage,
    SystemMessageChannels, TextChannel, TextEmbed, User, UserProfile, VoiceChannel, WebsiteEmbed,
};
pub use error::{ModelError, ModelResult};
pub use traits::{ClearMarkers, Model, RawObject};
pub use value_objects::Id;
