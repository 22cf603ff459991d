//! Domain entities - the objects mirrored by the client cache

mod attachment;
mod channel;
mod embed;
mod member;
mod message;
mod role;
mod server;
mod user;

pub use attachment::{Attachment, AttachmentMetadata, AttachmentTag};
pub use channel::{
    Channel, ChannelKind, DirectMessageChannel, GroupChannel, SavedMessagesChannel, TextChannel,
    VoiceChannel,
};
pub use embed::{
    Embed, EmbeddedImage, EmbeddedSpecial, EmbeddedVideo, ImageSize, TextEmbed, WebsiteEmbed,
};
pub use member::{Member, MemberId};
pub use message::{Message, MessageContent, SystemMessage};
pub use role::{PermissionPair, Role};
pub use server::{Category, Server, SystemMessageChannels};
pub use user::{BotInfo, Presence, Relationship, RelationshipStatus, Status, User, UserProfile};
