//! Applying events to the state store
//!
//! Runs once per event on the receive loop, before listeners see the event.
//! Patches touch only the fields an event carries. Deletes of entities that are
//! not cached are no-ops.

use mutiny_cache::{CacheError, State};
use mutiny_core::{Member, Model, ModelError, Role};

use super::event::Event;
use super::payloads::{
    ChannelGroupLeaveEvent, MessageEvent, ServerMemberLeaveEvent, ServerRoleUpdateEvent,
    UserRelationshipEvent,
};

/// Failure to apply an event; the event is dropped, the connection stays up
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for apply steps
pub type ApplyResult<T> = Result<T, ApplyError>;

impl Event {
    /// Apply this event's side effects to the state store
    pub fn apply(&self, state: &mut State) -> ApplyResult<()> {
        match self {
            Self::Ready(ready) => {
                state.replace_all(
                    ready.servers.clone(),
                    ready.channels.clone(),
                    ready.users.clone(),
                    ready.members.clone(),
                );
            }
            Self::Message(event) => apply_message(state, event)?,

            Self::ChannelCreate(event) => {
                state.insert_channel(event.channel.clone())?;
            }
            Self::ChannelUpdate(event) => state
                .channel_mut(event.channel_id.as_str())?
                .apply_patch(&event.clear, &event.data)?,
            Self::ChannelDelete(event) => {
                state.remove_channel(event.channel_id.as_str());
            }
            Self::ChannelGroupJoin(event) => state
                .channel_mut(event.channel_id.as_str())?
                .add_recipient(&event.user_id)?,
            Self::ChannelGroupLeave(event) => apply_group_leave(state, event)?,

            Self::ServerUpdate(event) => state
                .server_mut(event.server_id.as_str())?
                .apply_patch(&event.clear, &event.data)?,
            Self::ServerDelete(event) => {
                state.remove_server(event.server_id.as_str());
            }
            Self::ServerMemberUpdate(event) => state
                .member_mut(event.member_id.server.as_str(), event.member_id.user.as_str())?
                .apply_patch(&event.clear, &event.data)?,
            Self::ServerMemberJoin(event) => {
                let member = Member::bare(&event.server_id, &event.user_id)?;
                state.server_mut(event.server_id.as_str())?.insert_member(member);
            }
            Self::ServerMemberLeave(event) => apply_member_leave(state, event),
            Self::ServerRoleUpdate(event) => apply_role_update(state, event)?,
            Self::ServerRoleDelete(event) => {
                if let Ok(server) = state.server_mut(event.server_id.as_str()) {
                    server.remove_role(event.role_id.as_str());
                }
            }

            Self::UserUpdate(event) => state
                .user_mut(event.user_id.as_str())?
                .apply_patch(&event.clear, &event.data)?,
            Self::UserRelationship(event) => apply_relationship(state, event)?,

            Self::Error(_)
            | Self::Authenticated(_)
            | Self::Pong(_)
            | Self::MessageUpdate(_)
            | Self::MessageDelete(_)
            | Self::ChannelStartTyping(_)
            | Self::ChannelStopTyping(_)
            | Self::ChannelAck(_)
            | Self::Unknown(_) => {}
        }
        Ok(())
    }
}

/// System messages never move the last-message pointer
fn apply_message(state: &mut State, event: &MessageEvent) -> ApplyResult<()> {
    let message = &event.message;
    let channel = state.channel_mut(message.channel_id.as_str())?;
    if message.is_system() || !channel.tracks_last_message() {
        return Ok(());
    }
    channel.set_last_message_id(&message.id)?;
    Ok(())
}

/// The current user leaving a group loses the whole channel
fn apply_group_leave(state: &mut State, event: &ChannelGroupLeaveEvent) -> ApplyResult<()> {
    if state.is_current_user(event.user_id.as_str()) {
        state.remove_channel(event.channel_id.as_str());
        return Ok(());
    }
    state
        .channel_mut(event.channel_id.as_str())?
        .remove_recipient(event.user_id.as_str())?;
    Ok(())
}

/// The current user leaving a server loses the whole server
fn apply_member_leave(state: &mut State, event: &ServerMemberLeaveEvent) {
    if state.is_current_user(event.user_id.as_str()) {
        state.remove_server(event.server_id.as_str());
    } else {
        state.remove_member(event.server_id.as_str(), event.user_id.as_str());
    }
}

/// Patches a cached role or creates it from the update data
fn apply_role_update(state: &mut State, event: &ServerRoleUpdateEvent) -> ApplyResult<()> {
    let server = state.server_mut(event.server_id.as_str())?;
    let role = match server.role(event.role_id.as_str()) {
        Some(existing) => {
            let mut role = existing.clone();
            role.apply_patch(&event.clear, &event.data)?;
            role
        }
        None => Role::from_entry(&event.role_id, event.data.clone())?,
    };
    server.upsert_role(role);
    Ok(())
}

fn apply_relationship(state: &mut State, event: &UserRelationshipEvent) -> ApplyResult<()> {
    state
        .current_user_mut()?
        .update_relation(&event.user_id, event.status)?;
    match state.user_mut(event.user_id.as_str()) {
        Ok(user) => user.set_relationship_status(event.status)?,
        Err(_) => tracing::trace!(user_id = %event.user_id, "Relationship target not cached"),
    }
    Ok(())
}
