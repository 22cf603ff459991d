//! The in-memory state store.
//!
//! Servers, channels and users are keyed by id. Members and roles live inside
//! their server. Entities reference each other by id only.

use std::collections::HashMap;

use mutiny_core::{Channel, Id, Member, Server, User};

use super::error::{CacheError, CacheResult};

/// Cached entities visible to the connected client
#[derive(Debug, Default)]
pub struct State {
    servers: HashMap<Id, Server>,
    channels: HashMap<Id, Channel>,
    users: HashMap<Id, User>,
    user_id: Option<Id>,
}

impl State {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn server(&self, server_id: &str) -> Option<&Server> {
        self.servers.get(server_id)
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn member(&self, server_id: &str, user_id: &str) -> Option<&Member> {
        self.server(server_id)?.member(user_id)
    }

    /// The authenticated user, once a Ready event identified it
    pub fn current_user(&self) -> Option<&User> {
        self.users.get(self.user_id.as_ref()?)
    }

    pub fn current_user_id(&self) -> Option<&Id> {
        self.user_id.as_ref()
    }

    pub fn is_current_user(&self, user_id: &str) -> bool {
        self.user_id.as_ref().is_some_and(|id| id == user_id)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.values()
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Cached channels owned by a server
    pub fn server_channels<'a>(&'a self, server_id: &'a str) -> impl Iterator<Item = &'a Channel> {
        self.channels
            .values()
            .filter(move |channel| channel.server_id().is_some_and(|id| id == server_id))
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.channels.is_empty() && self.users.is_empty()
    }

    // =========================================================================
    // Full refresh
    // =========================================================================

    /// Discard every cached entity and load a full snapshot
    ///
    /// The authenticated user is the one whose relationship marks it as self.
    /// Members are attached to their server; members of unknown servers and
    /// server channels of unknown servers are skipped. Returns the number of
    /// skipped entries.
    pub fn replace_all(
        &mut self,
        servers: Vec<Server>,
        channels: Vec<Channel>,
        users: Vec<User>,
        members: Vec<Member>,
    ) -> usize {
        self.clear();
        let mut skipped = 0;

        for user in users {
            self.insert_user(user);
        }

        for server in servers {
            self.servers.insert(server.id.clone(), server);
        }

        for channel in channels {
            if let Some(server_id) = channel.server_id() {
                if !self.servers.contains_key(server_id) {
                    tracing::warn!(
                        channel_id = %channel.id,
                        server_id = %server_id,
                        "Skipping channel of unknown server"
                    );
                    skipped += 1;
                    continue;
                }
            }
            self.channels.insert(channel.id.clone(), channel);
        }

        for member in members {
            match self.servers.get_mut(member.server_id()) {
                Some(server) => server.insert_member(member),
                None => {
                    tracing::warn!(
                        server_id = %member.server_id(),
                        user_id = %member.user_id(),
                        "Skipping member of unknown server"
                    );
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            servers = self.servers.len(),
            channels = self.channels.len(),
            users = self.users.len(),
            skipped,
            "State replaced"
        );

        skipped
    }

    /// Remove every cached entity
    pub fn clear(&mut self) {
        self.servers.clear();
        self.channels.clear();
        self.users.clear();
        self.user_id = None;
    }

    // =========================================================================
    // Servers
    // =========================================================================

    pub fn insert_server(&mut self, server: Server) -> Option<Server> {
        self.servers.insert(server.id.clone(), server)
    }

    pub fn server_mut(&mut self, server_id: &str) -> CacheResult<&mut Server> {
        self.servers
            .get_mut(server_id)
            .ok_or_else(|| CacheError::ServerNotFound(Id::new(server_id)))
    }

    /// Remove a server together with every cached channel it owns
    pub fn remove_server(&mut self, server_id: &str) -> Option<Server> {
        let server = self.servers.remove(server_id)?;
        self.channels
            .retain(|_, channel| channel.server_id().map_or(true, |id| id != server_id));
        Some(server)
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Insert a channel; server channels are also listed on their server
    pub fn insert_channel(&mut self, channel: Channel) -> CacheResult<Option<Channel>> {
        if let Some(server_id) = channel.server_id() {
            self.server_mut(server_id.as_str())?.add_channel(&channel.id);
        }
        Ok(self.channels.insert(channel.id.clone(), channel))
    }

    pub fn channel_mut(&mut self, channel_id: &str) -> CacheResult<&mut Channel> {
        self.channels
            .get_mut(channel_id)
            .ok_or_else(|| CacheError::ChannelNotFound(Id::new(channel_id)))
    }

    /// Remove a channel and drop it from its server's channel list
    pub fn remove_channel(&mut self, channel_id: &str) -> Option<Channel> {
        let channel = self.channels.remove(channel_id)?;
        if let Some(server) = channel
            .server_id()
            .and_then(|server_id| self.servers.get_mut(server_id))
        {
            server.remove_channel(channel_id);
        }
        Some(channel)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user; a user marked as self becomes the authenticated user
    pub fn insert_user(&mut self, user: User) -> Option<User> {
        if user.is_self() {
            self.user_id = Some(user.id.clone());
        }
        self.users.insert(user.id.clone(), user)
    }

    pub fn user_mut(&mut self, user_id: &str) -> CacheResult<&mut User> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| CacheError::UserNotFound(Id::new(user_id)))
    }

    pub fn current_user_mut(&mut self) -> CacheResult<&mut User> {
        let user_id = self.user_id.clone().ok_or(CacheError::CurrentUserUnknown)?;
        self.user_mut(user_id.as_str())
    }

    // =========================================================================
    // Members
    // =========================================================================

    pub fn member_mut(&mut self, server_id: &str, user_id: &str) -> CacheResult<&mut Member> {
        self.server_mut(server_id)?
            .member_mut(user_id)
            .ok_or_else(|| CacheError::MemberNotFound {
                server: Id::new(server_id),
                user: Id::new(user_id),
            })
    }

    /// Remove a member; unknown servers and members are a no-op
    pub fn remove_member(&mut self, server_id: &str, user_id: &str) -> Option<Member> {
        self.servers.get_mut(server_id)?.remove_member(user_id)
    }
}
