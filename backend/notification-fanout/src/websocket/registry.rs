/// Live connection registry
///
/// Tracks every accepted WebSocket connection and the user identity bound to
/// it by the AUTH handshake. Supports:
/// - Registration on accept, removal on close (idempotent)
/// - Late identity binding, silently ignored once the connection is gone
/// - Lookup of all live connections of a user (multiple tabs/devices)
use crate::error::SendError;
use crate::models::UserId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Transport-side handle the registry holds for each connection.
///
/// The transport owns the connection lifecycle; the registry only checks
/// readiness and hands frames over. `send_text` must not block.
pub trait SocketHandle: Clone + Send + Sync + 'static {
    fn is_open(&self) -> bool;

    fn send_text(&self, frame: Arc<str>) -> Result<(), SendError>;
}

/// In-process subscriber fed through an unbounded channel
pub type ChannelSender = mpsc::UnboundedSender<Arc<str>>;

impl SocketHandle for ChannelSender {
    fn is_open(&self) -> bool {
        !self.is_closed()
    }

    fn send_text(&self, frame: Arc<str>) -> Result<(), SendError> {
        self.send(frame).map_err(|_| SendError)
    }
}

/// Unique identifier of one accepted connection, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct ConnectionEntry<H> {
    user_id: Option<UserId>,
    handle: H,
    connected_at: DateTime<Utc>,
}

/// Registry of live connections keyed by connection id.
///
/// Backed by a sharded concurrent map: every method holds a shard lock only
/// for the duration of the map access and never performs I/O under it.
/// Lookups return snapshots, so callers send after all locks are released.
pub struct ConnectionRegistry<H> {
    connections: DashMap<ConnectionId, ConnectionEntry<H>>,
}

impl<H: SocketHandle> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a freshly accepted connection under a new id
    pub fn connect(&self, handle: H) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.register(connection_id, handle);
        connection_id
    }

    /// Insert a connection with no identity
    pub fn register(&self, connection_id: ConnectionId, handle: H) {
        let entry = ConnectionEntry {
            user_id: None,
            handle,
            connected_at: Utc::now(),
        };

        if self.connections.insert(connection_id, entry).is_some() {
            tracing::warn!(%connection_id, "connection id registered twice, replacing entry");
        }

        tracing::debug!(
            %connection_id,
            total = self.connections.len(),
            "registered connection"
        );
    }

    /// Bind a user identity to a live connection.
    ///
    /// Returns false when the connection already closed; the handshake is then
    /// simply ineffective. A repeated handshake replaces the identity.
    pub fn bind_identity(&self, connection_id: ConnectionId, user_id: UserId) -> bool {
        match self.connections.get_mut(&connection_id) {
            Some(mut entry) => {
                let previous = entry.user_id.replace(user_id);
                if let Some(previous) = previous.filter(|p| *p != user_id) {
                    tracing::debug!(%connection_id, %previous, %user_id, "connection identity replaced");
                } else {
                    tracing::debug!(%connection_id, %user_id, "connection identity bound");
                }
                true
            }
            None => {
                tracing::debug!(%connection_id, %user_id, "handshake for closed connection ignored");
                false
            }
        }
    }

    /// Remove a connection. Safe to call more than once.
    pub fn unregister(&self, connection_id: ConnectionId) -> bool {
        match self.connections.remove(&connection_id) {
            Some((_, entry)) => {
                let lifetime = Utc::now().signed_duration_since(entry.connected_at);
                tracing::debug!(
                    %connection_id,
                    user_id = ?entry.user_id,
                    lifetime_secs = lifetime.num_seconds(),
                    remaining = self.connections.len(),
                    "unregistered connection"
                );
                true
            }
            None => false,
        }
    }

    /// Snapshot of the handles of every connection bound to `user_id`.
    ///
    /// Order is unspecified. Empty when the user is not connected.
    pub fn find_by_identity(&self, user_id: UserId) -> Vec<H> {
        self.connections
            .iter()
            .filter(|entry| entry.user_id == Some(user_id))
            .map(|entry| entry.handle.clone())
            .collect()
    }

    /// Snapshot of the handles of every identified connection
    pub fn bound_handles(&self) -> Vec<H> {
        self.connections
            .iter()
            .filter(|entry| entry.user_id.is_some())
            .map(|entry| entry.handle.clone())
            .collect()
    }

    pub fn identity_of(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.connections
            .get(&connection_id)
            .and_then(|entry| entry.user_id)
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    /// Number of live connections bound to `user_id`
    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.user_id == Some(user_id))
            .count()
    }

    pub fn total_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn authenticated_connections(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.user_id.is_some())
            .count()
    }

    /// Distinct users with at least one live connection, ascending
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.connections
            .iter()
            .filter_map(|entry| entry.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<H: SocketHandle> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
