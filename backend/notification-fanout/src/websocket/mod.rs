/// WebSocket real-time notification fan-out
///
/// Architecture:
/// 1. ConnectionRegistry: live connections and their bound user identity
/// 2. NotificationSession: per-connection actor, AUTH handshake, close handling
/// 3. NotificationPublisher: best-effort delivery to every connection of a user

pub mod messages;
pub mod publisher;
pub mod registry;
pub mod session;

pub use messages::{ClientMessage, ServerMessage};
pub use publisher::{NotificationPublisher, NotifyUser};
pub use registry::{ChannelSender, ConnectionId, ConnectionRegistry, SocketHandle};
pub use session::{NotificationSession, PushFrame, SessionHandle, SessionRegistry};

/// Publisher over live WebSocket sessions
pub type SessionPublisher = NotificationPublisher<SessionHandle>;
