/// Per-connection WebSocket actor
///
/// Wires the transport lifecycle to the registry: the actor registers itself
/// when started, binds an identity when the AUTH frame arrives and
/// unregisters when stopped, whatever the reason for stopping.
use super::messages::ClientMessage;
use super::registry::{ConnectionId, ConnectionRegistry, SocketHandle};
use crate::error::SendError;
use crate::metrics;
use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Recipient, StreamHandler};
use actix_web_actors::ws;
use std::sync::Arc;
use std::time::Duration;

/// Registry of live WebSocket sessions
pub type SessionRegistry = ConnectionRegistry<SessionHandle>;

/// Serialized server frame queued for one session
#[derive(Message)]
#[rtype(result = "()")]
pub struct PushFrame(pub Arc<str>);

/// Handle to a running session's mailbox
#[derive(Clone)]
pub struct SessionHandle {
    recipient: Recipient<PushFrame>,
}

impl SessionHandle {
    pub fn new(recipient: Recipient<PushFrame>) -> Self {
        Self { recipient }
    }
}

impl SocketHandle for SessionHandle {
    fn is_open(&self) -> bool {
        self.recipient.connected()
    }

    fn send_text(&self, frame: Arc<str>) -> Result<(), SendError> {
        if !self.recipient.connected() {
            return Err(SendError);
        }
        // do_send queues regardless of mailbox capacity and never waits
        self.recipient.do_send(PushFrame(frame));
        Ok(())
    }
}

pub struct NotificationSession {
    connection_id: ConnectionId,
    registry: Arc<SessionRegistry>,
    keepalive: Option<Duration>,
}

impl NotificationSession {
    pub fn new(registry: Arc<SessionRegistry>, keepalive: Option<Duration>) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            registry,
            keepalive,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    fn handle_text(&self, text: &str) {
        match ClientMessage::from_json(text) {
            Ok(ClientMessage::Auth { user_id }) => {
                if self.registry.bind_identity(self.connection_id, user_id) {
                    metrics::observe_handshake(true);
                    tracing::info!(
                        connection_id = %self.connection_id,
                        %user_id,
                        "WebSocket connection authenticated"
                    );
                }
            }
            Err(e) => {
                metrics::observe_handshake(false);
                tracing::debug!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "discarding unrecognised WebSocket frame"
                );
            }
        }
    }
}

impl Actor for NotificationSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let handle = SessionHandle::new(ctx.address().recipient());
        self.registry.register(self.connection_id, handle);
        metrics::connection_opened();

        tracing::debug!(connection_id = %self.connection_id, "WebSocket session started");

        // Keepalive only; idle or unauthenticated sessions are never closed here
        if let Some(interval) = self.keepalive {
            ctx.run_interval(interval, |_act, ctx| {
                ctx.ping(b"");
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if self.registry.unregister(self.connection_id) {
            metrics::connection_closed();
        }

        tracing::debug!(connection_id = %self.connection_id, "WebSocket session stopped");
    }
}

impl Handler<PushFrame> for NotificationSession {
    type Result = ();

    fn handle(&mut self, msg: PushFrame, ctx: &mut Self::Context) {
        ctx.text(&*msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NotificationSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                self.handle_text(&text);
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    "Binary WebSocket messages not supported"
                );
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(
                    connection_id = %self.connection_id,
                    ?reason,
                    "WebSocket close message received"
                );
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "WebSocket protocol error, closing"
                );
                ctx.stop();
            }
        }
    }
}
