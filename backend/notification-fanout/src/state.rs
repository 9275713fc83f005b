use std::sync::Arc;

use crate::config::WebSocketConfig;
use crate::websocket::{SessionPublisher, SessionRegistry};

/// Process-wide composition root: one registry shared by the WebSocket
/// sessions and the publisher.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub publisher: SessionPublisher,
    pub websocket: WebSocketConfig,
}

impl AppState {
    pub fn new(websocket: WebSocketConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let publisher = SessionPublisher::new(Arc::clone(&registry));
        Self {
            registry,
            publisher,
            websocket,
        }
    }
}
