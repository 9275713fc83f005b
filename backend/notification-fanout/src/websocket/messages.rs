/// WebSocket frames exchanged with browser clients
use crate::models::{Notification, UserId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Frames sent by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Handshake binding this connection to a user, sent once after connect
    #[serde(rename = "AUTH")]
    Auth {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
}

impl ClientMessage {
    pub fn auth(user_id: UserId) -> Self {
        ClientMessage::Auth { user_id }
    }

    /// Parse a text frame. Anything that is not a well-formed known frame is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames pushed by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage<'a> {
    #[serde(rename = "NOTIFICATION")]
    Notification { payload: Cow<'a, Notification> },
}

impl<'a> ServerMessage<'a> {
    pub fn notification(payload: &'a Notification) -> Self {
        ServerMessage::Notification {
            payload: Cow::Borrowed(payload),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerMessage<'static> {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
