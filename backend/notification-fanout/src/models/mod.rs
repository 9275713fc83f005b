use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Logical user identity.
///
/// Users are integer rows in the social graph. On the wire the identity is a
/// JSON number in notification payloads, while clients send it string-encoded
/// in the handshake, so both forms are accepted when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawUserId", into = "i64")]
pub struct UserId(i64);

impl UserId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user id: {0:?}")]
pub struct ParseUserIdError(String);

impl FromStr for UserId {
    type Err = ParseUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| ParseUserIdError(s.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Number(i64),
    Text(String),
}

impl TryFrom<RawUserId> for UserId {
    type Error = ParseUserIdError;

    fn try_from(raw: RawUserId) -> Result<Self, Self::Error> {
        match raw {
            RawUserId::Number(id) => Ok(UserId(id)),
            RawUserId::Text(text) => text.parse(),
        }
    }
}

/// Event kinds a user can be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    MusicShare,
    Recommendation,
    CollaborativePlaylist,
    ListeningParty,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::MusicShare => "music_share",
            NotificationKind::Recommendation => "recommendation",
            NotificationKind::CollaborativePlaylist => "collaborative_playlist",
            NotificationKind::ListeningParty => "listening_party",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every notification kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    /// Human-readable text shown to the recipient
    pub content: String,
    /// Id of the row that caused the notification (like, comment, follow, share)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
    /// User who performed the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_user_id: Option<UserId>,
}

impl NotificationBody {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_id: None,
            source_user_id: None,
        }
    }

    pub fn with_source_id(mut self, source_id: i64) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn with_source_user(mut self, source_user_id: UserId) -> Self {
        self.source_user_id = Some(source_user_id);
        self
    }
}

/// A notification as pushed to connected clients.
///
/// The persisted record lives in the storage layer; this is the real-time
/// projection of it. Serializes as `{"type": <kind>, "content": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Like(NotificationBody),
    Comment(NotificationBody),
    Follow(NotificationBody),
    MusicShare(NotificationBody),
    Recommendation(NotificationBody),
    CollaborativePlaylist(NotificationBody),
    ListeningParty(NotificationBody),
}

impl Notification {
    pub fn new(kind: NotificationKind, body: NotificationBody) -> Self {
        match kind {
            NotificationKind::Like => Notification::Like(body),
            NotificationKind::Comment => Notification::Comment(body),
            NotificationKind::Follow => Notification::Follow(body),
            NotificationKind::MusicShare => Notification::MusicShare(body),
            NotificationKind::Recommendation => Notification::Recommendation(body),
            NotificationKind::CollaborativePlaylist => Notification::CollaborativePlaylist(body),
            NotificationKind::ListeningParty => Notification::ListeningParty(body),
        }
    }

    /// `{display_name} started following you`
    ///
    /// The follow row id stays on the stored record; the pushed payload only
    /// names the follower.
    pub fn follow(display_name: &str, follower_id: UserId) -> Self {
        Notification::Follow(
            NotificationBody::new(format!("{display_name} started following you"))
                .with_source_user(follower_id),
        )
    }

    /// `{display_name} liked your music share`
    pub fn like(display_name: &str, like_id: i64, liker_id: UserId) -> Self {
        Notification::Like(
            NotificationBody::new(format!("{display_name} liked your music share"))
                .with_source_id(like_id)
                .with_source_user(liker_id),
        )
    }

    /// `{display_name} commented on your music share`
    pub fn comment(display_name: &str, comment_id: i64, commenter_id: UserId) -> Self {
        Notification::Comment(
            NotificationBody::new(format!("{display_name} commented on your music share"))
                .with_source_id(comment_id)
                .with_source_user(commenter_id),
        )
    }

    /// `{display_name} shared a new track`, sent to each follower of the sharer
    pub fn music_share(display_name: &str, share_id: i64, sharer_id: UserId) -> Self {
        Notification::MusicShare(
            NotificationBody::new(format!("{display_name} shared a new track"))
                .with_source_id(share_id)
                .with_source_user(sharer_id),
        )
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Like(_) => NotificationKind::Like,
            Notification::Comment(_) => NotificationKind::Comment,
            Notification::Follow(_) => NotificationKind::Follow,
            Notification::MusicShare(_) => NotificationKind::MusicShare,
            Notification::Recommendation(_) => NotificationKind::Recommendation,
            Notification::CollaborativePlaylist(_) => NotificationKind::CollaborativePlaylist,
            Notification::ListeningParty(_) => NotificationKind::ListeningParty,
        }
    }

    pub fn body(&self) -> &NotificationBody {
        match self {
            Notification::Like(body)
            | Notification::Comment(body)
            | Notification::Follow(body)
            | Notification::MusicShare(body)
            | Notification::Recommendation(body)
            | Notification::CollaborativePlaylist(body)
            | Notification::ListeningParty(body) => body,
        }
    }

    pub fn content(&self) -> &str {
        &self.body().content
    }
}

/// Likes and comments on a user's own share never notify that user.
///
/// Nothing in this service knows the share owner, so the check belongs to the
/// write-path callers, which run it before calling `publish`.
pub fn notifies_owner(owner_id: UserId, actor_id: UserId) -> bool {
    owner_id != actor_id
}
