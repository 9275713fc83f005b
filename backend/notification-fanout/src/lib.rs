pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod state;
pub mod websocket;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{Notification, NotificationBody, NotificationKind, UserId};
pub use state::AppState;
pub use websocket::{ConnectionRegistry, NotificationPublisher, NotifyUser, SessionPublisher};
