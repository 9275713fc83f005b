use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// WebSocket transport settings, read from `WS_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Upgrade path clients connect to
    #[serde(default = "default_ws_path")]
    pub path: String,
    /// Seconds between keepalive pings; 0 disables them
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
    /// Largest inbound frame accepted by the codec, in bytes
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_keepalive_interval_secs() -> u64 {
    30
}

fn default_max_frame_size() -> usize {
    64 * 1024
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: default_ws_path(),
            keepalive_interval_secs: default_keepalive_interval_secs(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl WebSocketConfig {
    pub fn keepalive_interval(&self) -> Option<Duration> {
        match self.keepalive_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("APP_PORT").unwrap_or_else(|_| "8000".to_string());

        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: port
                    .parse()
                    .map_err(|_| AppError::Config(format!("APP_PORT is not a valid port: {port}")))?,
            },
            websocket: envy::prefixed("WS_").from_env::<WebSocketConfig>()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
