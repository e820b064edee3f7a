//! Signaling server
//!
//! Relays WebRTC negotiation frames between the members of a room and keeps
//! the account store that the login view talks to.

pub mod hub;
pub mod message;
pub mod server;
pub mod store;

pub use hub::{ConnId, Outbound, SignalingHub};
pub use message::{ClientMessage, RoomUser, ServerMessage, SENDER_ID};
pub use server::SignalingServer;
pub use store::{StoreError, UserStore};

use std::path::PathBuf;
use thiserror::Error;

/// Signaling server errors
#[derive(Error, Debug)]
pub enum SignalingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type SignalingResult<T> = Result<T, SignalingError>;

/// Where the server listens and keeps its accounts
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingConfig {
    pub bind: String,
    pub database: PathBuf,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".to_string(),
            database: PathBuf::from("database.db"),
        }
    }
}

impl SignalingConfig {
    /// Defaults overridden by `SIGNALING_BIND` and `SIGNALING_DB`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(bind) = var("SIGNALING_BIND").filter(|v| !v.is_empty()) {
            config.bind = bind;
        }
        if let Some(db) = var("SIGNALING_DB").filter(|v| !v.is_empty()) {
            config.database = PathBuf::from(db);
        }
        config
    }
}

/// Open the store and serve until the listener fails
pub async fn serve(config: &SignalingConfig) -> SignalingResult<()> {
    let store = UserStore::open(&config.database)?;
    let hub = std::sync::Arc::new(SignalingHub::new(std::sync::Arc::new(store)));
    SignalingServer::bind(&config.bind, hub).await?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SignalingConfig::default();
        assert_eq!(config.bind, "0.0.0.0:3001");
        assert_eq!(config.database, PathBuf::from("database.db"));
    }

    #[test]
    fn test_config_env_overrides() {
        let config = SignalingConfig::from_vars(|key| match key {
            "SIGNALING_BIND" => Some("127.0.0.1:9000".to_string()),
            "SIGNALING_DB" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.database, PathBuf::from("database.db"));
    }
}
