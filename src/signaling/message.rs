//! Signaling wire messages
//!
//! Every frame is a JSON object with a `type` field. Inbound frames are read
//! leniently (missing fields default to empty) because relayed frames are
//! forwarded verbatim and may carry arbitrary extra data.

use serde::{Deserialize, Serialize};

/// Participant id reserved for the peer currently sharing its screen
pub const SENDER_ID: &str = "sender";

/// Fields the server inspects on an inbound frame
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub password: String,
    /// Session token from a previous `login_success`
    pub session: String,
    pub new_password: String,
    pub new_username: String,
    pub room: String,
    pub id: String,
    pub target: String,
    pub target_id: String,
}

impl ClientMessage {
    /// Unicast destination, from `target` or `targetId`
    pub fn destination(&self) -> Option<&str> {
        [self.target.as_str(), self.target_id.as_str()]
            .into_iter()
            .find(|t| !t.is_empty())
    }
}

/// Room member as listed in `room_users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUser {
    pub id: String,
    pub username: String,
}

/// Frames generated by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LoginSuccess { username: String, session: String },
    LoginFail { reason: String },
    RegisterSuccess,
    RegisterFail { reason: String },
    ChangePasswordSuccess,
    ChangePasswordFail { reason: String },
    ChangeUsernameSuccess { username: String },
    ChangeUsernameFail { reason: String },
    ForceLogout { reason: String },
    JoinFail { reason: String },
    RoomUsers { users: Vec<RoomUser> },
    UserLeft { id: String },
    GrantView,
    GrantShare,
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        // Serializing these variants cannot fail: all fields are strings
        serde_json::to_string(self).unwrap_or_default()
    }
}
