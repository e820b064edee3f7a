//! Signaling hub
//!
//! Connection registry, rooms and the online-user map. The hub is transport
//! agnostic: each connection is an unbounded channel of [`Outbound`] frames
//! that the WebSocket layer drains.

use super::message::{ClientMessage, RoomUser, ServerMessage, SENDER_ID};
use super::store::UserStore;
use super::SignalingResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Frame queued for one connection
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(String),
    Close,
}

pub type OutboundTx = mpsc::UnboundedSender<Outbound>;

/// Connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

#[derive(Debug)]
struct Peer {
    tx: OutboundTx,
    room: Option<String>,
    id: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Default)]
struct HubState {
    next_conn: u64,
    peers: HashMap<ConnId, Peer>,
    /// Room name to members, in join order
    rooms: HashMap<String, Vec<ConnId>>,
    /// Username to its current connection
    online: HashMap<String, ConnId>,
    /// Username to resumable session token
    sessions: HashMap<String, String>,
}

impl HubState {
    fn send(&self, conn: ConnId, frame: Outbound) {
        if let Some(peer) = self.peers.get(&conn) {
            // Receiver gone means the socket is closing; disconnect cleans up
            let _ = peer.tx.send(frame);
        }
    }

    fn send_message(&self, conn: ConnId, message: &ServerMessage) {
        self.send(conn, Outbound::Text(message.to_json()));
    }

    fn members(&self, room: &str) -> &[ConnId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    fn peer_id(&self, conn: ConnId) -> Option<&str> {
        self.peers.get(&conn).and_then(|p| p.id.as_deref())
    }

    fn is_member(&self, conn: ConnId, room: &str) -> bool {
        self.peers.get(&conn).and_then(|p| p.room.as_deref()) == Some(room)
    }

    fn find_in_room(&self, room: &str, id: &str) -> Option<ConnId> {
        self.members(room)
            .iter()
            .copied()
            .find(|&c| self.peer_id(c) == Some(id))
    }

    fn broadcast(&self, room: &str, text: &str, except: ConnId) {
        for &member in self.members(room) {
            if member != except {
                self.send(member, Outbound::Text(text.to_string()));
            }
        }
    }

    /// Remove a connection from its room and tell the others it left
    fn leave_room(&mut self, conn: ConnId) {
        let Some(peer) = self.peers.get_mut(&conn) else {
            return;
        };
        let Some(room) = peer.room.take() else {
            return;
        };
        let id = peer.id.take();

        if let Some(members) = self.rooms.get_mut(&room) {
            members.retain(|&c| c != conn);
            if members.is_empty() {
                self.rooms.remove(&room);
                tracing::info!("Room '{}' closed", room);
            }
        }

        if let Some(id) = id {
            let left = ServerMessage::UserLeft { id }.to_json();
            self.broadcast(&room, &left, conn);
        }
    }

    /// Forget a connection entirely
    fn remove(&mut self, conn: ConnId) {
        self.leave_room(conn);

        if let Some(peer) = self.peers.remove(&conn) {
            if let Some(username) = peer.username {
                if self.online.get(&username) == Some(&conn) {
                    self.online.remove(&username);
                }
            }
        }
    }

    /// Force a connection off: notify, close and forget it
    fn evict(&mut self, conn: ConnId, reason: &str) {
        self.send_message(
            conn,
            &ServerMessage::ForceLogout {
                reason: reason.to_string(),
            },
        );
        self.send(conn, Outbound::Close);
        self.remove(conn);
    }
}

/// Shared signaling state for all connections
pub struct SignalingHub {
    store: Arc<UserStore>,
    state: Mutex<HubState>,
}

impl SignalingHub {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self {
            store,
            state: Mutex::new(HubState::default()),
        }
    }

    /// Register a new connection
    pub fn connect(&self, tx: OutboundTx) -> ConnId {
        let mut state = self.state.lock();
        state.next_conn += 1;
        let conn = ConnId(state.next_conn);
        state.peers.insert(
            conn,
            Peer {
                tx,
                room: None,
                id: None,
                username: None,
            },
        );
        conn
    }

    /// Connection closed or errored
    pub fn disconnect(&self, conn: ConnId) {
        self.state.lock().remove(conn);
        tracing::debug!("Connection {:?} disconnected", conn);
    }

    /// Users currently logged in
    pub fn online_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.state.lock().online.keys().cloned().collect();
        users.sort();
        users
    }

    /// Handle one inbound text frame
    pub fn handle_message(&self, conn: ConnId, text: &str) -> SignalingResult<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg.kind.as_str() {
            "login" => self.login(conn, &msg),
            "register" => self.register(conn, &msg),
            "change_password" => self.change_password(conn, &msg),
            "change_username" => self.change_username(conn, &msg),
            _ if msg.room.is_empty() => {}
            "join" => self.join(conn, &msg, text),
            "request_share" => self.request_share(conn, &msg, text),
            "swap_accept" => self.swap_accept(conn, &msg),
            "kick_user" => self.kick_user(conn, &msg),
            _ => self.relay(conn, &msg, text),
        }

        Ok(())
    }

    fn login(&self, conn: ConnId, msg: &ClientMessage) {
        let username = msg.username.trim();

        let authenticated = if username.is_empty() {
            false
        } else if !msg.session.is_empty() {
            self.state.lock().sessions.get(username) == Some(&msg.session)
        } else {
            self.store.login(username, &msg.password).unwrap_or_else(|e| {
                tracing::error!("Login lookup failed for '{}': {}", username, e);
                false
            })
        };

        let mut state = self.state.lock();
        if !authenticated {
            tracing::info!("Login failed for '{}'", username);
            state.send_message(
                conn,
                &ServerMessage::LoginFail {
                    reason: "Invalid credentials.".to_string(),
                },
            );
            return;
        }

        if let Some(&previous) = state.online.get(username) {
            if previous != conn {
                tracing::info!("'{}' logged in elsewhere, closing previous session", username);
                state.evict(previous, "Logged in from another location.");
            }
        }

        state.online.insert(username.to_string(), conn);
        if let Some(peer) = state.peers.get_mut(&conn) {
            peer.username = Some(username.to_string());
        }
        let session = state
            .sessions
            .entry(username.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        tracing::info!("'{}' logged in", username);
        state.send_message(
            conn,
            &ServerMessage::LoginSuccess {
                username: username.to_string(),
                session,
            },
        );
    }

    fn register(&self, conn: ConnId, msg: &ClientMessage) {
        let reply = match self.store.register(msg.username.trim(), &msg.password) {
            Ok(()) => ServerMessage::RegisterSuccess,
            Err(e) => {
                tracing::info!("Registration of '{}' failed: {}", msg.username, e);
                ServerMessage::RegisterFail {
                    reason: e.to_string(),
                }
            }
        };
        self.state.lock().send_message(conn, &reply);
    }

    fn change_password(&self, conn: ConnId, msg: &ClientMessage) {
        let reply = match self
            .store
            .change_password(&msg.username, &msg.password, &msg.new_password)
        {
            Ok(()) => {
                // Outstanding session tokens no longer prove knowledge of the password
                self.state.lock().sessions.remove(&msg.username);
                ServerMessage::ChangePasswordSuccess
            }
            Err(e) => ServerMessage::ChangePasswordFail {
                reason: e.to_string(),
            },
        };
        self.state.lock().send_message(conn, &reply);
    }

    fn change_username(&self, conn: ConnId, msg: &ClientMessage) {
        let new_name = msg.new_username.trim();
        let result = self.store.change_username(&msg.username, &msg.password, new_name);

        let mut state = self.state.lock();
        let reply = match result {
            Ok(()) => {
                if let Some(owner) = state.online.remove(&msg.username) {
                    state.online.insert(new_name.to_string(), owner);
                    if let Some(peer) = state.peers.get_mut(&owner) {
                        peer.username = Some(new_name.to_string());
                    }
                }
                state.sessions.remove(&msg.username);
                ServerMessage::ChangeUsernameSuccess {
                    username: new_name.to_string(),
                }
            }
            Err(e) => ServerMessage::ChangeUsernameFail {
                reason: e.to_string(),
            },
        };
        state.send_message(conn, &reply);
    }

    fn join(&self, conn: ConnId, msg: &ClientMessage, raw: &str) {
        let mut state = self.state.lock();
        let room = msg.room.as_str();

        if msg.id == SENDER_ID {
            if let Some(existing) = state.find_in_room(room, SENDER_ID) {
                if existing != conn {
                    state.send_message(
                        conn,
                        &ServerMessage::JoinFail {
                            reason: "This room already has a presenter.".to_string(),
                        },
                    );
                    return;
                }
            }
        }

        state.leave_room(conn);

        let Some(peer) = state.peers.get_mut(&conn) else {
            return;
        };
        peer.room = Some(room.to_string());
        peer.id = Some(msg.id.clone());
        if peer.username.is_none() {
            peer.username = Some(msg.username.clone());
        }

        let members = state.rooms.entry(room.to_string()).or_default();
        members.push(conn);
        let others: Vec<ConnId> = members.iter().copied().filter(|&c| c != conn).collect();

        let users = others
            .iter()
            .filter_map(|c| state.peers.get(c))
            .map(|p| RoomUser {
                id: p.id.clone().unwrap_or_default(),
                username: p.username.clone().unwrap_or_default(),
            })
            .collect();
        for &other in &others {
            state.send(other, Outbound::Text(raw.to_string()));
        }

        tracing::info!("'{}' joined room '{}' as {}", msg.username, room, msg.id);
        state.send_message(conn, &ServerMessage::RoomUsers { users });
    }

    fn request_share(&self, conn: ConnId, msg: &ClientMessage, raw: &str) {
        let state = self.state.lock();
        if !state.is_member(conn, &msg.room) {
            return;
        }
        if let Some(sender) = state.find_in_room(&msg.room, SENDER_ID) {
            state.send(sender, Outbound::Text(raw.to_string()));
        }
    }

    /// The presenter hands sharing to another member
    fn swap_accept(&self, conn: ConnId, msg: &ClientMessage) {
        let mut state = self.state.lock();
        if !state.is_member(conn, &msg.room) || state.peer_id(conn) != Some(SENDER_ID) {
            tracing::warn!("Ignoring swap_accept from non-presenter {:?}", conn);
            return;
        }
        let Some(target) = msg
            .destination()
            .and_then(|id| state.find_in_room(&msg.room, id))
            .filter(|&t| t != conn)
        else {
            return;
        };

        state.send_message(conn, &ServerMessage::GrantView);
        state.send_message(target, &ServerMessage::GrantShare);

        // Release the presenter id so the new presenter can rejoin with it
        if let Some(peer) = state.peers.get_mut(&conn) {
            peer.id = Some(format!("v_retired_{}", conn.0));
        }
        tracing::info!("Presenter role in '{}' handed over", msg.room);
    }

    /// The presenter removes a member from the room
    fn kick_user(&self, conn: ConnId, msg: &ClientMessage) {
        let mut state = self.state.lock();
        if !state.is_member(conn, &msg.room) || state.peer_id(conn) != Some(SENDER_ID) {
            tracing::warn!("Ignoring kick_user from non-presenter {:?}", conn);
            return;
        }
        let target = msg
            .destination()
            .and_then(|id| state.find_in_room(&msg.room, id))
            .filter(|&t| t != conn);
        if let Some(target) = target {
            tracing::info!("Kicking {:?} from '{}'", target, msg.room);
            state.evict(target, "You were removed from the room.");
        }
    }

    /// Unicast to `target`/`targetId`, otherwise broadcast to the room
    fn relay(&self, conn: ConnId, msg: &ClientMessage, raw: &str) {
        let state = self.state.lock();
        if !state.is_member(conn, &msg.room) {
            tracing::debug!("Dropping '{}' from non-member {:?}", msg.kind, conn);
            return;
        }

        match msg.destination() {
            Some(id) => {
                if let Some(target) = state.find_in_room(&msg.room, id) {
                    state.send(target, Outbound::Text(raw.to_string()));
                }
            }
            None => state.broadcast(&msg.room, raw, conn),
        }
    }
}
