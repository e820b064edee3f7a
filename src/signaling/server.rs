//! WebSocket transport for the signaling hub

use super::hub::{Outbound, SignalingHub};
use super::SignalingResult;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Accept loop serving one hub
pub struct SignalingServer {
    listener: TcpListener,
    hub: Arc<SignalingHub>,
}

impl SignalingServer {
    pub async fn bind(addr: &str, hub: Arc<SignalingHub>) -> SignalingResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, hub })
    }

    pub fn local_addr(&self) -> SignalingResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until the listener fails
    pub async fn run(self) -> SignalingResult<()> {
        tracing::info!("Signaling server listening on {}", self.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let hub = self.hub.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_connection(hub, stream).await {
                    tracing::debug!("Connection from {} ended: {}", peer, e);
                }
            });
        }
    }
}

async fn serve_connection(hub: Arc<SignalingHub>, stream: TcpStream) -> SignalingResult<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut writer, mut reader) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = hub.connect(tx);
    tracing::debug!("Connection {:?} opened", conn);

    let writer_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                Outbound::Text(text) => {
                    if writer.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = writer.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Err(e) = hub.handle_message(conn, &text.to_string()) {
                    tracing::warn!("Bad frame from {:?}: {}", conn, e);
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Read error on {:?}: {}", conn, e);
                break;
            }
        }
    }

    hub.disconnect(conn);
    writer_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signaling::store::UserStore;
    use serde_json::{json, Value};

    async fn start() -> String {
        let store = UserStore::open_in_memory().unwrap();
        let hub = Arc::new(SignalingHub::new(Arc::new(store)));
        let server = SignalingServer::bind("127.0.0.1:0", hub).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        format!("ws://{}", addr)
    }

    async fn next_json<S>(reader: &mut S) -> Value
    where
        S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match reader.next().await.unwrap().unwrap() {
                Message::Text(t) => return serde_json::from_str(&t.to_string()).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_register_and_login_over_websocket() {
        let url = start().await;
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut writer, mut reader) = ws.split();

        let register = json!({ "type": "register", "username": "alice", "password": "pw" });
        writer.send(Message::Text(register.to_string().into())).await.unwrap();
        assert_eq!(next_json(&mut reader).await["type"], "register_success");

        let login = json!({ "type": "login", "username": "alice", "password": "pw" });
        writer.send(Message::Text(login.to_string().into())).await.unwrap();
        assert_eq!(next_json(&mut reader).await["type"], "login_success");
    }

    #[tokio::test]
    async fn test_duplicate_login_closes_first_socket() {
        let url = start().await;

        let (first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut first_tx, mut first_rx) = first.split();
        let register = json!({ "type": "register", "username": "alice", "password": "pw" });
        first_tx.send(Message::Text(register.to_string().into())).await.unwrap();
        next_json(&mut first_rx).await;
        let login = json!({ "type": "login", "username": "alice", "password": "pw" });
        first_tx.send(Message::Text(login.to_string().into())).await.unwrap();
        next_json(&mut first_rx).await;

        let (second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
        let (mut second_tx, mut second_rx) = second.split();
        second_tx.send(Message::Text(login.to_string().into())).await.unwrap();
        assert_eq!(next_json(&mut second_rx).await["type"], "login_success");

        assert_eq!(next_json(&mut first_rx).await["type"], "force_logout");
        let closing = first_rx.next().await;
        assert!(matches!(closing, Some(Ok(Message::Close(_))) | None | Some(Err(_))));
    }
}
