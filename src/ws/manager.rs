use std::collections::HashMap;

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, RwLock};

use super::ServerMessage;

// ---

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single dashboard connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    pub connected_at: DateTime<Utc>,
}

/// Tracks every connected dashboard client.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` inside `AppState`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    // ---
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection and return the receiver the socket task
    /// drains into the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        // ---
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            connected_at: Utc::now(),
        };
        let mut conns = self.connections.write().await;
        conns.insert(conn_id, conn);
        tracing::info!(total = conns.len(), "WebSocket client connected");
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        // ---
        let mut conns = self.connections.write().await;
        if let Some(conn) = conns.remove(conn_id) {
            let held = Utc::now().signed_duration_since(conn.connected_at);
            tracing::info!(
                total = conns.len(),
                held_secs = held.num_seconds(),
                "WebSocket client disconnected"
            );
        }
    }

    /// Send to every connection. Closed channels are skipped; their socket
    /// task removes them on its way out.
    pub async fn broadcast(&self, message: Message) {
        // ---
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Encode once and send to every connection.
    pub async fn publish(&self, message: &ServerMessage) {
        // ---
        match message.encode() {
            Ok(frame) => self.broadcast(frame).await,
            Err(e) => tracing::error!(error = %e, "Failed to encode broadcast"),
        }
    }

    /// Send to one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        // ---
        match self.connections.read().await.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then forget them all.
    pub async fn shutdown_all(&self) {
        // ---
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn text(s: &str) -> Message {
        Message::Text(s.to_string().into())
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        // ---
        let manager = WsManager::new();
        let mut a = manager.add("a".to_string()).await;
        let mut b = manager.add("b".to_string()).await;

        manager.broadcast(text("hello")).await;

        assert_eq!(a.recv().await, Some(text("hello")));
        assert_eq!(b.recv().await, Some(text("hello")));
        assert_eq!(manager.connection_count().await, 2);
    }

    #[tokio::test]
    async fn test_publish_encodes_frame() {
        // ---
        let manager = WsManager::new();
        let mut a = manager.add("a".to_string()).await;

        manager
            .publish(&ServerMessage::IrrigationUpdate {
                plot_id: "plot-1".to_string(),
                irrigation_status: true,
                timestamp: Utc::now(),
            })
            .await;

        let Some(Message::Text(frame)) = a.recv().await else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
        assert_eq!(value["type"], "irrigation_update");
        assert_eq!(value["irrigation_status"], true);
    }

    #[tokio::test]
    async fn test_send_to_targets_one_connection() {
        // ---
        let manager = WsManager::new();
        let mut a = manager.add("a".to_string()).await;
        let mut b = manager.add("b".to_string()).await;

        assert!(manager.send_to("b", text("only b")).await);
        assert!(!manager.send_to("missing", text("nobody")).await);

        assert_eq!(b.recv().await, Some(text("only b")));
        assert!(a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_remove_and_shutdown() {
        // ---
        let manager = WsManager::new();
        let _a = manager.add("a".to_string()).await;
        let mut b = manager.add("b".to_string()).await;

        manager.remove("a").await;
        assert_eq!(manager.connection_count().await, 1);

        manager.shutdown_all().await;
        assert_eq!(manager.connection_count().await, 0);
        assert_eq!(b.recv().await, Some(Message::Close(None)));
    }
}
