use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::store::ReadingStore;
use crate::ws::{ClientMessage, ServerMessage};

// ---

/// `GET /ws`: upgrade and hand the socket to the connection loop.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one connection: register with the manager, forward its channel to
/// the sink on a spawned task, answer inbound frames here, clean up on close.
async fn handle_socket(socket: WebSocket, state: AppState) {
    // ---
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = state.ws.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let Some(reply) = reply_to(text.as_str(), &state.store).await else {
                    continue;
                };
                match reply.encode() {
                    Ok(frame) => {
                        state.ws.send_to(&conn_id, frame).await;
                    }
                    Err(e) => tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode reply"),
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws.remove(&conn_id).await;
    send_task.abort();
}

/// Reply for one inbound text frame, if it warrants one.
async fn reply_to(text: &str, store: &ReadingStore) -> Option<ServerMessage> {
    // ---
    let timestamp = Utc::now();

    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Some(ServerMessage::Error {
            message: "Invalid JSON format".to_string(),
            timestamp,
        });
    };

    match serde_json::from_value(value).unwrap_or(ClientMessage::Unknown) {
        ClientMessage::Ping => Some(ServerMessage::Pong { timestamp }),
        ClientMessage::RequestLiveData => Some(ServerMessage::LiveDataResponse {
            data: store.live().await,
            timestamp,
        }),
        ClientMessage::Subscribe => Some(ServerMessage::SubscriptionConfirmed {
            message: "Subscribed to live updates".to_string(),
            timestamp,
        }),
        ClientMessage::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::SensorReading;

    fn kind(msg: &ServerMessage) -> String {
        serde_json::to_value(msg).unwrap()["type"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        // ---
        let store = ReadingStore::new();
        let reply = reply_to(r#"{"type":"ping"}"#, &store).await.unwrap();
        assert_eq!(kind(&reply), "pong");
    }

    #[tokio::test]
    async fn test_invalid_json_gets_error() {
        // ---
        let store = ReadingStore::new();
        let reply = reply_to("{not json", &store).await.unwrap();
        assert_eq!(kind(&reply), "error");
    }

    #[tokio::test]
    async fn test_unknown_or_untyped_is_ignored() {
        // ---
        let store = ReadingStore::new();
        assert!(reply_to(r#"{"type":"dance"}"#, &store).await.is_none());
        assert!(reply_to(r#"{"hello":"world"}"#, &store).await.is_none());
    }

    #[tokio::test]
    async fn test_request_live_data_returns_latest() {
        // ---
        let store = ReadingStore::new();
        store
            .push_readings(vec![SensorReading {
                sensor_id: "sensor-plot-1".to_string(),
                timestamp: Utc::now(),
                temperature: 30.0,
                humidity: 70.0,
                soil_moisture: 80.0,
                ph_level: 6.5,
                light_intensity: 40000.0,
                rainfall: 0.0,
            }])
            .await;

        let reply = reply_to(r#"{"type":"request_live_data"}"#, &store).await.unwrap();

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["type"], "live_data_response");
        assert_eq!(value["data"][0]["sensor_id"], "sensor-plot-1");
    }
}
