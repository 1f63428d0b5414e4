use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use sketchpad_shared::{SignalClientMessage, SignalServerMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::logic::{apply_client_message, broadcast_all, now_ms, replay_for_new_peer, send_to, Outcome};
use crate::state::AppState;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn decode_frame(message: &Message) -> Option<SignalClientMessage> {
    match message {
        Message::Text(text) => serde_json::from_str(text).ok(),
        Message::Binary(data) => {
            bincode::decode_from_slice(data, bincode::config::standard())
                .ok()
                .map(|(message, _)| message)
        }
        _ => None,
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalServerMessage>();
    let connection_id = Uuid::now_v7();

    let replay = {
        let mut channel = state.channel.write().await;
        channel.peers.insert(connection_id, tx.clone());
        info!(conn = %connection_id, peers = channel.peers.len(), "signal peer connected");
        replay_for_new_peer(&channel, now_ms(), state.freshness_ms)
    };
    if let Some(signal) = replay {
        let _ = tx.send(SignalServerMessage::Received { signal });
    }
    drop(tx);

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Ok(payload) = bincode::encode_to_vec(&message, bincode::config::standard()) {
                if socket_sender.send(Message::Binary(payload)).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut close_frame = None;

    while let Some(Ok(message)) = socket_receiver.next().await {
        if let Message::Close(frame) = message {
            close_frame = frame;
            break;
        }
        let Some(client_message) = decode_frame(&message) else {
            continue;
        };
        let outcome = {
            let mut channel = state.channel.write().await;
            apply_client_message(&mut channel, client_message, now_ms(), state.freshness_ms)
        };
        match outcome {
            Outcome::Broadcast(message) => {
                if let SignalServerMessage::Received { signal } = &message {
                    info!(conn = %connection_id, sender = %signal.sender, "signal relayed");
                }
                broadcast_all(&state.channel, message).await;
            }
            Outcome::Reply(message) => {
                if let SignalServerMessage::Rejected { reason } = &message {
                    warn!(conn = %connection_id, %reason, "signal rejected");
                }
                send_to(&state.channel, connection_id, message).await;
            }
        }
    }

    {
        let mut channel = state.channel.write().await;
        channel.peers.remove(&connection_id);
        info!(conn = %connection_id, peers = channel.peers.len(), "signal peer disconnected");
        if let Some(frame) = &close_frame {
            info!(
                conn = %connection_id,
                code = frame.code,
                reason = %frame.reason,
                "signal peer close frame"
            );
        }
    }
    send_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad_shared::SignalEvent;

    fn sample() -> SignalClientMessage {
        SignalClientMessage::Send {
            signal: SignalEvent::new("ana", "hi", 42),
        }
    }

    #[test]
    fn json_text_frame_decodes() {
        let text = r#"{"type":"signal:send","signal":{"sender":"ana","timestamp_ms":42,"message":"hi"}}"#;
        assert_eq!(decode_frame(&Message::Text(text.to_string())), Some(sample()));
    }

    #[test]
    fn bincode_binary_frame_decodes() {
        let bytes = bincode::encode_to_vec(sample(), bincode::config::standard()).unwrap();
        assert_eq!(decode_frame(&Message::Binary(bytes)), Some(sample()));
    }

    #[test]
    fn unreadable_frames_are_skipped() {
        assert_eq!(decode_frame(&Message::Text("not json".to_string())), None);
        assert_eq!(decode_frame(&Message::Binary(vec![0xff, 0xff, 0xff])), None);
        assert_eq!(decode_frame(&Message::Ping(Vec::new())), None);
    }
}
