//! WebSocket handler for interview turns.
//!
//! # Connection Flow
//! 1. Client requests an upgrade on `/api/assessments/:id/turns`
//! 2. The session id is parsed before the upgrade
//! 3. Client sends `{"type":"send_message","content":...}`
//! 4. Server forwards each turn event as JSON, ending with `complete`
//! 5. A rejected turn gets a single `error` frame and the socket stays open

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::application::handlers::StartTurnCommand;
use crate::domain::conversation::TurnEvent;
use crate::domain::foundation::{SessionId, Timestamp};

use super::dto::{ClientMessage, PongMessage};
use super::handlers::{parse_session_id, AssessmentHandlers};

/// Handle WebSocket upgrade for turn streaming.
///
/// Route: `GET /api/assessments/:id/turns`
pub async fn turns_ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(handlers): State<AssessmentHandlers>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    ws.on_upgrade(move |socket| handle_turn_socket(socket, session_id, handlers))
}

/// Handle an established connection. Turns run one after another.
async fn handle_turn_socket(socket: WebSocket, session_id: SessionId, handlers: AssessmentHandlers) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(session_id = %session_id, "turn socket opened");

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::SendMessage { content }) => {
                    if run_turn(&mut sender, &handlers, session_id, content)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Ok(ClientMessage::Ping) => {
                    let pong = PongMessage {
                        kind: "pong",
                        timestamp: Timestamp::now().as_datetime().to_rfc3339(),
                    };
                    if send_json(&mut sender, &pong).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(session_id = %session_id, "Failed to parse client message: {}", e);
                }
            },
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %session_id, "Client closed connection");
                break;
            }
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    tracing::info!(session_id = %session_id, "turn socket closed");
}

/// Runs one turn and forwards its events.
///
/// Returns `Err` only when the socket can no longer be written to. The turn
/// itself keeps running after the client goes away.
async fn run_turn<S>(
    sender: &mut S,
    handlers: &AssessmentHandlers,
    session_id: SessionId,
    content: String,
) -> Result<(), S::Error>
where
    S: SinkExt<Message> + Unpin,
{
    let mut events = match handlers
        .turn_handler
        .handle(StartTurnCommand::new(session_id, content))
        .await
    {
        Ok(events) => events,
        Err(e) => {
            tracing::debug!(session_id = %session_id, code = %e.code(), "turn rejected");
            return send_json(sender, &TurnEvent::error(e.code(), e.to_string())).await;
        }
    };

    while let Some(event) = events.next().await {
        let done = event.is_complete();
        send_json(sender, &event).await?;
        if done {
            break;
        }
    }
    Ok(())
}

/// Send a server frame over the WebSocket.
async fn send_json<S, T>(sender: &mut S, frame: &T) -> Result<(), S::Error>
where
    S: SinkExt<Message> + Unpin,
    T: serde::Serialize,
{
    match serde_json::to_string(frame) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize frame: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;

    #[tokio::test]
    async fn send_json_writes_tagged_turn_events() {
        let (mut tx, mut rx) = mpsc::unbounded::<Message>();

        send_json(&mut tx, &TurnEvent::text("Hello")).await.unwrap();

        match rx.next().await {
            Some(Message::Text(json)) => {
                let value: serde_json::Value = serde_json::from_str(&json).unwrap();
                assert_eq!(value["type"], "text_chunk");
                assert_eq!(value["delta"], "Hello");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}
