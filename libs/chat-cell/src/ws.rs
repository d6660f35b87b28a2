use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use shared_models::AuthSession;
use shared_state::AppState;

use crate::models::ClientFrame;

/// Subscription channel for one room: joins the hub on upgrade, streams
/// room events out as JSON text frames and feeds inbound typing frames back
/// into the hub. Session-gated like every other chat route.
pub async fn room_socket(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(room_id): Path<String>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket| serve_room(socket, state, auth, room_id))
}

async fn serve_room(socket: WebSocket, state: Arc<AppState>, auth: AuthSession, room_id: String) {
    let mut events = state.hub.join(&room_id, &auth.user_id, auth.role).await;
    let (mut sink, mut stream) = socket.split();

    let user_id = auth.user_id.clone();
    let forward = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if !event.should_deliver_to(&user_id) {
                        continue;
                    }
                    let Ok(frame) = serde_json::to_string(&event.payload) else {
                        continue;
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                // Lagging only costs this receiver its own backlog.
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Receiver lagged, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    let inbound = async {
        while let Some(Ok(message)) = stream.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            match serde_json::from_str::<ClientFrame>(&text) {
                Ok(ClientFrame::Typing { typing }) => {
                    state
                        .hub
                        .broadcast_typing(&room_id, &auth.user_id, auth.role, typing)
                        .await;
                }
                Err(e) => debug!("Ignoring unparseable client frame: {}", e),
            }
        }
    };

    tokio::select! {
        _ = forward => {}
        _ = inbound => {}
    }

    state.hub.leave(&room_id, &auth.user_id, auth.role).await;
}
