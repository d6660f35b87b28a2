use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_state::AppState;
use shared_utils::auth_middleware;

use crate::{handlers, ws};

pub fn chat_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat/send-message", post(handlers::send_message))
        .route("/chat/messages/{room_id}", get(handlers::get_messages))
        .route("/chat/upload", post(handlers::upload_file))
        .route("/chat/ws/{room_id}", get(ws::room_socket))
        .route("/video-call/start", post(handlers::start_call))
        .layer(middleware::from_fn_with_state(
            state.auth_state(),
            auth_middleware,
        ))
        .with_state(state)
}
