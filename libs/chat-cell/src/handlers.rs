use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use shared_models::{error::AppError, AuthSession};
use shared_state::AppState;

use crate::models::{SendMessageRequest, StartCallRequest};
use crate::services::{CallService, ChatService, FileService};

// No role gates in this cell: both parties of a consultation use the same
// routes, and the services authorize against room membership instead.

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ChatService::new(state.gateway.clone(), state.hub.clone());
    let message_id = service
        .send_message(&auth.user_id, auth.role, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message_id": message_id,
    })))
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(room_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ChatService::new(state.gateway.clone(), state.hub.clone());
    let messages = service.get_messages(&room_id, &auth.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "messages": messages,
    })))
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut room_id: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        match field.name() {
            Some("room_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                room_id = Some(text);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                file = Some((name, data));
            }
            _ => {}
        }
    }

    let service = FileService::new(state.gateway.clone(), state.config.chat_upload_dir.clone());
    let stored = service.store(&auth.user_id, room_id, file).await?;

    Ok(Json(json!({
        "success": true,
        "file_url": stored.file_url,
        "filename": stored.original_name,
    })))
}

pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(request): Json<StartCallRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CallService::new(state.gateway.clone(), state.hub.clone());
    let call_id = service
        .start_call(&auth.user_id, auth.role, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "call_id": call_id,
    })))
}
