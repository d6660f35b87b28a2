use serde::Deserialize;

use shared_database::StoreError;
use shared_models::{error::AppError, CallType, MessageType};

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub chat_room_id: Option<String>,
    pub content: Option<String>,
    pub message_type: Option<MessageType>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartCallRequest {
    pub consultation_id: Option<String>,
    pub room_id: Option<String>,
    pub call_type: Option<CallType>,
}

/// Inbound WebSocket frame, same `{"event", "data"}` envelope as the
/// outbound events. Clients only push typing indicators; everything else
/// arrives over HTTP.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    Typing { typing: bool },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat room ID and content are required")]
    MissingMessageFields,

    #[error("Chat room not found")]
    RoomNotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("No file provided")]
    MissingFile,

    #[error("No file selected")]
    EmptyFileName,

    #[error("Room ID is required")]
    MissingRoomId,

    #[error("Consultation ID and room ID are required")]
    MissingCallFields,

    #[error("File write failed: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingMessageFields
            | ChatError::MissingFile
            | ChatError::EmptyFileName
            | ChatError::MissingRoomId
            | ChatError::MissingCallFields => AppError::Validation(err.to_string()),
            ChatError::RoomNotFound => AppError::NotFound(err.to_string()),
            ChatError::AccessDenied => AppError::Forbidden(err.to_string()),
            ChatError::FileWrite(io) => AppError::Internal(io.to_string()),
            ChatError::Store(store) => store.into(),
        }
    }
}
