//! Consultation chat: message persistence and history, file sharing, call
//! signaling and the WebSocket subscription channel. Fan-out goes through
//! the shared [`realtime_hub::RealtimeHub`]; membership is authorized
//! against the chat room record, recreated from the consultation when the
//! booking-time write was lost.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod ws;

pub use models::{ChatError, ClientFrame, SendMessageRequest, StartCallRequest};
pub use router::chat_routes;
pub use services::{CallService, ChatService, FileService};
