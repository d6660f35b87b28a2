pub mod client;
pub mod error;
pub mod gateway;

pub use client::{DocumentStore, FindOptions, UpdateOutcome};
pub use error::StoreError;
pub use gateway::StoreGateway;

/// Collection names used across cells.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PREDICTIONS: &str = "predictions";
    pub const CONSULTATIONS: &str = "consultations";
    pub const CHAT_ROOMS: &str = "chat_rooms";
    pub const MESSAGES: &str = "messages";
    pub const CHAT_FILES: &str = "chat_files";
    pub const CALL_SESSIONS: &str = "call_sessions";
}
