pub mod calls;
pub mod chat;
pub mod files;

pub use calls::CallService;
pub use chat::ChatService;
pub use files::FileService;
