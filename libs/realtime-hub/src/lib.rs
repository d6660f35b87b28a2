pub mod events;
pub mod hub;

pub use events::{CallInvite, EventPayload, PresenceInfo, RoomEvent, TypingInfo};
pub use hub::RealtimeHub;
