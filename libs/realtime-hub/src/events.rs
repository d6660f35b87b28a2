use serde::{Deserialize, Serialize};

use shared_models::{CallType, ChatMessage, Role};

/// Wire payload delivered to room subscribers, serialized as
/// `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    NewMessage(ChatMessage),
    UserJoined(PresenceInfo),
    UserLeft(PresenceInfo),
    UserTyping(TypingInfo),
    IncomingCall(CallInvite),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceInfo {
    pub user_id: String,
    pub user_type: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingInfo {
    pub user_id: String,
    pub user_type: Role,
    pub typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallInvite {
    pub call_id: String,
    pub room_id: String,
    pub caller_id: String,
    pub caller_type: Role,
    pub call_type: CallType,
}

/// One broadcast within a room. `exclude_user` is honored at the delivery
/// edge (the subscriber forwarding loop), not here: every receiver gets the
/// event and skips it when excluded.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub room_id: String,
    pub exclude_user: Option<String>,
    pub payload: EventPayload,
}

impl RoomEvent {
    pub fn to_everyone(room_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            room_id: room_id.into(),
            exclude_user: None,
            payload,
        }
    }

    pub fn excluding(
        room_id: impl Into<String>,
        exclude_user: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            exclude_user: Some(exclude_user.into()),
            payload,
        }
    }

    pub fn should_deliver_to(&self, user_id: &str) -> bool {
        self.exclude_user.as_deref() != Some(user_id)
    }
}
