use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use shared_models::{ChatMessage, Role};

use crate::events::{CallInvite, EventPayload, PresenceInfo, RoomEvent, TypingInfo};

const ROOM_CHANNEL_CAPACITY: usize = 100;

pub type RoomSender = broadcast::Sender<RoomEvent>;
pub type RoomReceiver = broadcast::Receiver<RoomEvent>;

/// Room-scoped broadcast fan-out. A room's channel is created on first use
/// and stays open for the process lifetime; there is no room-close operation.
/// Delivery is fire-and-forget: publishing to a room nobody subscribed to is
/// not an error, and a lagging receiver only loses its own backlog.
pub struct RealtimeHub {
    rooms: Arc<RwLock<HashMap<String, RoomSender>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn sender_for(&self, room_id: &str) -> RoomSender {
        {
            let rooms = self.rooms.read().await;
            if let Some(sender) = rooms.get(room_id) {
                return sender.clone();
            }
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!("Activating room channel {}", room_id);
                broadcast::channel(ROOM_CHANNEL_CAPACITY).0
            })
            .clone()
    }

    /// Subscribe without announcing presence (server-side consumers).
    pub async fn subscribe(&self, room_id: &str) -> RoomReceiver {
        self.sender_for(room_id).await.subscribe()
    }

    /// Join a room: subscribe, then announce `user_joined` to everyone in it
    /// (the joiner receives their own announcement).
    pub async fn join(&self, room_id: &str, user_id: &str, user_type: Role) -> RoomReceiver {
        let receiver = self.subscribe(room_id).await;
        self.publish(RoomEvent::to_everyone(
            room_id,
            EventPayload::UserJoined(PresenceInfo {
                user_id: user_id.to_string(),
                user_type,
            }),
        ))
        .await;
        receiver
    }

    /// Announce `user_left`. The caller drops its receiver separately.
    pub async fn leave(&self, room_id: &str, user_id: &str, user_type: Role) {
        self.publish(RoomEvent::to_everyone(
            room_id,
            EventPayload::UserLeft(PresenceInfo {
                user_id: user_id.to_string(),
                user_type,
            }),
        ))
        .await;
    }

    /// Broadcast an event to a room. Returns the number of receivers the
    /// event reached; zero when the room has no subscribers.
    pub async fn publish(&self, event: RoomEvent) -> usize {
        let sender = self.sender_for(&event.room_id).await;
        let room_id = event.room_id.clone();
        match sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                debug!("No subscribers in room {}, event dropped", room_id);
                0
            }
        }
    }

    pub async fn broadcast_new_message(&self, message: ChatMessage) -> usize {
        let room_id = message.chat_room_id.clone();
        self.publish(RoomEvent::to_everyone(
            room_id,
            EventPayload::NewMessage(message),
        ))
        .await
    }

    /// Typing indicator, excluding the typist's own connections.
    pub async fn broadcast_typing(
        &self,
        room_id: &str,
        user_id: &str,
        user_type: Role,
        typing: bool,
    ) -> usize {
        self.publish(RoomEvent::excluding(
            room_id,
            user_id,
            EventPayload::UserTyping(TypingInfo {
                user_id: user_id.to_string(),
                user_type,
                typing,
            }),
        ))
        .await
    }

    pub async fn broadcast_incoming_call(&self, invite: CallInvite) -> usize {
        let room_id = invite.room_id.clone();
        self.publish(RoomEvent::to_everyone(
            room_id,
            EventPayload::IncomingCall(invite),
        ))
        .await
    }

    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        let rooms = self.rooms.read().await;
        rooms.keys().cloned().collect()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RealtimeHub {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
        }
    }
}
