use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use realtime_hub::RealtimeHub;
use shared_database::{collections, FindOptions, StoreError, StoreGateway};
use shared_models::{ChatMessage, ChatRoom, Consultation, MessageType, Role};

use crate::models::{ChatError, SendMessageRequest};

pub struct ChatService {
    gateway: StoreGateway,
    hub: RealtimeHub,
}

impl ChatService {
    pub fn new(gateway: StoreGateway, hub: RealtimeHub) -> Self {
        Self { gateway, hub }
    }

    /// Room record for an id. Booking writes the room best-effort, so a
    /// missing record whose owning consultation exists is recreated here
    /// from the consultation's participants; the recreate insert is itself
    /// best-effort since the in-memory room is enough to authorize the
    /// current request.
    async fn room(&self, room_id: &str) -> Result<Option<ChatRoom>, ChatError> {
        if let Some(room) = self
            .gateway
            .find_one::<ChatRoom>(collections::CHAT_ROOMS, json!({ "id": room_id }))
            .await?
        {
            return Ok(Some(room));
        }

        let Some(consultation) = self
            .gateway
            .find_one::<Consultation>(
                collections::CONSULTATIONS,
                json!({ "chat_room_id": room_id }),
            )
            .await?
        else {
            return Ok(None);
        };

        let room = ChatRoom::new(
            room_id.to_string(),
            consultation.id.clone(),
            consultation.patient_id,
            consultation.doctor_id,
        );
        match serde_json::to_value(&room) {
            Ok(document) => {
                match self
                    .gateway
                    .insert_one(collections::CHAT_ROOMS, document)
                    .await
                {
                    Ok(_) => info!(room_id, consultation_id = %consultation.id, "chat room recreated"),
                    Err(e) => warn!("Chat room recreate failed, continuing in-memory: {}", e),
                }
            }
            Err(e) => warn!("Chat room recreate failed, continuing in-memory: {}", e),
        }
        Ok(Some(room))
    }

    /// Persists a message and fans it out to the room. The message insert is
    /// the core operation; the room's message-list append and
    /// `last_message_at` bump are bookkeeping and never fail the send.
    pub async fn send_message(
        &self,
        sender_id: &str,
        sender_role: Role,
        request: SendMessageRequest,
    ) -> Result<String, ChatError> {
        let (room_id, content) = match (
            request.chat_room_id.filter(|r| !r.trim().is_empty()),
            request.content.filter(|c| !c.trim().is_empty()),
        ) {
            (Some(room_id), Some(content)) => (room_id, content),
            _ => return Err(ChatError::MissingMessageFields),
        };

        let room = self.room(&room_id).await?.ok_or(ChatError::RoomNotFound)?;
        if !room.is_participant(sender_id) {
            return Err(ChatError::AccessDenied);
        }

        let message = ChatMessage::new(
            room_id.clone(),
            sender_id.to_string(),
            sender_role,
            request.message_type.unwrap_or(MessageType::Text),
            content,
            request.file_url,
        );

        let document = serde_json::to_value(&message).map_err(StoreError::from)?;
        self.gateway
            .insert_one(collections::MESSAGES, document)
            .await?;

        if let Err(e) = self
            .gateway
            .update_one(
                collections::CHAT_ROOMS,
                json!({ "id": room_id }),
                json!({
                    "$push": { "messages": message.id },
                    "$set": { "last_message_at": Utc::now() },
                }),
            )
            .await
        {
            warn!("Room bookkeeping update failed, message already stored: {}", e);
        }

        let message_id = message.id.clone();
        self.hub.broadcast_new_message(message).await;
        Ok(message_id)
    }

    /// Room history in stored-timestamp order. Everything the requester did
    /// not send is marked read first, so the returned list already carries
    /// their receipt. `$addToSet` keeps the receipt set duplicate-free no
    /// matter how often history is fetched.
    pub async fn get_messages(
        &self,
        room_id: &str,
        requester_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let room = self.room(room_id).await?.ok_or(ChatError::AccessDenied)?;
        if !room.is_participant(requester_id) {
            return Err(ChatError::AccessDenied);
        }

        self.gateway
            .update_many(
                collections::MESSAGES,
                json!({ "chat_room_id": room_id, "sender_id": { "$ne": requester_id } }),
                json!({ "$addToSet": { "read_by": requester_id } }),
            )
            .await?;

        let messages = self
            .gateway
            .find(
                collections::MESSAGES,
                json!({ "chat_room_id": room_id }),
                FindOptions {
                    sort: Some(json!({ "timestamp": 1 })),
                    ..Default::default()
                },
            )
            .await?;

        Ok(messages)
    }
}
