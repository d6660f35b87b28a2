use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use realtime_hub::{CallInvite, RealtimeHub};
use shared_database::{collections, StoreGateway};
use shared_models::{CallSession, CallStatus, CallType, Role};

use crate::models::{ChatError, StartCallRequest};

pub struct CallService {
    gateway: StoreGateway,
    hub: RealtimeHub,
}

impl CallService {
    pub fn new(gateway: StoreGateway, hub: RealtimeHub) -> Self {
        Self { gateway, hub }
    }

    /// Opens a call attempt: persists the session record best-effort and
    /// broadcasts `incoming_call` to the room. The broadcast is what makes
    /// the other side ring, so a failed record write is logged and ignored.
    pub async fn start_call(
        &self,
        caller_id: &str,
        caller_role: Role,
        request: StartCallRequest,
    ) -> Result<String, ChatError> {
        let (consultation_id, room_id) = match (
            request.consultation_id.filter(|c| !c.trim().is_empty()),
            request.room_id.filter(|r| !r.trim().is_empty()),
        ) {
            (Some(consultation_id), Some(room_id)) => (consultation_id, room_id),
            _ => return Err(ChatError::MissingCallFields),
        };

        let call = CallSession {
            id: Uuid::new_v4().to_string(),
            consultation_id,
            room_id: room_id.clone(),
            initiated_by: caller_id.to_string(),
            participants: Vec::new(),
            start_time: Utc::now(),
            status: CallStatus::Calling,
            call_type: request.call_type.unwrap_or(CallType::Video),
        };

        match serde_json::to_value(&call) {
            Ok(document) => {
                if let Err(e) = self
                    .gateway
                    .insert_one(collections::CALL_SESSIONS, document)
                    .await
                {
                    warn!("Call session storage failed, signaling anyway: {}", e);
                }
            }
            Err(e) => warn!("Call session storage failed, signaling anyway: {}", e),
        }

        self.hub
            .broadcast_incoming_call(CallInvite {
                call_id: call.id.clone(),
                room_id,
                caller_id: caller_id.to_string(),
                caller_type: caller_role,
                call_type: call.call_type,
            })
            .await;

        Ok(call.id)
    }
}
