use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::auth::Role;

// ===== PREDICTION MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    PendingReview,
    Reviewed,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::PendingReview => write!(f, "pending_review"),
            ReviewStatus::Reviewed => write!(f, "reviewed"),
        }
    }
}

/// Review a doctor attaches to a prediction. Attached at most once; the
/// update that writes it filters on `pending_review` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorReview {
    pub diagnosis: String,
    pub severity: String,
    pub recommendations: String,
    pub follow_up_required: bool,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub lifestyle_changes: Vec<String>,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub patient_id: String,
    pub disease: String,
    pub prediction: i64,
    pub confidence: f64,
    pub risk_level: String,
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_review: Option<DoctorReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

// ===== CONSULTATION MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationStatus::Pending => write!(f, "pending"),
            ConsultationStatus::Accepted => write!(f, "accepted"),
            ConsultationStatus::Rejected => write!(f, "rejected"),
            ConsultationStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
    pub requested_date: DateTime<Utc>,
    pub message: String,
    pub status: ConsultationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub chat_room_id: String,
    pub video_call_enabled: bool,
    pub file_sharing_enabled: bool,
}

// ===== CHAT MODELS =====

/// Room scoping message, presence and call broadcasts to exactly the two
/// parties of one consultation: participants are always [patient, doctor].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    pub consultation_id: String,
    pub participants: [String; 2],
    #[serde(default)]
    pub messages: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ChatRoom {
    pub fn new(id: String, consultation_id: String, patient_id: String, doctor_id: String) -> Self {
        Self {
            id,
            consultation_id,
            participants: [patient_id, doctor_id],
            messages: Vec::new(),
            created_at: Utc::now(),
            last_message_at: None,
            active: true,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    File,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Text => write!(f, "text"),
            MessageType::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub chat_room_id: String,
    pub sender_id: String,
    pub sender_role: Role,
    pub message_type: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Reader set, append-only. Initialized to the sender.
    pub read_by: Vec<String>,
    pub edited: bool,
}

impl ChatMessage {
    pub fn new(
        chat_room_id: String,
        sender_id: String,
        sender_role: Role,
        message_type: MessageType,
        content: String,
        file_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chat_room_id,
            read_by: vec![sender_id.clone()],
            sender_id,
            sender_role,
            message_type,
            content,
            file_url,
            timestamp: Utc::now(),
            edited: false,
        }
    }
}

// ===== CALL MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Video,
    Audio,
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallType::Video => write!(f, "video"),
            CallType::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Calling,
    Answered,
    Ended,
}

/// Signaling record for one call attempt. Created in `calling` status;
/// answer/hang-up transitions happen outside this backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub id: String,
    pub consultation_id: String,
    pub room_id: String,
    pub initiated_by: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub status: CallStatus,
    pub call_type: CallType,
}

// ===== FILE MODELS =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub chat_room_id: String,
    pub uploaded_by: String,
    pub original_name: String,
    pub stored_name: String,
    pub file_url: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}
