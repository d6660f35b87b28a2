use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::{error::AppError, Consultation, ConsultationStatus, Prediction};

#[derive(Debug, Clone, Deserialize)]
pub struct BookConsultationRequest {
    pub doctor_id: Option<String>,
    pub prediction_id: Option<String>,
    pub message: Option<String>,
    pub requested_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<ConsultationStatus>,
}

/// Review payload as the doctor submits it. Everything is optional on the
/// wire; the service fills in the stored defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub diagnosis: Option<String>,
    pub severity: Option<String>,
    pub recommendations: Option<String>,
    pub follow_up_required: Option<bool>,
    pub medications: Option<Vec<String>>,
    pub lifestyle_changes: Option<Vec<String>>,
}

/// Consultation as the patient listing returns it: the stored record plus a
/// snapshot of the doctor's public profile when the lookup succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct PatientConsultationView {
    #[serde(flatten)]
    pub consultation: Consultation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorConsultationView {
    #[serde(flatten)]
    pub consultation: Consultation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
}

/// Pending prediction in the doctor's review queue, with the patient's
/// demographics joined in.
#[derive(Debug, Clone, Serialize)]
pub struct PendingCaseView {
    #[serde(flatten)]
    pub prediction: Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_gender: Option<String>,
}

/// Public directory row. Deserialized from a projected user document, so
/// everything beyond id and name is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableDoctor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// ===== ERROR HANDLING =====

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Doctor ID is required")]
    MissingDoctor,

    #[error("Doctor not found")]
    UnknownDoctor,

    #[error("Status is required")]
    MissingStatus,

    #[error("Consultation not found or unauthorized")]
    NotOwned,

    #[error("Case not found or already reviewed")]
    NotReviewable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::MissingDoctor | ConsultationError::MissingStatus => {
                AppError::Validation(err.to_string())
            }
            ConsultationError::UnknownDoctor
            | ConsultationError::NotOwned
            | ConsultationError::NotReviewable => AppError::NotFound(err.to_string()),
            ConsultationError::Store(store) => store.into(),
        }
    }
}
