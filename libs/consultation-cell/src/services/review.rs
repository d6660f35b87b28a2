use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use shared_database::{collections, FindOptions, StoreError, StoreGateway};
use shared_models::{DoctorReview, Prediction, RoleProfile, User};

use crate::models::{ConsultationError, PendingCaseView, ReviewRequest};

pub struct ReviewService {
    gateway: StoreGateway,
}

impl ReviewService {
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    /// Predictions awaiting review, newest first, with the patient's
    /// demographics joined onto each case. A failed patient lookup leaves
    /// the case in the queue without them.
    pub async fn pending_cases(&self) -> Result<Vec<PendingCaseView>, ConsultationError> {
        let predictions: Vec<Prediction> = self
            .gateway
            .find(
                collections::PREDICTIONS,
                json!({ "status": "pending_review" }),
                FindOptions {
                    sort: Some(json!({ "created_at": -1 })),
                    ..Default::default()
                },
            )
            .await?;

        let mut cases = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            let mut case = PendingCaseView {
                patient_name: None,
                patient_age: None,
                patient_gender: None,
                prediction,
            };

            match self
                .gateway
                .find_one::<User>(
                    collections::USERS,
                    json!({ "id": case.prediction.patient_id }),
                )
                .await
            {
                Ok(Some(patient)) => {
                    case.patient_name = Some(patient.name.clone());
                    if let RoleProfile::Patient(profile) = &patient.profile {
                        case.patient_age = profile.age;
                        case.patient_gender = profile.gender.clone();
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("patient lookup failed, returning case unenriched: {}", e),
            }

            cases.push(case);
        }

        Ok(cases)
    }

    /// Attaches the doctor's review and closes the case. The update filters
    /// on `pending_review`, so a case can only be reviewed once; zero
    /// modified rows means it was already taken or never existed.
    pub async fn review_case(
        &self,
        prediction_id: &str,
        doctor_id: &str,
        request: ReviewRequest,
    ) -> Result<(), ConsultationError> {
        let review = DoctorReview {
            diagnosis: request.diagnosis.unwrap_or_default(),
            severity: request.severity.unwrap_or_default(),
            recommendations: request.recommendations.unwrap_or_default(),
            follow_up_required: request.follow_up_required.unwrap_or(false),
            medications: request.medications.unwrap_or_default(),
            lifestyle_changes: request.lifestyle_changes.unwrap_or_default(),
            reviewed_at: Utc::now(),
        };
        let review = serde_json::to_value(&review).map_err(StoreError::from)?;

        let outcome = self
            .gateway
            .update_one(
                collections::PREDICTIONS,
                json!({ "id": prediction_id, "status": "pending_review" }),
                json!({ "$set": {
                    "status": "reviewed",
                    "reviewed_by": doctor_id,
                    "doctor_review": review,
                } }),
            )
            .await?;

        if outcome.modified_count == 0 {
            return Err(ConsultationError::NotReviewable);
        }

        info!(prediction_id, doctor_id, "case reviewed");
        Ok(())
    }
}
