use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::{collections, FindOptions, StoreError, StoreGateway};
use shared_models::{ChatRoom, Consultation, ConsultationStatus, RoleProfile, User};

use crate::models::{
    AvailableDoctor, BookConsultationRequest, ConsultationError, DoctorConsultationView,
    PatientConsultationView,
};

pub struct ConsultationService {
    gateway: StoreGateway,
}

impl ConsultationService {
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    /// Books a consultation with a doctor and opens its chat room. The
    /// consultation insert is the core operation; the room insert is
    /// best-effort, since a missing room is recreated lazily on first
    /// message.
    pub async fn book(
        &self,
        patient_id: &str,
        request: BookConsultationRequest,
    ) -> Result<(String, String), ConsultationError> {
        let doctor_id = request
            .doctor_id
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConsultationError::MissingDoctor)?;

        let doctor: Option<User> = self
            .gateway
            .find_one(
                collections::USERS,
                json!({ "id": doctor_id, "user_type": "doctor" }),
            )
            .await?;
        if doctor.is_none() {
            return Err(ConsultationError::UnknownDoctor);
        }

        let now = Utc::now();
        let consultation = Consultation {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            doctor_id: doctor_id.to_string(),
            prediction_id: request.prediction_id,
            requested_date: request.requested_date.unwrap_or(now),
            message: request.message.unwrap_or_default(),
            status: ConsultationStatus::Pending,
            created_at: now,
            updated_at: now,
            chat_room_id: Uuid::new_v4().to_string(),
            video_call_enabled: true,
            file_sharing_enabled: true,
        };

        let document = serde_json::to_value(&consultation).map_err(StoreError::from)?;
        self.gateway
            .insert_one(collections::CONSULTATIONS, document)
            .await?;
        info!(consultation_id = %consultation.id, doctor_id, "consultation booked");

        let room = ChatRoom::new(
            consultation.chat_room_id.clone(),
            consultation.id.clone(),
            consultation.patient_id.clone(),
            consultation.doctor_id.clone(),
        );
        match serde_json::to_value(&room) {
            Ok(document) => {
                if let Err(e) = self
                    .gateway
                    .insert_one(collections::CHAT_ROOMS, document)
                    .await
                {
                    warn!("Chat room creation failed, but consultation was booked: {}", e);
                }
            }
            Err(e) => {
                warn!("Chat room creation failed, but consultation was booked: {}", e);
            }
        }

        Ok((consultation.id, consultation.chat_room_id))
    }

    /// Patient's consultations, newest first, each with a snapshot of the
    /// doctor's public profile. A failed lookup leaves that row unenriched
    /// rather than failing the listing.
    pub async fn list_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<PatientConsultationView>, ConsultationError> {
        let consultations: Vec<Consultation> = self
            .gateway
            .find(
                collections::CONSULTATIONS,
                json!({ "patient_id": patient_id }),
                FindOptions {
                    sort: Some(json!({ "created_at": -1 })),
                    ..Default::default()
                },
            )
            .await?;

        let mut views = Vec::with_capacity(consultations.len());
        for consultation in consultations {
            let mut view = PatientConsultationView {
                doctor_name: None,
                doctor_email: None,
                doctor_specialization: None,
                consultation,
            };

            match self
                .gateway
                .find_one::<User>(
                    collections::USERS,
                    json!({ "id": view.consultation.doctor_id }),
                )
                .await
            {
                Ok(Some(doctor)) => {
                    view.doctor_name = Some(doctor.name.clone());
                    view.doctor_email = Some(doctor.email.clone());
                    let specialization = match &doctor.profile {
                        RoleProfile::Doctor(profile) => profile.specialization.clone(),
                        _ => None,
                    };
                    view.doctor_specialization =
                        Some(specialization.unwrap_or_else(|| "General".to_string()));
                }
                Ok(None) => {}
                Err(e) => warn!("doctor lookup failed, returning row unenriched: {}", e),
            }

            views.push(view);
        }

        Ok(views)
    }

    /// Doctor's consultations, newest first, with patient name and email
    /// joined in under the same degrade rule.
    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<DoctorConsultationView>, ConsultationError> {
        let consultations: Vec<Consultation> = self
            .gateway
            .find(
                collections::CONSULTATIONS,
                json!({ "doctor_id": doctor_id }),
                FindOptions {
                    sort: Some(json!({ "created_at": -1 })),
                    ..Default::default()
                },
            )
            .await?;

        let mut views = Vec::with_capacity(consultations.len());
        for consultation in consultations {
            let mut view = DoctorConsultationView {
                patient_name: None,
                patient_email: None,
                consultation,
            };

            match self
                .gateway
                .find_one::<User>(
                    collections::USERS,
                    json!({ "id": view.consultation.patient_id }),
                )
                .await
            {
                Ok(Some(patient)) => {
                    view.patient_name = Some(patient.name.clone());
                    view.patient_email = Some(patient.email.clone());
                }
                Ok(None) => {}
                Err(e) => warn!("patient lookup failed, returning row unenriched: {}", e),
            }

            views.push(view);
        }

        Ok(views)
    }

    /// Status transition, restricted to the doctor on record. The filter
    /// carries both ids, so a doctor can never move someone else's
    /// consultation; zero modified rows reads as not-found.
    pub async fn update_status(
        &self,
        consultation_id: &str,
        doctor_id: &str,
        new_status: ConsultationStatus,
    ) -> Result<(), ConsultationError> {
        let outcome = self
            .gateway
            .update_one(
                collections::CONSULTATIONS,
                json!({ "id": consultation_id, "doctor_id": doctor_id }),
                json!({ "$set": { "status": new_status, "updated_at": Utc::now() } }),
            )
            .await?;

        if outcome.modified_count == 0 {
            return Err(ConsultationError::NotOwned);
        }

        info!(consultation_id, status = %new_status, "consultation status updated");
        Ok(())
    }

    /// Public directory of doctors accepting consultations: verified, active,
    /// projected down to their public fields.
    pub async fn available_doctors(&self) -> Result<Vec<AvailableDoctor>, ConsultationError> {
        let doctors = self
            .gateway
            .find(
                collections::USERS,
                json!({ "user_type": "doctor", "verified": true, "status": "active" }),
                FindOptions {
                    projection: Some(json!({
                        "id": 1,
                        "name": 1,
                        "specialization": 1,
                        "experience": 1,
                        "phone": 1,
                    })),
                    ..Default::default()
                },
            )
            .await?;
        Ok(doctors)
    }
}
