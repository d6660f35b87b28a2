use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use shared_models::{error::AppError, AuthSession, Role};
use shared_state::AppState;

use crate::models::{
    BookConsultationRequest, ConsultationError, ReviewRequest, UpdateStatusRequest,
};
use crate::services::{ConsultationService, ReviewService};

pub async fn book_consultation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(request): Json<BookConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Patient)?;

    let service = ConsultationService::new(state.gateway.clone());
    let (consultation_id, chat_room_id) = service.book(&auth.user_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "consultation_id": consultation_id,
        "chat_room_id": chat_room_id,
    })))
}

pub async fn patient_consultations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Patient)?;

    let service = ConsultationService::new(state.gateway.clone());
    let consultations = service.list_for_patient(&auth.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "consultations": consultations,
    })))
}

pub async fn doctor_consultations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Doctor)?;

    let service = ConsultationService::new(state.gateway.clone());
    let consultations = service.list_for_doctor(&auth.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "consultations": consultations,
    })))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(consultation_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Doctor)?;

    let status = request.status.ok_or(ConsultationError::MissingStatus)?;

    let service = ConsultationService::new(state.gateway.clone());
    service
        .update_status(&consultation_id, &auth.user_id, status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Consultation status updated to {}", status),
    })))
}

pub async fn pending_cases(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Doctor)?;

    let service = ReviewService::new(state.gateway.clone());
    let cases = service.pending_cases().await?;

    Ok(Json(json!({
        "success": true,
        "cases": cases,
    })))
}

pub async fn review_case(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(prediction_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Doctor)?;

    let service = ReviewService::new(state.gateway.clone());
    service
        .review_case(&prediction_id, &auth.user_id, request)
        .await?;

    Ok(Json(json!({ "success": true })))
}

/// Directory of doctors open for booking. No auth: patients browse this
/// before committing to a consultation.
pub async fn available_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(state.gateway.clone());
    let doctors = service.available_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors,
    })))
}
