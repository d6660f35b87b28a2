use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use shared_models::{error::AppError, AuthSession, Role};
use shared_state::AppState;

use crate::models::PredictRequest;
use crate::services::catalog::disease_catalog;
use crate::services::PredictionService;

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(disease): Path<String>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Patient)?;

    let service = PredictionService::new(state.gateway.clone(), Arc::clone(&state.models));
    let prediction = service
        .predict(&auth.user_id, &disease, request.features)
        .await?;

    Ok(Json(json!({
        "success": true,
        "prediction": prediction,
    })))
}

pub async fn prediction_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Patient)?;

    let service = PredictionService::new(state.gateway.clone(), Arc::clone(&state.models));
    let predictions = service.history(&auth.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "predictions": predictions,
    })))
}

pub async fn patient_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<Value>, AppError> {
    auth.require_role(Role::Patient)?;

    let service = PredictionService::new(state.gateway.clone(), Arc::clone(&state.models));
    let stats = service.stats(&auth.user_id).await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

/// Static catalog of input schemas for the prediction forms. No auth: the
/// client renders these before login.
pub async fn diseases_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "diseases": disease_catalog(),
    }))
}

pub async fn models_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let statuses = state.models.status();
    let total = statuses.len();
    let loaded = statuses.iter().filter(|s| s.loaded).count();

    let models: Value = statuses
        .iter()
        .map(|s| {
            (
                s.disease.clone(),
                json!({
                    "loaded": s.loaded,
                    "has_scaler": s.has_scaler,
                    "feature_count": s.feature_count,
                    "family": s.family,
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into();

    Json(json!({
        "success": true,
        "total_models": total,
        "loaded_models": loaded,
        "failed_models": total - loaded,
        "models": models,
        "summary": format!("{}/{} models ready", loaded, total),
        "timestamp": Utc::now(),
    }))
}
