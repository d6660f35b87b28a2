use serde::{Deserialize, Serialize};

use model_registry::ModelError;
use shared_database::StoreError;
use shared_models::{error::AppError, Prediction};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

/// Prediction row as the history endpoint returns it: the stored record plus
/// reviewer details joined in when the case has been reviewed and the lookup
/// succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub prediction: Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_specialization: Option<String>,
}

/// Dashboard counters. Key casing matches what the web client reads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub total_predictions: usize,
    pub consultations: usize,
    pub last_checkup: String,
    pub total_models: usize,
    pub favorite_model: &'static str,
}

// ===== ERROR HANDLING =====

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Model '{disease}' is not available. Loaded models: {loaded:?}")]
    UnknownModel { disease: String, loaded: Vec<String> },

    #[error("Expected {expected} features for {disease}, got {got}")]
    FeatureCountMismatch {
        disease: String,
        expected: usize,
        got: usize,
    },

    #[error("Prediction failed: {0}")]
    Inference(#[from] ModelError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::UnknownModel { .. } | PredictionError::FeatureCountMismatch { .. } => {
                AppError::Validation(err.to_string())
            }
            PredictionError::Inference(_) => AppError::Internal(err.to_string()),
            PredictionError::Store(store) => store.into(),
        }
    }
}
