use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use model_registry::{
    ImageTensor, ModelFamily, ModelHandle, ModelRegistry, RegisteredModel, MODEL_SPECS,
};
use shared_database::{collections, FindOptions, StoreError, StoreGateway};
use shared_models::{Prediction, ReviewStatus, RoleProfile, User};

use crate::models::{HistoryEntry, PatientStats, PredictionError};

/// Confidence used when a model cannot report class probabilities at all.
const SCORE_ONLY_CONFIDENCE: f64 = 0.75;
/// Confidence used when the probability computation itself fails.
const PROBABILITY_FAILURE_CONFIDENCE: f64 = 0.70;

pub struct PredictionService {
    gateway: StoreGateway,
    models: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(gateway: StoreGateway, models: Arc<ModelRegistry>) -> Self {
        Self { gateway, models }
    }

    /// Runs the named model over the submitted features and stores the
    /// resulting record. Persistence is best-effort: the verdict is returned
    /// to the patient even when the store write fails.
    pub async fn predict(
        &self,
        patient_id: &str,
        disease: &str,
        features: Vec<f64>,
    ) -> Result<Prediction, PredictionError> {
        let model = self
            .models
            .get(disease)
            .ok_or_else(|| PredictionError::UnknownModel {
                disease: disease.to_string(),
                loaded: self.loaded_diseases(),
            })?;

        let (class, confidence) = match model.spec.family {
            ModelFamily::Tabular => self.score_tabular(model, disease, &features)?,
            ModelFamily::Image => self.score_image(model)?,
        };
        let risk_level = risk_level(confidence, class);

        debug!(
            disease,
            class, confidence, risk_level, "inference complete"
        );

        let record = Prediction {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            disease: disease.to_string(),
            prediction: class,
            confidence,
            risk_level,
            // The record keeps the vector exactly as submitted; the
            // diabetes prepend is an inference-time fixup only.
            features,
            feature_names: model
                .spec
                .feature_names
                .iter()
                .map(|n| n.to_string())
                .collect(),
            created_at: Utc::now(),
            status: ReviewStatus::PendingReview,
            doctor_review: None,
            reviewed_by: None,
        };

        let document = serde_json::to_value(&record).map_err(StoreError::from)?;
        match self
            .gateway
            .insert_one(collections::PREDICTIONS, document)
            .await
        {
            Ok(_) => info!(prediction_id = %record.id, disease, "prediction stored"),
            Err(e) => warn!(disease, "could not save prediction: {}", e),
        }

        Ok(record)
    }

    fn score_tabular(
        &self,
        model: &RegisteredModel,
        disease: &str,
        features: &[f64],
    ) -> Result<(i64, f64), PredictionError> {
        let expected = model.spec.feature_count();

        // Legacy accommodation: the web form for diabetes omits the
        // pregnancies field, so a 7-wide vector gets a leading zero.
        let mut input = features.to_vec();
        if disease == "diabetes" && input.len() == 7 {
            input.insert(0, 0.0);
            debug!("prepended pregnancies=0 for 7-feature diabetes input");
        }

        if input.len() != expected {
            return Err(PredictionError::FeatureCountMismatch {
                disease: disease.to_string(),
                expected,
                got: input.len(),
            });
        }

        match &model.handle {
            ModelHandle::Probabilistic(m) => {
                let class = m.score(&input)?;
                let confidence = match m.class_probabilities(&input) {
                    Ok(probabilities) => probabilities
                        .into_iter()
                        .fold(f64::MIN, f64::max)
                        .clamp(0.0, 1.0),
                    Err(e) => {
                        warn!(disease, "probability computation failed: {}", e);
                        PROBABILITY_FAILURE_CONFIDENCE
                    }
                };
                Ok((class, confidence))
            }
            ModelHandle::Scored(m) => Ok((m.score(&input)?, SCORE_ONLY_CONFIDENCE)),
            ModelHandle::Image(_) => Err(PredictionError::Inference(
                model_registry::ModelError::Input(format!(
                    "model '{}' is registered as an image model",
                    disease
                )),
            )),
        }
    }

    fn score_image(&self, model: &RegisteredModel) -> Result<(i64, f64), PredictionError> {
        let (width, height, channels) = model.spec.image_dims.unwrap_or((224, 224, 3));

        // No image decoding pipeline is wired in; a random tensor stands in
        // for the capture, as the demo deployment does.
        let tensor = ImageTensor::random(width, height, channels);
        debug!(disease = model.spec.disease, "scoring demo image tensor");

        match &model.handle {
            ModelHandle::Image(m) => {
                let raw = m.score_image(&tensor)?;
                let class = i64::from(raw > 0.5);
                let confidence = if class == 1 { raw } else { 1.0 - raw };
                Ok((class, confidence))
            }
            _ => Err(PredictionError::Inference(
                model_registry::ModelError::Input(format!(
                    "model '{}' is not an image model",
                    model.spec.disease
                )),
            )),
        }
    }

    /// Patient's predictions, newest first. Reviewed rows get the reviewer's
    /// name and specialization joined in; a failed lookup leaves the row
    /// unenriched rather than failing the listing.
    pub async fn history(&self, patient_id: &str) -> Result<Vec<HistoryEntry>, PredictionError> {
        let predictions: Vec<Prediction> = self
            .gateway
            .find(
                collections::PREDICTIONS,
                json!({ "patient_id": patient_id }),
                FindOptions {
                    sort: Some(json!({ "created_at": -1 })),
                    ..Default::default()
                },
            )
            .await?;

        let mut entries = Vec::with_capacity(predictions.len());
        for prediction in predictions {
            let mut entry = HistoryEntry {
                doctor_name: None,
                doctor_specialization: None,
                prediction,
            };

            if entry.prediction.doctor_review.is_some() {
                if let Some(reviewer_id) = entry.prediction.reviewed_by.clone() {
                    match self
                        .gateway
                        .find_one::<User>(collections::USERS, json!({ "id": reviewer_id }))
                        .await
                    {
                        Ok(Some(doctor)) => {
                            entry.doctor_name = Some(doctor.name.clone());
                            if let RoleProfile::Doctor(profile) = &doctor.profile {
                                entry.doctor_specialization = profile.specialization.clone();
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("reviewer lookup failed, returning row unenriched: {}", e)
                        }
                    }
                }
            }

            entries.push(entry);
        }

        Ok(entries)
    }

    pub async fn stats(&self, patient_id: &str) -> Result<PatientStats, PredictionError> {
        let predictions: Vec<Prediction> = self
            .gateway
            .find(
                collections::PREDICTIONS,
                json!({ "patient_id": patient_id }),
                FindOptions {
                    sort: Some(json!({ "created_at": -1 })),
                    ..Default::default()
                },
            )
            .await?;

        let consultations: Vec<serde_json::Value> = self
            .gateway
            .find(
                collections::CONSULTATIONS,
                json!({ "patient_id": patient_id }),
                FindOptions {
                    projection: Some(json!({ "id": 1 })),
                    ..Default::default()
                },
            )
            .await?;

        let last_checkup = predictions
            .first()
            .map(|p| p.created_at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Never".to_string());

        Ok(PatientStats {
            total_predictions: predictions.len(),
            consultations: consultations.len(),
            last_checkup,
            total_models: MODEL_SPECS.len(),
            favorite_model: "Anemia Detection",
        })
    }

    fn loaded_diseases(&self) -> Vec<String> {
        self.models
            .status()
            .into_iter()
            .filter(|s| s.loaded)
            .map(|s| s.disease)
            .collect()
    }
}

/// Maps a (confidence, class) pair onto the clinical risk wording. All
/// boundaries are strict: 0.9 on a negative verdict is "Low Risk", not
/// "Very Low Risk".
pub fn risk_level(confidence: f64, prediction: i64) -> String {
    let level = if prediction == 0 {
        if confidence > 0.9 {
            "Very Low Risk"
        } else if confidence > 0.7 {
            "Low Risk"
        } else {
            "Uncertain - Low Risk"
        }
    } else if confidence > 0.9 {
        "Very High Risk"
    } else if confidence > 0.8 {
        "High Risk"
    } else if confidence > 0.6 {
        "Moderate Risk"
    } else {
        "Uncertain - Moderate Risk"
    };
    level.to_string()
}
