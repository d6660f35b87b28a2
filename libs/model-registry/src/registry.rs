use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::artifact::LinearArtifact;
use crate::capability::{ImageScored, Probabilistic, Scored};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Tabular,
    Image,
}

/// Declared interface of one disease model: input family, arity and the
/// field order expected by the trained artifact.
#[derive(Debug)]
pub struct ModelSpec {
    pub disease: &'static str,
    pub family: ModelFamily,
    pub feature_names: &'static [&'static str],
    pub image_dims: Option<(u32, u32, u32)>,
}

impl ModelSpec {
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn for_disease(disease: &str) -> Option<&'static ModelSpec> {
        MODEL_SPECS.iter().find(|spec| spec.disease == disease)
    }
}

pub const MODEL_SPECS: &[ModelSpec] = &[
    ModelSpec {
        disease: "anemia",
        family: ModelFamily::Tabular,
        feature_names: &["gender", "hemoglobin", "mch", "mchc", "mcv"],
        image_dims: None,
    },
    ModelSpec {
        disease: "diabetes",
        family: ModelFamily::Tabular,
        feature_names: &[
            "pregnancies",
            "glucose",
            "bloodpressure",
            "skinthickness",
            "insulin",
            "bmi",
            "diabetespedigreefunction",
            "age",
        ],
        image_dims: None,
    },
    ModelSpec {
        disease: "heart_disease",
        family: ModelFamily::Tabular,
        feature_names: &[
            "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang",
            "oldpeak", "slope", "ca", "thal",
        ],
        image_dims: None,
    },
    ModelSpec {
        disease: "chronic",
        family: ModelFamily::Tabular,
        feature_names: &[
            "gender",
            "age",
            "smoking",
            "yellow_fingers",
            "anxiety",
            "peer_pressure",
            "chronic_disease",
            "fatigue",
            "allergy",
            "wheezing",
            "alcohol_consuming",
            "coughing",
            "shortness_of_breath",
            "swallowing_difficulty",
            "chest_pain",
        ],
        image_dims: None,
    },
    ModelSpec {
        disease: "malaria",
        family: ModelFamily::Image,
        feature_names: &["image_data"],
        image_dims: Some((224, 224, 3)),
    },
];

/// Capability selected when the artifact is decoded, never probed at call
/// time: a model either scores, scores with probabilities, or scores images.
pub enum ModelHandle {
    Scored(Arc<dyn Scored>),
    Probabilistic(Arc<dyn Probabilistic>),
    Image(Arc<dyn ImageScored>),
}

pub struct RegisteredModel {
    pub spec: &'static ModelSpec,
    pub handle: ModelHandle,
    pub has_scaler: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub disease: String,
    pub loaded: bool,
    pub has_scaler: bool,
    pub feature_count: usize,
    pub family: ModelFamily,
}

/// In-process model registry, built once at startup from the artifact cache
/// directory and injected behind `Arc`.
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under a declared disease key. Unknown keys are
    /// rejected so the registry never drifts from the declared table.
    pub fn register(
        &mut self,
        disease: &str,
        handle: ModelHandle,
        has_scaler: bool,
    ) -> Result<(), String> {
        let spec = ModelSpec::for_disease(disease)
            .ok_or_else(|| format!("no declared model spec for '{}'", disease))?;
        self.models.insert(
            disease.to_string(),
            RegisteredModel {
                spec,
                handle,
                has_scaler,
            },
        );
        Ok(())
    }

    pub fn get(&self, disease: &str) -> Option<&RegisteredModel> {
        self.models.get(disease)
    }

    pub fn is_loaded(&self, disease: &str) -> bool {
        self.models.contains_key(disease)
    }

    pub fn loaded_count(&self) -> usize {
        self.models.len()
    }

    /// Status report covering every declared disease, loaded or not.
    pub fn status(&self) -> Vec<ModelStatus> {
        MODEL_SPECS
            .iter()
            .map(|spec| {
                let loaded = self.models.get(spec.disease);
                ModelStatus {
                    disease: spec.disease.to_string(),
                    loaded: loaded.is_some(),
                    has_scaler: loaded.map(|m| m.has_scaler).unwrap_or(false),
                    feature_count: spec.feature_count(),
                    family: spec.family,
                }
            })
            .collect()
    }

    /// Scan the artifact cache for `{disease}.model.json` files and register
    /// every one that decodes. A missing or malformed artifact leaves that
    /// disease unloaded; prediction requests for it then fail with an
    /// unknown-model error, the rest keep working.
    pub fn load_from_dir(dir: &Path) -> Self {
        let mut registry = Self::new();

        for spec in MODEL_SPECS {
            let path = dir.join(format!("{}.model.json", spec.disease));
            if !path.exists() {
                warn!("Model artifact missing for '{}': {}", spec.disease, path.display());
                continue;
            }

            if spec.family == ModelFamily::Image {
                // No in-process decoder for image-network artifacts; image
                // models are registered programmatically when a backend is
                // wired in.
                warn!(
                    "Skipping image artifact for '{}': no local decoder",
                    spec.disease
                );
                continue;
            }

            match LinearArtifact::from_file(&path) {
                Ok(artifact) => {
                    let probabilistic = artifact.probabilistic;
                    match artifact.into_model() {
                        Ok(model) if model.feature_count() != spec.feature_count() => {
                            warn!(
                                "Artifact for '{}' declares {} features, expected {}; skipped",
                                spec.disease,
                                model.feature_count(),
                                spec.feature_count()
                            );
                        }
                        Ok(model) => {
                            let has_scaler = model.has_scaler();
                            let handle = if probabilistic {
                                ModelHandle::Probabilistic(Arc::new(model))
                            } else {
                                ModelHandle::Scored(Arc::new(model))
                            };
                            // Registration only fails for undeclared keys,
                            // and we iterate the declared table.
                            let _ = registry.register(spec.disease, handle, has_scaler);
                            info!("Loaded model '{}' from {}", spec.disease, path.display());
                        }
                        Err(err) => {
                            warn!("Artifact for '{}' rejected: {}", spec.disease, err);
                        }
                    }
                }
                Err(err) => {
                    warn!("Failed to load artifact for '{}': {}", spec.disease, err);
                }
            }
        }

        info!(
            "Model registry ready: {}/{} models loaded",
            registry.loaded_count(),
            MODEL_SPECS.len()
        );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ModelError, ImageTensor};
    use std::fs;

    struct StubScored(i64);

    impl Scored for StubScored {
        fn score(&self, _features: &[f64]) -> Result<i64, ModelError> {
            Ok(self.0)
        }
    }

    struct StubImage(f64);

    impl ImageScored for StubImage {
        fn score_image(&self, _image: &ImageTensor) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    #[test]
    fn declared_arities_match_source_models() {
        assert_eq!(ModelSpec::for_disease("anemia").unwrap().feature_count(), 5);
        assert_eq!(ModelSpec::for_disease("diabetes").unwrap().feature_count(), 8);
        assert_eq!(
            ModelSpec::for_disease("heart_disease").unwrap().feature_count(),
            13
        );
        assert_eq!(ModelSpec::for_disease("chronic").unwrap().feature_count(), 15);
        assert_eq!(
            ModelSpec::for_disease("malaria").unwrap().image_dims,
            Some((224, 224, 3))
        );
    }

    #[test]
    fn register_rejects_undeclared_disease() {
        let mut registry = ModelRegistry::new();
        let result = registry.register("flu", ModelHandle::Scored(Arc::new(StubScored(0))), false);
        assert!(result.is_err());
    }

    #[test]
    fn status_reports_every_declared_disease() {
        let mut registry = ModelRegistry::new();
        registry
            .register("malaria", ModelHandle::Image(Arc::new(StubImage(0.9))), false)
            .unwrap();

        let status = registry.status();
        assert_eq!(status.len(), MODEL_SPECS.len());

        let malaria = status.iter().find(|s| s.disease == "malaria").unwrap();
        assert!(malaria.loaded);
        let anemia = status.iter().find(|s| s.disease == "anemia").unwrap();
        assert!(!anemia.loaded);
        assert_eq!(anemia.feature_count, 5);
    }

    #[test]
    fn load_from_dir_registers_decodable_artifacts_only() {
        let dir = tempfile::tempdir().unwrap();

        let artifact = serde_json::json!({
            "weights": [0.1, 0.2, 0.3, 0.4, 0.5],
            "intercept": -0.2,
            "scaler": {
                "mean": [0.0, 0.0, 0.0, 0.0, 0.0],
                "std": [1.0, 1.0, 1.0, 1.0, 1.0],
            },
            "probabilistic": true,
        });
        fs::write(
            dir.path().join("anemia.model.json"),
            artifact.to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("diabetes.model.json"), "not json").unwrap();

        let registry = ModelRegistry::load_from_dir(dir.path());

        assert!(registry.is_loaded("anemia"));
        assert!(!registry.is_loaded("diabetes"));
        assert!(!registry.is_loaded("malaria"));

        let anemia = registry.get("anemia").unwrap();
        assert!(anemia.has_scaler);
        assert!(matches!(anemia.handle, ModelHandle::Probabilistic(_)));
    }
}
