use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::{ModelError, Probabilistic, Scored};

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Serialized form of an exported linear classifier: coefficient vector,
/// intercept, and the optional standardization parameters baked in at
/// training time. Models exported without calibrated probabilities set
/// `probabilistic: false` and load as plain scored models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<ScalerParams>,
    #[serde(default = "default_probabilistic")]
    pub probabilistic: bool,
}

fn default_probabilistic() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl LinearArtifact {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn into_model(self) -> Result<LinearModel, ArtifactError> {
        if self.weights.is_empty() {
            return Err(ArtifactError::Invalid("empty weight vector".to_string()));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != self.weights.len() || scaler.std.len() != self.weights.len() {
                return Err(ArtifactError::Invalid(format!(
                    "scaler dimensions {}/{} do not match {} weights",
                    scaler.mean.len(),
                    scaler.std.len(),
                    self.weights.len()
                )));
            }
        }
        Ok(LinearModel {
            weights: self.weights,
            intercept: self.intercept,
            scaler: self.scaler,
        })
    }
}

/// Binary linear classifier over a (optionally standardized) feature vector.
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Vec<f64>,
    intercept: f64,
    scaler: Option<ScalerParams>,
}

impl LinearModel {
    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn decision(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::Input(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.len()
            )));
        }

        let z = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let x = match &self.scaler {
                    Some(s) if s.std[i] != 0.0 => (features[i] - s.mean[i]) / s.std[i],
                    Some(s) => features[i] - s.mean[i],
                    None => features[i],
                };
                w * x
            })
            .sum::<f64>()
            + self.intercept;

        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Scored for LinearModel {
    fn score(&self, features: &[f64]) -> Result<i64, ModelError> {
        let p = self.decision(features)?;
        Ok(if p > 0.5 { 1 } else { 0 })
    }
}

impl Probabilistic for LinearModel {
    fn class_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let p = self.decision(features)?;
        Ok(vec![1.0 - p, p])
    }
}
