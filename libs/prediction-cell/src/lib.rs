//! Disease-risk prediction endpoints: runs registered model artifacts over
//! patient-submitted features, tiers the verdict into a risk level, and keeps
//! a per-patient prediction history for doctor review.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{PredictRequest, PredictionError};
pub use router::prediction_routes;
pub use services::prediction::PredictionService;
