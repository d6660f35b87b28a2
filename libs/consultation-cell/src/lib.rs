//! Consultation booking and doctor-review endpoints: patients book a doctor
//! (optionally attaching a prediction), doctors work their queue, transition
//! consultation status and attach case reviews.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{BookConsultationRequest, ConsultationError, ReviewRequest, UpdateStatusRequest};
pub use router::consultation_routes;
pub use services::{ConsultationService, ReviewService};
