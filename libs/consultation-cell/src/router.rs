use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_state::AppState;
use shared_utils::auth_middleware;

use crate::handlers;

pub fn consultation_routes(state: Arc<AppState>) -> Router {
    let public_routes =
        Router::new().route("/doctors/available", get(handlers::available_doctors));

    let protected_routes = Router::new()
        .route("/consultation/book", post(handlers::book_consultation))
        .route(
            "/patient/consultations",
            get(handlers::patient_consultations),
        )
        .route("/doctor/consultations", get(handlers::doctor_consultations))
        .route(
            "/consultation/{consultation_id}/status",
            put(handlers::update_status),
        )
        .route("/doctor/pending-cases", get(handlers::pending_cases))
        .route(
            "/doctor/review-case/{prediction_id}",
            post(handlers::review_case),
        )
        .layer(middleware::from_fn_with_state(
            state.auth_state(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
