use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_state::AppState;
use shared_utils::auth_middleware;

use crate::handlers;

pub fn prediction_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/diseases/info", get(handlers::diseases_info))
        .route("/models/status", get(handlers::models_status));

    let protected_routes = Router::new()
        .route("/patient/predict/{disease}", post(handlers::predict))
        .route(
            "/patient/prediction-history",
            get(handlers::prediction_history),
        )
        .route("/patient/stats", get(handlers::patient_stats))
        .layer(middleware::from_fn_with_state(
            state.auth_state(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
