use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use auth_cell::auth_routes;
use chat_cell::chat_routes;
use consultation_cell::consultation_routes;
use prediction_cell::prediction_routes;
use shared_state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let ops = Router::new()
        .route("/health", get(health))
        .route("/health/network", get(network_health))
        .with_state(state.clone());

    let api = Router::new()
        .merge(ops)
        .merge(prediction_routes(state.clone()))
        .merge(consultation_routes(state.clone()))
        .merge(chat_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Telecare API is running!" }))
        .nest("/api/auth", auth_routes(state))
        .nest("/api", api)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "application": "running",
        "timestamp": Utc::now(),
    }))
}

/// Store reachability probe. An unreachable store reports 503 so load
/// balancers steer traffic away while the process itself stays up.
async fn network_health(State(state): State<Arc<AppState>>) -> Response {
    let store = state.gateway.store();
    if !store.is_connected() {
        let body = json!({
            "status": "disconnected",
            "database": "not_initialized",
            "application": "running",
            "timestamp": Utc::now(),
        });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }

    match store.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "database": "connected",
            "application": "running",
            "timestamp": Utc::now(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "database": "connection_failed",
                "application": "running",
                "error": e.to_string(),
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use model_registry::ModelRegistry;
    use shared_database::DocumentStore;
    use shared_utils::test_utils::{MockStoreResponses, SessionTestUtils, TestConfig, TestUser};

    fn app_with_state(store_url: &str) -> (Router, Arc<AppState>) {
        let config = TestConfig::default().with_store(store_url).to_app_config();
        let store = DocumentStore::from_parts(
            config.docstore_url.clone(),
            config.docstore_api_key.clone(),
        );
        let state = Arc::new(AppState::with_parts(config, store, ModelRegistry::new()));
        (create_router(state.clone()), state)
    }

    fn app_for(store_url: &str) -> Router {
        app_with_state(store_url).0
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        send(app, builder.body(Body::from(body.to_string())).unwrap()).await
    }

    /// First insertOne body written to the named collection, per the mock
    /// server's request log.
    async fn captured_insert(server: &MockServer, collection: &str) -> Value {
        let requests = server.received_requests().await.unwrap();
        requests
            .iter()
            .filter(|r| r.url.path().ends_with("/action/insertOne"))
            .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
            .find(|body| body["collection"] == collection)
            .unwrap_or_else(|| panic!("no insertOne into {}", collection))["document"]
            .clone()
    }

    #[tokio::test]
    async fn liveness_answers_without_the_store() {
        let app = app_for("");

        let (status, body) = get_json(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["application"], "running");
    }

    #[tokio::test]
    async fn network_health_reports_disconnected_when_unconfigured() {
        let config = TestConfig::default().with_store("").to_app_config();
        let store = DocumentStore::from_parts(String::new(), String::new());
        let state = Arc::new(AppState::with_parts(config, store, ModelRegistry::new()));
        let app = create_router(state);

        let (status, body) = get_json(&app, "/api/health/network").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "disconnected");
        assert_eq!(body["database"], "not_initialized");
        assert_eq!(body["application"], "running");
    }

    #[tokio::test]
    async fn network_health_reports_healthy_when_the_store_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "document": null })),
            )
            .mount(&server)
            .await;
        let app = app_for(&server.uri());

        let (status, body) = get_json(&app, "/api/health/network").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn network_health_reports_degraded_when_the_store_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let app = app_for(&server.uri());

        let (status, body) = get_json(&app, "/api/health/network").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "connection_failed");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn every_cell_is_mounted_under_the_api_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "document": null })),
            )
            .mount(&server)
            .await;
        let app = app_for(&server.uri());

        // One route per cell is enough to prove assembly.
        let (status, body) = get_json(&app, "/api/diseases/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let send = Request::builder()
            .method("POST")
            .uri("/api/chat/send-message")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.clone().oneshot(send).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Unknown user resolves to the uniform credential rejection.
        let login = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"email":"x@y.z","password":"nope"}"#))
            .unwrap();
        let response = app.clone().oneshot(login).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let consultations = Request::builder()
            .uri("/api/patient/consultations")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(consultations).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// The whole patient journey through the assembled app: register, log
    /// in, book a doctor, send a message into the booked room, and read it
    /// back as that doctor with the read receipt applied.
    #[tokio::test]
    async fn booked_consultation_carries_chat_from_patient_to_doctor() {
        let server = MockServer::start().await;
        let doctor = TestUser::doctor("gregory@example.com");

        Mock::given(method("POST"))
            .and(path("/action/insertOne"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("x")),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/action/updateOne"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1, 1)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/action/updateMany"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1, 1)),
            )
            .mount(&server)
            .await;
        // Booking's doctor-existence check.
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .and(body_partial_json(json!({
                "collection": "users",
                "filter": { "id": doctor.id.clone(), "user_type": "doctor" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                MockStoreResponses::document(doctor.to_document("unused-hash")),
            ))
            .mount(&server)
            .await;
        // Registration's duplicate-email check finds nothing, once.
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .and(body_partial_json(json!({
                "collection": "users",
                "filter": { "email": "pat@example.com" },
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::no_document()),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let (app, state) = app_with_state(&server.uri());

        let (status, _) = post_json(
            &app,
            "/api/auth/register",
            None,
            json!({
                "email": "pat@example.com",
                "password": "sekrit",
                "name": "Pat",
                "user_type": "patient",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Feed the stored user back for the login lookup.
        let patient_doc = captured_insert(&server, "users").await;
        let patient_id = patient_doc["id"].as_str().unwrap().to_string();
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .and(body_partial_json(json!({
                "collection": "users",
                "filter": { "email": "pat@example.com" },
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(patient_doc)),
            )
            .mount(&server)
            .await;

        let (status, body) = post_json(
            &app,
            "/api/auth/login",
            None,
            json!({ "email": "pat@example.com", "password": "sekrit" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let patient_token = body["token"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            &app,
            "/api/consultation/book",
            Some(&patient_token),
            json!({ "doctor_id": doctor.id.clone() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let room_id = body["chat_room_id"].as_str().unwrap().to_string();

        // The booked room pairs exactly this patient with this doctor.
        let room_doc = captured_insert(&server, "chat_rooms").await;
        assert_eq!(
            room_doc["participants"],
            json!([patient_id.clone(), doctor.id.clone()])
        );
        Mock::given(method("POST"))
            .and(path("/action/findOne"))
            .and(body_partial_json(json!({
                "collection": "chat_rooms",
                "filter": { "id": room_id.clone() },
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(room_doc)),
            )
            .mount(&server)
            .await;

        let (status, _) = post_json(
            &app,
            "/api/chat/send-message",
            Some(&patient_token),
            json!({ "chat_room_id": room_id.clone(), "content": "hello" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mut message_doc = captured_insert(&server, "messages").await;
        assert_eq!(message_doc["sender_id"], patient_id.as_str());
        assert_eq!(message_doc["read_by"], json!([patient_id.clone()]));

        // The doctor opens the room: the store shows the message after the
        // receipt write has added them to the reader set.
        message_doc["read_by"] = json!([patient_id.clone(), doctor.id.clone()]);
        Mock::given(method("POST"))
            .and(path("/action/find"))
            .and(body_partial_json(json!({ "collection": "messages" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(MockStoreResponses::documents(vec![message_doc])),
            )
            .mount(&server)
            .await;
        let doctor_token =
            SessionTestUtils::login(&state.sessions, &state.config.session_secret, &doctor).await;

        let request = Request::builder()
            .uri(format!("/api/chat/messages/{}", room_id))
            .header("authorization", format!("Bearer {}", doctor_token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], "hello");
        let readers = body["messages"][0]["read_by"].as_array().unwrap();
        assert!(readers.contains(&json!(patient_id.clone())));
        assert!(readers.contains(&json!(doctor.id.clone())));

        // And the receipt write targeted exactly the messages the doctor
        // did not send.
        let requests = server.received_requests().await.unwrap();
        let receipt = requests
            .iter()
            .find(|r| r.url.path().ends_with("/action/updateMany"))
            .expect("no read-receipt write was made");
        let receipt_body: Value = serde_json::from_slice(&receipt.body).unwrap();
        assert_eq!(receipt_body["filter"]["chat_room_id"], room_id.as_str());
        assert_eq!(receipt_body["filter"]["sender_id"]["$ne"], doctor.id.as_str());
        assert_eq!(receipt_body["update"]["$addToSet"]["read_by"], doctor.id.as_str());
    }
}
