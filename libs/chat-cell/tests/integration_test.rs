use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chat_cell::chat_routes;
use model_registry::ModelRegistry;
use realtime_hub::EventPayload;
use shared_database::DocumentStore;
use shared_state::AppState;
use shared_utils::test_utils::{MockStoreResponses, SessionTestUtils, TestConfig, TestUser};

fn test_app(store_url: &str, upload_dir: &str) -> (Router, Arc<AppState>) {
    let config = TestConfig::default()
        .with_store(store_url)
        .with_upload_dir(upload_dir)
        .to_app_config();
    let store = DocumentStore::from_parts(
        config.docstore_url.clone(),
        config.docstore_api_key.clone(),
    );
    let state = Arc::new(AppState::with_parts(config, store, ModelRegistry::new()));
    (chat_routes(state.clone()), state)
}

async fn patient_token(state: &AppState) -> (TestUser, String) {
    let user = TestUser::patient("pat@example.com");
    let token = SessionTestUtils::login(&state.sessions, &state.config.session_secret, &user).await;
    (user, token)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_json(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get_with_token(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn room_document(room_id: &str, patient_id: &str, doctor_id: &str) -> Value {
    json!({
        "id": room_id,
        "consultation_id": "consult-1",
        "participants": [patient_id, doctor_id],
        "messages": [],
        "created_at": "2026-02-20T09:00:00Z",
        "active": true,
    })
}

fn message_document(id: &str, room_id: &str, sender_id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "chat_room_id": room_id,
        "sender_id": sender_id,
        "sender_role": "doctor",
        "message_type": "text",
        "content": content,
        "timestamp": "2026-02-20T10:00:00Z",
        "read_by": [sender_id],
        "edited": false,
    })
}

async fn requests_to(server: &MockServer, action_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == action_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn sending_a_message_persists_and_broadcasts_it() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            room_document("room-1", &patient.id, "doc-1"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("oid-1")),
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

    let mut events = state.hub.subscribe("room-1").await;

    let (status, body) = post_json(
        &app,
        "/chat/send-message",
        &token,
        json!({ "chat_room_id": "room-1", "content": "How are you feeling?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let message_id = body["message_id"].as_str().unwrap();

    let inserts = requests_to(&server, "/action/insertOne").await;
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0]["collection"], "messages");
    let stored = &inserts[0]["document"];
    assert_eq!(stored["id"], message_id);
    assert_eq!(stored["sender_id"], patient.id);
    assert_eq!(stored["message_type"], "text");
    assert_eq!(stored["read_by"], json!([patient.id]));
    assert_eq!(stored["edited"], false);

    let bump = &requests_to(&server, "/action/updateOne").await[0];
    assert_eq!(bump["filter"]["id"], "room-1");
    assert_eq!(bump["update"]["$push"]["messages"], message_id);
    assert!(bump["update"]["$set"]["last_message_at"].is_string());

    let event = events.try_recv().unwrap();
    match event.payload {
        EventPayload::NewMessage(message) => {
            assert_eq!(message.id, message_id);
            assert_eq!(message.content, "How are you feeling?");
        }
        other => panic!("expected new_message, got {:?}", other),
    }
}

#[tokio::test]
async fn message_send_is_denied_to_outsiders() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            room_document("room-1", "someone-else", "doc-1"),
        )))
        .mount(&server)
        .await;

    let (status, body) = post_json(
        &app,
        "/chat/send-message",
        &token,
        json!({ "chat_room_id": "room-1", "content": "hello" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], "Access denied");
    assert!(requests_to(&server, "/action/insertOne").await.is_empty());
}

#[tokio::test]
async fn missing_room_is_recreated_from_the_consultation() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "chat_rooms" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::no_document()),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "consultations" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            json!({
                "id": "consult-1",
                "patient_id": patient.id,
                "doctor_id": "doc-1",
                "requested_date": "2026-03-01T10:00:00Z",
                "message": "",
                "status": "accepted",
                "created_at": "2026-02-20T09:00:00Z",
                "updated_at": "2026-02-20T09:00:00Z",
                "chat_room_id": "room-1",
                "video_call_enabled": true,
                "file_sharing_enabled": true,
            }),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("oid-1")),
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

    let (status, body) = post_json(
        &app,
        "/chat/send-message",
        &token,
        json!({ "chat_room_id": "room-1", "content": "still there?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let inserts = requests_to(&server, "/action/insertOne").await;
    assert_eq!(inserts.len(), 2);
    assert_eq!(inserts[0]["collection"], "chat_rooms");
    assert_eq!(inserts[0]["document"]["id"], "room-1");
    assert_eq!(inserts[0]["document"]["consultation_id"], "consult-1");
    assert_eq!(
        inserts[0]["document"]["participants"],
        json!([patient.id, "doc-1"])
    );
    assert_eq!(inserts[1]["collection"], "messages");
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::no_document()),
        )
        .mount(&server)
        .await;

    let (status, body) = post_json(
        &app,
        "/chat/send-message",
        &token,
        json!({ "chat_room_id": "ghost", "content": "anyone?" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Chat room not found");
}

#[tokio::test]
async fn message_requires_room_and_content() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    for payload in [
        json!({}),
        json!({ "chat_room_id": "room-1" }),
        json!({ "chat_room_id": "room-1", "content": "   " }),
    ] {
        let (status, body) = post_json(&app, "/chat/send-message", &token, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Chat room ID and content are required");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn reading_history_marks_alien_messages_read_first() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            room_document("room-1", &patient.id, "doc-1"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/updateMany"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(2, 2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::documents(
            vec![
                message_document("m-1", "room-1", "doc-1", "Results look stable."),
                message_document("m-2", "room-1", "doc-1", "See you Thursday."),
            ],
        )))
        .mount(&server)
        .await;

    let (status, body) = get_with_token(&app, "/chat/messages/room-1", &token).await;

    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "Results look stable.");

    // Receipts are written before the fetch, so the caller observes them.
    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    let mark = paths.iter().position(|p| *p == "/action/updateMany").unwrap();
    let fetch = paths.iter().position(|p| *p == "/action/find").unwrap();
    assert!(mark < fetch);

    let receipt = &requests_to(&server, "/action/updateMany").await[0];
    assert_eq!(receipt["filter"]["chat_room_id"], "room-1");
    assert_eq!(receipt["filter"]["sender_id"]["$ne"], patient.id);
    assert_eq!(receipt["update"]["$addToSet"]["read_by"], patient.id);

    let fetch_body = &requests_to(&server, "/action/find").await[0];
    assert_eq!(fetch_body["sort"]["timestamp"], 1);
}

#[tokio::test]
async fn history_is_forbidden_to_outsiders() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            room_document("room-1", "someone-else", "doc-1"),
        )))
        .mount(&server)
        .await;

    let (status, body) = get_with_token(&app, "/chat/messages/room-1", &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
    assert!(requests_to(&server, "/action/updateMany").await.is_empty());
}

#[tokio::test]
async fn room_bookkeeping_failure_does_not_fail_the_send() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::document(
            room_document("room-1", &patient.id, "doc-1"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("oid-1")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = post_json(
        &app,
        "/chat/send-message",
        &token,
        json!({ "chat_room_id": "room-1", "content": "did this land?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn upload_stores_the_file_under_a_uuid_prefixed_name() {
    let server = MockServer::start().await;
    let upload_dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&server.uri(), upload_dir.path().to_str().unwrap());
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("oid-1")),
        )
        .mount(&server)
        .await;

    let boundary = "cell-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"room_id\"\r\n\r\n\
         room-1\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"report.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         fake pdf bytes\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/chat/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "report.pdf");
    let file_url = body["file_url"].as_str().unwrap();
    assert!(file_url.starts_with("/uploads/chat/"));
    assert!(file_url.ends_with("_report.pdf"));

    let stored_name = file_url.trim_start_matches("/uploads/chat/");
    let contents = std::fs::read_to_string(upload_dir.path().join(stored_name)).unwrap();
    assert_eq!(contents, "fake pdf bytes");

    let metadata = &requests_to(&server, "/action/insertOne").await[0];
    assert_eq!(metadata["collection"], "chat_files");
    assert_eq!(metadata["document"]["uploaded_by"], patient.id);
    assert_eq!(metadata["document"]["chat_room_id"], "room-1");
    assert_eq!(metadata["document"]["original_name"], "report.pdf");
    assert_eq!(metadata["document"]["size_bytes"], 14);
}

#[tokio::test]
async fn upload_without_a_file_is_rejected() {
    let server = MockServer::start().await;
    let upload_dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&server.uri(), upload_dir.path().to_str().unwrap());
    let (_, token) = patient_token(&state).await;

    let boundary = "cell-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"room_id\"\r\n\r\n\
         room-1\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/chat/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file provided");
}

#[tokio::test]
async fn upload_requires_a_room_id() {
    let server = MockServer::start().await;
    let upload_dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&server.uri(), upload_dir.path().to_str().unwrap());
    let (_, token) = patient_token(&state).await;

    let boundary = "cell-test-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/chat/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Room ID is required");
}

#[tokio::test]
async fn starting_a_call_rings_the_room() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (patient, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted("oid-1")),
        )
        .mount(&server)
        .await;

    let mut events = state.hub.subscribe("room-1").await;

    let (status, body) = post_json(
        &app,
        "/video-call/start",
        &token,
        json!({ "consultation_id": "consult-1", "room_id": "room-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let call_id = body["call_id"].as_str().unwrap();

    let session = &requests_to(&server, "/action/insertOne").await[0];
    assert_eq!(session["collection"], "call_sessions");
    assert_eq!(session["document"]["id"], call_id);
    assert_eq!(session["document"]["status"], "calling");
    assert_eq!(session["document"]["call_type"], "video");
    assert_eq!(session["document"]["initiated_by"], patient.id);

    let event = events.try_recv().unwrap();
    match event.payload {
        EventPayload::IncomingCall(invite) => {
            assert_eq!(invite.call_id, call_id);
            assert_eq!(invite.caller_id, patient.id);
        }
        other => panic!("expected incoming_call, got {:?}", other),
    }
}

#[tokio::test]
async fn call_start_survives_a_failed_session_write() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut events = state.hub.subscribe("room-1").await;

    let (status, body) = post_json(
        &app,
        "/video-call/start",
        &token,
        json!({ "consultation_id": "consult-1", "room_id": "room-1", "call_type": "audio" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let event = events.try_recv().unwrap();
    match event.payload {
        EventPayload::IncomingCall(invite) => {
            assert_eq!(invite.call_type.to_string(), "audio")
        }
        other => panic!("expected incoming_call, got {:?}", other),
    }
}

#[tokio::test]
async fn call_requires_consultation_and_room() {
    let server = MockServer::start().await;
    let (app, state) = test_app(&server.uri(), "./uploads/chat");
    let (_, token) = patient_token(&state).await;

    for payload in [json!({}), json!({ "room_id": "room-1" })] {
        let (status, body) = post_json(&app, "/video-call/start", &token, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Consultation ID and room ID are required");
    }
}

#[tokio::test]
async fn chat_routes_require_a_session() {
    let server = MockServer::start().await;
    let (app, _) = test_app(&server.uri(), "./uploads/chat");

    let request = Request::builder()
        .method("POST")
        .uri("/chat/send-message")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "chat_room_id": "room-1", "content": "hi" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert!(server.received_requests().await.unwrap().is_empty());
}
