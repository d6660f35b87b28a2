use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{DoctorProfile, PatientProfile, Role, RoleProfile, User, UserStatus};

use crate::session::SessionStore;
use crate::token::issue_token;

pub struct TestConfig {
    pub session_secret: String,
    pub docstore_url: String,
    pub docstore_api_key: String,
    pub chat_upload_dir: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            session_secret: "test-session-secret-long-enough-for-hmac".to_string(),
            docstore_url: "http://localhost:54321".to_string(),
            docstore_api_key: "test-api-key".to_string(),
            chat_upload_dir: "./uploads/chat".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the store at a mock server.
    pub fn with_store(mut self, url: &str) -> Self {
        self.docstore_url = url.to_string();
        self
    }

    /// Write uploads into a test-owned directory.
    pub fn with_upload_dir(mut self, dir: &str) -> Self {
        self.chat_upload_dir = dir.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            docstore_url: self.docstore_url.clone(),
            docstore_api_key: self.docstore_api_key.clone(),
            session_secret: self.session_secret.clone(),
            model_cache_dir: "./model_cache".to_string(),
            chat_upload_dir: self.chat_upload_dir.clone(),
            port: 3000,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::patient("test@example.com")
    }
}

impl TestUser {
    pub fn patient(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: "Test Patient".to_string(),
            role: Role::Patient,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: "Test Doctor".to_string(),
            role: Role::Doctor,
        }
    }

    /// Materialize a store-shaped user record around a password hash the
    /// test controls.
    pub fn to_user(&self, password_hash: &str) -> User {
        let profile = match self.role {
            Role::Patient => RoleProfile::Patient(PatientProfile {
                age: Some(30),
                gender: Some("other".to_string()),
                phone: Some("+15550100".to_string()),
            }),
            Role::Doctor => RoleProfile::Doctor(DoctorProfile {
                specialization: Some("General Medicine".to_string()),
                license_number: Some("LIC-0001".to_string()),
                experience: Some(8),
                verified: true,
            }),
        };

        User {
            id: self.id.clone(),
            email: self.email.clone(),
            password_hash: password_hash.to_string(),
            name: self.name.clone(),
            profile,
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn to_document(&self, password_hash: &str) -> serde_json::Value {
        serde_json::to_value(self.to_user(password_hash)).unwrap()
    }
}

pub struct SessionTestUtils;

impl SessionTestUtils {
    /// Open a real session for a user and return a valid bearer token.
    pub async fn login(store: &SessionStore, secret: &str, user: &TestUser) -> String {
        let session_id = store.create(&user.id, user.role).await;
        issue_token(session_id, secret).expect("test secret must sign")
    }

    /// A well-formed token whose session id was never issued.
    pub fn orphan_token(secret: &str) -> String {
        issue_token(Uuid::new_v4(), secret).expect("test secret must sign")
    }

    pub fn forged_token() -> String {
        issue_token(Uuid::new_v4(), "attacker-secret").expect("test secret must sign")
    }

    pub fn malformed_token() -> String {
        "not.a-real-token".to_string()
    }
}

/// Canned document-store action responses for wiremock setups.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn document(doc: serde_json::Value) -> serde_json::Value {
        json!({ "document": doc })
    }

    pub fn no_document() -> serde_json::Value {
        json!({ "document": null })
    }

    pub fn documents(docs: Vec<serde_json::Value>) -> serde_json::Value {
        json!({ "documents": docs })
    }

    pub fn inserted(id: &str) -> serde_json::Value {
        json!({ "insertedId": id })
    }

    pub fn updated(matched: u64, modified: u64) -> serde_json::Value {
        json!({ "matchedCount": matched, "modifiedCount": modified })
    }
}
