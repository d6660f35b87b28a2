use serde::{Deserialize, Serialize};

use shared_database::StoreError;
use shared_models::{error::AppError, Role};

// ===== REQUESTS =====

/// Registration payload: a common core plus role-specific optionals. The
/// flat shape (rather than a nested profile object) matches what the web
/// client submits.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub user_type: Option<String>,
    // Patient fields
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    // Doctor fields
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub experience: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ===== RESPONSES =====

/// Public view of a user returned by register/login; never includes the
/// password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: Role,
}

impl From<&shared_models::User> for UserView {
    fn from(user: &shared_models::User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            user_type: user.role(),
        }
    }
}

// ===== ERROR HANDLING =====

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User already exists")]
    EmailTaken,

    // One variant for both unknown email and wrong password, so the
    // response can never reveal which part was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("user_type must be 'patient' or 'doctor'")]
    InvalidUserType,

    #[error("Password hashing failed: {message}")]
    Hash { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            AuthError::MissingField { .. } | AuthError::InvalidUserType => {
                AppError::Validation(err.to_string())
            }
            AuthError::Hash { message } => AppError::Internal(message),
            AuthError::Store(store) => store.into(),
        }
    }
}
