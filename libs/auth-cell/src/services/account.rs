use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::{collections, StoreError, StoreGateway};
use shared_models::{DoctorProfile, PatientProfile, Role, RoleProfile, User, UserStatus};

use crate::models::{AuthError, RegisterRequest};
use crate::services::password;

pub struct AccountService {
    gateway: StoreGateway,
}

impl AccountService {
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    /// Creates a user record after checking the email is unused. Emails are
    /// unique across both roles, so a doctor cannot register with a
    /// patient's address. Doctors come out of registration verified.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let email = required(&request.email, "email")?;
        let password = required(&request.password, "password")?;
        let name = required(&request.name, "name")?;
        let user_type = required(&request.user_type, "user_type")?;
        let role: Role = user_type.parse().map_err(|_| AuthError::InvalidUserType)?;

        let existing: Option<serde_json::Value> = self
            .gateway
            .find_one(collections::USERS, json!({ "email": email }))
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = password::hash_password(password).map_err(|e| AuthError::Hash {
            message: e.to_string(),
        })?;

        let profile = match role {
            Role::Patient => RoleProfile::Patient(PatientProfile {
                age: request.age,
                gender: request.gender.clone(),
                phone: request.phone.clone(),
            }),
            Role::Doctor => RoleProfile::Doctor(DoctorProfile {
                specialization: request.specialization.clone(),
                license_number: request.license_number.clone(),
                experience: request.experience,
                verified: true,
            }),
        };

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            profile,
            status: UserStatus::Active,
            created_at: Utc::now(),
        };

        let document = serde_json::to_value(&user).map_err(StoreError::from)?;
        self.gateway
            .insert_one(collections::USERS, document)
            .await?;

        info!(user_id = %user.id, role = %role, "registered new user");
        Ok(user)
    }

    /// Looks the user up by email and checks the password. Unknown email and
    /// wrong password collapse into the same `InvalidCredentials`, so the
    /// response never confirms whether an address is registered. An
    /// undecodable stored hash is treated the same way (and logged).
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user: Option<User> = self
            .gateway
            .find_one(collections::USERS, json!({ "email": email }))
            .await?;

        let user = user.ok_or(AuthError::InvalidCredentials)?;

        match password::verify_password(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                warn!(user_id = %user.id, "stored password hash unusable: {}", e);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, AuthError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::MissingField { field }),
    }
}
