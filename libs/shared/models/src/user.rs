use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

// ===== USER RECORD =====

/// Stored user document: a common core plus a role-tagged payload. The
/// `user_type` tag selects the variant, so patient-only and doctor-only
/// fields can never appear on the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        match self.profile {
            RoleProfile::Patient(_) => Role::Patient,
            RoleProfile::Doctor(_) => Role::Doctor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "snake_case")]
pub enum RoleProfile {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub experience: Option<u32>,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}
