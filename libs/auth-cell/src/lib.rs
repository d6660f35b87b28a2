//! Account registration, login and session lifecycle for patients and
//! doctors. Passwords are hashed with argon2; sessions live in the shared
//! in-process store and travel as signed bearer tokens.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AuthError, LoginRequest, RegisterRequest};
pub use router::auth_routes;
pub use services::account::AccountService;
