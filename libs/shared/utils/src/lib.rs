pub mod extractor;
pub mod session;
pub mod test_utils;
pub mod token;

pub use extractor::{auth_middleware, AuthState};
pub use session::{Session, SessionStore, SESSION_LIFETIME_DAYS};
pub use token::{issue_token, verify_token};
