pub mod auth;
pub mod error;
pub mod records;
pub mod user;

pub use auth::*;
pub use error::*;
pub use records::*;
pub use user::*;
