use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store is not connected")]
    NotConnected,

    #[error("document store unavailable after {attempts} attempts: {cause}")]
    Unavailable { attempts: u32, cause: String },

    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the fail-soft outcomes the gateway produces: no connection,
    /// or retries exhausted.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::NotConnected | StoreError::Unavailable { .. }
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotConnected => {
                AppError::Unavailable("Database connection unavailable".to_string())
            }
            StoreError::Unavailable { attempts, cause } => AppError::Unavailable(format!(
                "Database unavailable after {} attempts: {}",
                attempts, cause
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}
