use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::{DocumentStore, FindOptions, UpdateOutcome};
use crate::error::StoreError;

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Fail-soft access to the document store: every operation is checked against
/// an active connection first, then retried on failure up to [`MAX_ATTEMPTS`]
/// total attempts with a fixed [`RETRY_DELAY`] between them. The final
/// failure carries the underlying cause and maps to a 503 at the HTTP edge.
///
/// Retries are blind: an insert that reached the store but timed out on the
/// way back is submitted again and can land twice. Writes in this codebase
/// therefore carry caller-generated UUID ids and use absolute
/// `$set`/`$addToSet` updates, which bounds the damage to a duplicate row
/// under the same key. Operations passed to [`StoreGateway::execute`] must be
/// safe to repeat.
///
/// Worst case this blocks the calling task for ~2 seconds (two inter-attempt
/// delays) before surfacing `Unavailable`.
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<DocumentStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        if !self.store.is_connected() {
            warn!("Store operation rejected: no active connection");
            return Err(StoreError::NotConnected);
        }

        let mut last_error: Option<StoreError> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Store operation recovered on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        "Store operation failed (attempt {}/{}): {}",
                        attempt, MAX_ATTEMPTS, err
                    );
                    last_error = Some(err);
                    if attempt < MAX_ATTEMPTS {
                        sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(StoreError::Unavailable {
            attempts: MAX_ATTEMPTS,
            cause: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    pub async fn find_one<T>(&self, collection: &str, filter: Value) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.execute(|| self.store.find_one(collection, filter.clone()))
            .await
    }

    pub async fn find<T>(
        &self,
        collection: &str,
        filter: Value,
        options: FindOptions,
    ) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        self.execute(|| self.store.find(collection, filter.clone(), options.clone()))
            .await
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        self.execute(|| self.store.insert_one(collection, document.clone()))
            .await
    }

    pub async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.execute(|| {
            self.store
                .update_one(collection, filter.clone(), update.clone())
        })
        .await
    }

    pub async fn update_many(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.execute(|| {
            self.store
                .update_many(collection, filter.clone(), update.clone())
        })
        .await
    }
}
