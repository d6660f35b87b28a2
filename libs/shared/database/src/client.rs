use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::StoreError;

/// HTTP client for the document-store gateway. Operations are posted as JSON
/// action bodies (`findOne`, `find`, `insertOne`, `updateOne`, `updateMany`)
/// to `{base}/action/{verb}` with an api-key header.
pub struct DocumentStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<Value>,
    pub limit: Option<i64>,
    pub projection: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Deserialize)]
struct FindOneResponse {
    document: Option<Value>,
}

#[derive(Deserialize)]
struct FindResponse {
    documents: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertOneResponse {
    inserted_id: String,
}

impl DocumentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::from_parts(config.docstore_url.clone(), config.docstore_api_key.clone())
    }

    pub fn from_parts(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Connection probe consulted by the gateway before every operation.
    pub fn is_connected(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| StoreError::NotConnected)?,
        );
        Ok(headers)
    }

    async fn action<T>(&self, verb: &str, body: Value) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/action/{}", self.base_url, verb);
        debug!("Store action {} -> {}", verb, url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Store API error ({}): {}", status, message);
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value = response.json::<Value>().await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn find_one<T>(&self, collection: &str, filter: Value) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let response: FindOneResponse = self
            .action(
                "findOne",
                json!({ "collection": collection, "filter": filter }),
            )
            .await?;
        match response.document {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
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
        let mut body = json!({ "collection": collection, "filter": filter });
        if let Some(sort) = options.sort {
            body["sort"] = sort;
        }
        if let Some(limit) = options.limit {
            body["limit"] = json!(limit);
        }
        if let Some(projection) = options.projection {
            body["projection"] = projection;
        }

        let response: FindResponse = self.action("find", body).await?;
        response
            .documents
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let response: InsertOneResponse = self
            .action(
                "insertOne",
                json!({ "collection": collection, "document": document }),
            )
            .await?;
        Ok(response.inserted_id)
    }

    pub async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.action(
            "updateOne",
            json!({ "collection": collection, "filter": filter, "update": update }),
        )
        .await
    }

    pub async fn update_many(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.action(
            "updateMany",
            json!({ "collection": collection, "filter": filter, "update": update }),
        )
        .await
    }

    /// Cheap reachability probe for health reporting.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let _: FindOneResponse = self
            .action(
                "findOne",
                json!({
                    "collection": "users",
                    "filter": {},
                    "projection": { "id": 1 },
                }),
            )
            .await?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
