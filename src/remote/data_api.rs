//! Reqwest-backed client for the hosted document Data API.
//!
//! Every action is a JSON POST to `{base_url}/action/{action}` authenticated with the
//! `api-key` header. Without a key the client never builds a request.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dto::{
    ActionRequest, DeleteBody, DeleteSummary, FindBody, FindResponse, IdFilter, UpsertBody,
    UpsertSummary,
};
use super::{RemoteError, RemoteOutcome, RemoteStore};
use crate::config::RemoteConfig;
use crate::models::{CollectionName, Record};

const API_KEY_HEADER: &str = "api-key";

/// Data API adapter bound to one data source and database.
pub struct DataApiClient {
    client: Client,
    config: RemoteConfig,
}

impl DataApiClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    async fn request<B, R>(
        &self,
        action: &'static str,
        collection: CollectionName,
        body: B,
    ) -> RemoteOutcome<R>
    where
        B: Serialize + Send,
        R: DeserializeOwned,
    {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return RemoteOutcome::Unconfigured;
        };

        match self.send(action, collection, body, api_key).await {
            Ok(decoded) => RemoteOutcome::Done(decoded),
            Err(e) => {
                tracing::error!(collection = %collection, "Remote {} failed: {}", action, e);
                RemoteOutcome::Failed(e)
            }
        }
    }

    async fn send<B, R>(
        &self,
        action: &str,
        collection: CollectionName,
        body: B,
        api_key: &str,
    ) -> Result<R, RemoteError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request = ActionRequest {
            data_source: &self.config.data_source,
            database: &self.config.database,
            collection: collection.as_str(),
            body,
        };

        let response = self
            .client
            .post(format!("{}/action/{}", self.config.base_url, action))
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for DataApiClient {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn find_all(&self, collection: CollectionName) -> RemoteOutcome<Vec<Record>> {
        match self
            .request::<_, FindResponse>("find", collection, FindBody::all())
            .await
        {
            RemoteOutcome::Done(response) => RemoteOutcome::Done(response.into_records()),
            RemoteOutcome::Unconfigured => RemoteOutcome::Unconfigured,
            RemoteOutcome::Failed(e) => RemoteOutcome::Failed(e),
        }
    }

    async fn upsert_one(
        &self,
        collection: CollectionName,
        id: &str,
        record: &Record,
    ) -> RemoteOutcome<UpsertSummary> {
        self.request("updateOne", collection, UpsertBody::new(id, record))
            .await
    }

    async fn delete_one(
        &self,
        collection: CollectionName,
        id: &str,
    ) -> RemoteOutcome<DeleteSummary> {
        self.request(
            "deleteOne",
            collection,
            DeleteBody {
                filter: IdFilter { id },
            },
        )
        .await
    }
}
