//! Remote document store reached over HTTP.
//!
//! Records are POSTed to `{base_url}/responses.json` and
//! `{base_url}/scores.json`, the layout of a Firebase Realtime Database REST
//! endpoint. The server fills in `server_timestamp` from the `{".sv":
//! "timestamp"}` placeholder.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use quizzy_core::traits::{ResponseRecord, ResultSink, ScoreRecord};

use crate::error::StoreError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP result store.
pub struct HttpStore {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    record: &'a T,
    server_timestamp: ServerValue,
}

#[derive(Serialize)]
struct ServerValue {
    #[serde(rename = ".sv")]
    sv: &'static str,
}

impl HttpStore {
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&format!("{}/{collection}.json", self.base_url))
            .map_err(|e| StoreError::Network(format!("invalid store URL {}: {e}", self.base_url)))?;
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    #[instrument(skip(self, record), fields(base_url = %self.base_url))]
    async fn post<T: Serialize + Sync>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        let body = Stamped {
            record,
            server_timestamp: ServerValue { sv: "timestamp" },
        };

        let response = self
            .client
            .post(self.collection_url(collection)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Network(format!(
                        "request timed out after {DEFAULT_TIMEOUT_SECS}s"
                    ))
                } else if e.is_connect() {
                    StoreError::Network(format!("store not reachable at {}", self.base_url))
                } else {
                    // The URL carries the auth token.
                    StoreError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(collection, "record stored");
        Ok(())
    }
}

#[async_trait]
impl ResultSink for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn append_response(&self, record: &ResponseRecord) -> anyhow::Result<()> {
        Ok(self.post("responses", record).await?)
    }

    async fn append_score(&self, record: &ScoreRecord) -> anyhow::Result<()> {
        Ok(self.post("scores", record).await?)
    }
}
