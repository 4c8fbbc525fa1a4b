//! HTTP datastore client
//!
//! Stores the alarm time with `PUT <endpoint>`, header `X-Auth-Token` and a
//! JSON body `{"value": "<timestamp>"}`.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::Datastore;
use crate::error::{FireSrvError, Result};

pub const AUTH_HEADER: &str = "X-Auth-Token";

pub struct HttpDatastore {
    http: reqwest::Client,
}

impl HttpDatastore {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
    async fn put_timestamp(&self, endpoint: &str, auth_token: &str, timestamp: &str) -> Result<()> {
        debug!("PUT {}", endpoint);
        let response = self
            .http
            .put(endpoint)
            .header(AUTH_HEADER, auth_token)
            .json(&json!({ "value": timestamp }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FireSrvError::DatastoreError(format!(
                "{} returned {}",
                endpoint, status
            )));
        }
        Ok(())
    }
}
