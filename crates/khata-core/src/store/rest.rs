//! `TableClient` over a PostgREST-style HTTP endpoint

use async_trait::async_trait;
use khata_config::RemoteConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

use super::remote::TableClient;
use super::{StoreError, StoreResult};

/// HTTP table client authenticated with an API key
#[derive(Debug, Clone)]
pub struct RestTableClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestTableClient {
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport { message: e.to_string() })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<Response> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| StoreError::Transport { message: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        log::debug!(target: "khata::store", "Remote request failed with {}: {}", status, message);
        Err(StoreError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(response: Response) -> StoreResult<Vec<Value>> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Serialization { message: e.to_string() })
    }
}

/// PostgREST equality filter value
fn eq_filter(value: &Value) -> String {
    match value {
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn select_all(&self, table: &str) -> StoreResult<Vec<Value>> {
        let builder = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", "id.asc")]);
        Self::rows(self.send(builder).await?).await
    }

    async fn select_eq(&self, table: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>> {
        let filter = eq_filter(value);
        let builder = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*"), (field, filter.as_str()), ("order", "id.asc")]);
        Self::rows(self.send(builder).await?).await
    }

    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[row]);

        Self::rows(self.send(builder).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Serialization {
                message: format!("insert into {} returned no rows", table),
            })
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> StoreResult<()> {
        let builder = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows);
        self.send(builder).await?;
        Ok(())
    }
}
