use super::types::*;
use super::DetailsSource;
use crate::error::LookupError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for the app's details proxy (`/api/movies/details/{id}`).
pub struct DetailsApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl DetailsApi {
    pub fn new(base_url: &str, request_timeout_ms: u64, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn details_url(&self, item: &ContentItem) -> String {
        details_url(&self.base_url, item)
    }
}

fn details_url(base_url: &str, item: &ContentItem) -> String {
    format!(
        "{}/api/movies/details/{}?media_type={}",
        base_url,
        item.id,
        item.media_kind.query_value(),
    )
}

/// Decode a details body. Kept separate from the transport so it can be tested on fixtures.
pub fn parse_details(item_id: u64, body: &str) -> Result<ContentDetails, LookupError> {
    serde_json::from_str(body).map_err(|e| LookupError::Decode {
        item_id,
        message: e.to_string(),
    })
}

#[async_trait]
impl DetailsSource for DetailsApi {
    async fn fetch_details(&self, item: &ContentItem) -> Result<ContentDetails, LookupError> {
        let url = self.details_url(item);

        let mut req = self.client.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|e| LookupError::Network {
            item_id: item.id,
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupError::Http {
                item_id: item.id,
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| LookupError::Network {
            item_id: item.id,
            message: e.to_string(),
        })?;

        parse_details(item.id, &body)
    }
}
