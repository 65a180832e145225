use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{Business, SearchQuery, SearchResponse};
use crate::error::{AppError, Result};

pub const RESULT_LIMIT: u32 = 5;

/// Business search backed by the Yelp Fusion `businesses/search` endpoint.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, &config.search_api_base, &config.search_api_key)
    }

    /// Top rated businesses for `query`, in the order the API ranks them.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>> {
        let radius = query.radius.to_string();
        let limit = RESULT_LIMIT.to_string();
        let mut params = vec![
            ("location", query.location.as_str()),
            ("radius", radius.as_str()),
            ("categories", query.category.as_str()),
            ("limit", limit.as_str()),
            ("sort_by", "rating"),
        ];
        if let Some(term) = &query.term {
            params.push(("term", term.as_str()));
        }

        debug!(category = %query.category, location = %query.location, radius = query.radius, "calling search api");

        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "search api unreachable");
                AppError::Upstream(e)
            })?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            warn!(status = %status, "search api returned error status");
            AppError::Upstream(e)
        })?;

        let body: SearchResponse = response.json().await.map_err(|e| {
            warn!(status = %status, error = %e, "search api response could not be decoded");
            AppError::Upstream(e)
        })?;

        info!(category = %query.category, results = body.businesses.len(), "search completed");
        Ok(body.businesses)
    }
}
