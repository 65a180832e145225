pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;

use crate::api::routes;
use crate::clients::{Publisher, SearchClient};
use crate::config::Config;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub allowed_origin: HeaderValue,
    pub search: SearchClient,
    pub publisher: Publisher,
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let allowed_origin = HeaderValue::from_str(&config.allowed_origin)
            .context("ALLOWED_ORIGIN is not a valid header value")?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let state = Arc::new(AppState {
            search: SearchClient::from_config(http_client.clone(), &config),
            publisher: Publisher::new(http_client),
            allowed_origin,
            config,
        });

        Ok(Self { state })
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}
