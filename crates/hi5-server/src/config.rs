use anyhow::{bail, Context, Result};
use std::env;

pub const DEFAULT_SEARCH_API_BASE: &str = "https://api.yelp.com/v3/businesses/search";

/// Only webhook calls from this origin are allowed by browsers.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "hooks.slack.com";

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub slack_token: String,
    pub search_api_key: String,
    pub search_api_base: String,
    pub allowed_origin: String,
    pub http_timeout_secs: u64,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            slack_token: required("SLACK_TOKEN")?,
            search_api_key: required("API_KEY")?,
            search_api_base: env::var("SEARCH_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SEARCH_API_BASE.into()),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.into()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        })
    }

    /// Compares an inbound webhook token against the shared secret without
    /// short-circuiting on the first differing byte.
    pub fn verify_token(&self, token: &str) -> bool {
        constant_time_eq(self.slack_token.as_bytes(), token.as_bytes())
    }
}

fn required(key: &str) -> Result<String> {
    let value = env::var(key).with_context(|| format!("{key} required"))?;
    if value.is_empty() {
        bail!("{key} must not be empty");
    }
    Ok(value)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}
