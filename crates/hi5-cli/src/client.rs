use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};

use hi5_server::api::routes::COMMAND_PATH;

use crate::config::Config;

/// Talks to a running hi5 server the way the chat platform does.
pub struct WebhookClient {
    client: Client,
    base_url: String,
    token: String,
}

/// Status and inline body text of a webhook call.
pub struct WebhookReply {
    pub status: StatusCode,
    pub body: String,
}

impl WebhookClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.server.trim_end_matches('/').to_string(),
            token: config.token.clone().unwrap_or_default(),
        }
    }

    pub async fn invoke(&self, text: &str, user_name: &str, response_url: &str) -> Result<WebhookReply> {
        let url = format!("{}{}", self.base_url, COMMAND_PATH);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("token", self.token.as_str()),
                ("command", "/hi5"),
                ("user_name", user_name),
                ("text", text),
                ("response_url", response_url),
            ])
            .send()
            .await
            .context("request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read response")?;
        Ok(WebhookReply { status, body })
    }
}
