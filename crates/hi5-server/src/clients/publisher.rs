use reqwest::Client;
use tracing::info;

use crate::domain::MessagePayload;
use crate::error::{AppError, Result};

/// Delivers messages to a slash command's `response_url`.
#[derive(Clone)]
pub struct Publisher {
    client: Client,
}

impl Publisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn publish(&self, response_url: &str, payload: &MessagePayload) -> Result<()> {
        let response = self
            .client
            .post(response_url)
            .json(payload)
            .send()
            .await
            .map_err(AppError::Publish)?;

        let status = response.status();
        response.error_for_status().map_err(AppError::Publish)?;

        info!(status = %status, blocks = payload.blocks.len(), "message published");
        Ok(())
    }
}
