//! Agent server HTTP client

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Client for the agent backend's HTTP API
pub struct AgentClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    input_text: &'a str,
}

impl AgentClient {
    /// Create a new client with timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback if config fails

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Launch a run and return its identifier.
    ///
    /// The response body carries `run_id` either at the top level or
    /// inside a `data` envelope, depending on the server version.
    pub async fn launch_run(&self, input_text: &str) -> Result<String> {
        let url = format!("{}/agent/run", self.base_url);

        debug!("Launching agent run against {}", url);

        let response = match self
            .client
            .post(&url)
            .json(&RunRequest { input_text })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!("Agent server HTTP error: {}", e);
                return Err(e).context("Failed to connect to agent server");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Agent server error: {} - {}", status, body);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse run response")?;

        let run_id = body
            .get("run_id")
            .or_else(|| body.get("data").and_then(|d| d.get("run_id")))
            .and_then(|v| v.as_str())
            .context("Run response missing run_id")?
            .to_string();

        info!("Launched run: {}", run_id);

        Ok(run_id)
    }

    /// Check if the agent server is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Agent server health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
