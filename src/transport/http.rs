use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::Transport;
use crate::consts::DEFAULT_CONNECT_TIMEOUT;
use crate::protocol::log_payload;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Limit on establishing a connection. The exchange itself has no
    /// deadline; the counterpart answers with a timeout sentinel instead.
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Plain-text POSTs to a fixed endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, config: HttpConfig) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid endpoint URL: {endpoint}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("unsupported endpoint scheme: {}", endpoint.scheme());
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, body: String) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", "text/plain")
            .body(body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("endpoint returned {}: {}", status, text);
        }

        resp.text().await.context("failed to read response body")
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, payload: &str) -> Result<String> {
        self.post(payload.to_string()).await
    }

    async fn log(&self, message: &str) -> Result<()> {
        self.post(log_payload(message)).await?;
        Ok(())
    }
}
