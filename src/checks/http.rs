//! HTTP endpoint reachability check.

use crate::check::Check;
use crate::status::Status;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client, Method, StatusCode};
use std::time::Duration;
use tracing::warn;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration for an [`HttpCheck`].
#[derive(Debug, Clone)]
pub struct HttpCheckConfig {
    /// HTTP method to use for the request.
    pub method: Method,

    /// URL to probe.
    pub url: String,

    /// Request timeout. If the request takes longer, the check fails.
    /// Defaults to 3 seconds.
    pub timeout: Duration,

    /// Exact status code the endpoint is expected to return. When `None`,
    /// any 2xx response counts as healthy.
    pub expected_status: Option<StatusCode>,
}

impl HttpCheckConfig {
    /// Configuration for a plain GET probe of the given URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            expected_status: None,
        }
    }
}

/// Checks the health of an HTTP endpoint.
///
/// The endpoint is healthy when it answers with the expected status code
/// (any 2xx by default). Transport errors and unexpected codes map to down.
pub struct HttpCheck {
    config: HttpCheckConfig,
    client: Client,
}

impl HttpCheck {
    pub fn new(config: HttpCheckConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { config, client })
    }

    /// Use a caller-supplied client (connection pools, proxies, TLS setup).
    /// The configured timeout is not applied to the client in this case.
    pub fn with_client(config: HttpCheckConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn probe(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .request(self.config.method.clone(), &self.config.url)
            // The server doesn't need to keep the connection open for us.
            .header(header::CONNECTION, "close")
            .send()
            .await
            .context("http request failed")?;

        match self.config.expected_status {
            Some(expected) if response.status() != expected => {
                anyhow::bail!("expected status {}, got {}", expected, response.status())
            }
            None if !response.status().is_success() => {
                anyhow::bail!("unsuccessful http status code {}", response.status())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Check for HttpCheck {
    async fn status(&self) -> Status {
        match self.probe().await {
            Ok(()) => Status::Up,
            Err(e) => {
                warn!("HTTP check for {} failed: {:#}", self.config.url, e);
                Status::Down
            }
        }
    }
}
