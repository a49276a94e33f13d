use crate::component::ComponentStatus;
use crate::error::{Result, ServerError};
use crate::health::Health;
use crate::metrics;
use crate::status::Status;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// JSON payload returned by the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: Status,
    pub uptime: String,
    pub components: Vec<ComponentStatus>,
}

/// Handler for the health query endpoint.
///
/// Returns the overall status, process uptime, and the per-component
/// snapshot. Up and degraded map to 200 OK so orchestrators keep routing
/// traffic to a degraded-but-functional instance; down maps to 503.
pub async fn health_handler(State(health): State<Arc<Health>>) -> impl IntoResponse {
    let status = health.status();
    let body = HealthResponse {
        status,
        uptime: format_uptime(health.uptime()),
        components: health.component_statuses(),
    };
    (transport_code(status), Json(body))
}

/// Handler for the Prometheus scrape endpoint. Gauges are recomputed from
/// the cached statuses on every pull.
pub async fn metrics_handler(State(health): State<Arc<Health>>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics::render(&health),
    )
}

/// Build a router exposing `/health` and `/metrics` for the given registry.
pub fn router(health: Arc<Health>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(health)
}

fn transport_code(status: Status) -> StatusCode {
    match status {
        Status::Up | Status::Degraded => StatusCode::OK,
        Status::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Standalone HTTP server for the health and metrics endpoints.
///
/// Applications embedding the endpoints into an existing router should use
/// [`router`] (or the handlers directly) instead.
pub struct HealthServer {
    pub(crate) ip: String,
    pub(crate) port: u16,
    pub(crate) health: Arc<Health>,
}

impl HealthServer {
    /// Bind and serve until the process exits.
    pub async fn start(&self) -> Result<()> {
        let addr = format!("{}:{}", self.ip, self.port);

        let listener =
            tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| ServerError::BindFailed {
                    address: addr.clone(),
                    source: e,
                })?;

        info!("Health server listening on {}", addr);

        axum::serve(listener, router(Arc::clone(&self.health)))
            .await
            .map_err(|e| ServerError::Terminated { source: e })?;

        Ok(())
    }
}

/// Builder for [`HealthServer`].
pub struct HealthServerBuilder {
    ip: Option<String>,
    port: Option<u16>,
    health: Option<Arc<Health>>,
}

impl HealthServerBuilder {
    pub fn new() -> Self {
        Self {
            ip: None,
            port: None,
            health: None,
        }
    }

    /// Address to bind to. Defaults to `0.0.0.0`.
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Port to bind to. Defaults to 9090.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The registry to expose. Required.
    pub fn health(mut self, health: Arc<Health>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn build(self) -> Result<HealthServer> {
        let health = self.health.ok_or_else(|| ServerError::Config {
            message: "a Health registry is required".to_string(),
        })?;
        Ok(HealthServer {
            ip: self.ip.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(9090),
            health,
        })
    }
}

impl Default for HealthServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
