//! Minimal wiring: two monitored components exposed on /health and /metrics.

use std::sync::Arc;
use std::time::Duration;
use vitals::checks::http::{HttpCheck, HttpCheckConfig};
use vitals::{Component, Health, HealthServerBuilder, Status};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut health = Health::new();

    health.register(
        Component::builder("upstream-api")
            .critical(true)
            .timeout(Duration::from_secs(1))
            .interval(Duration::from_secs(5))
            .check(HttpCheck::new(HttpCheckConfig::get(
                "http://localhost:8080/ping",
            ))?)
            .build(),
    );

    health.register(
        Component::builder("cache")
            .check_fn(|| async {
                // Stand-in for a real cache probe.
                Status::Up
            })
            .build(),
    );

    let server = HealthServerBuilder::new()
        .ip("0.0.0.0")
        .port(9090)
        .health(Arc::new(health))
        .build()?;
    server.start().await?;
    Ok(())
}
