//! Dependency health monitoring and aggregation for long-running services.
//!
//! Register the services an application depends on as [`Component`]s, let
//! each one be re-checked on its own interval in the background, and expose
//! the aggregated [`Status`] through the `/health` and `/metrics` endpoints
//! for readiness probes and metrics scrapers.

pub mod check;
pub mod checks;
pub mod component;
pub mod health;
pub mod metrics;
pub mod status;

#[cfg(feature = "server")]
pub mod error;
#[cfg(feature = "server")]
pub mod server;

pub use check::{check_fn, fallible, Check};
pub use component::{Component, ComponentBuilder, ComponentStatus};
pub use health::Health;
pub use status::Status;

#[cfg(feature = "server")]
pub use error::ServerError;
#[cfg(feature = "server")]
pub use server::{router, HealthResponse, HealthServer, HealthServerBuilder};
