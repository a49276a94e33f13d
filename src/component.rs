use crate::check::{self, Check};
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Sentinel used when a component is registered with a blank name.
pub(crate) const UNNAMED: &str = "unnamed";

/// A single dependency to monitor: a named check with a criticality flag.
///
/// Components are built with [`Component::builder`] and handed to
/// [`Health::register`](crate::Health::register), which applies defaults and
/// takes ownership of the cached status.
pub struct Component {
    pub(crate) name: String,
    pub(crate) critical: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) interval: Option<Duration>,
    pub(crate) monitored: bool,
    pub(crate) check: Option<Arc<dyn Check>>,
}

impl Component {
    /// Start building a component with the given display name.
    ///
    /// Names should be unique; duplicates do not break aggregation but make
    /// the per-component report ambiguous.
    pub fn builder(name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder::new(name)
    }
}

/// Builder for [`Component`].
pub struct ComponentBuilder {
    name: String,
    critical: bool,
    timeout: Option<Duration>,
    interval: Option<Duration>,
    monitored: bool,
    check: Option<Arc<dyn Check>>,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            critical: false,
            timeout: None,
            interval: None,
            monitored: true,
            check: None,
        }
    }

    /// Mark the component as critical: if it goes down, the overall status
    /// is down rather than merely degraded.
    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Deadline for a single check invocation. Defaults to 5 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Interval between background re-checks. Defaults to 15 seconds and
    /// must exceed the timeout; the registry raises it to `timeout + 1s`
    /// otherwise.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Disable the background monitor loop for this component. Its status is
    /// only refreshed by [`Health::evaluate`](crate::Health::evaluate).
    pub fn on_demand(mut self) -> Self {
        self.monitored = false;
        self
    }

    /// Set the health check for the component.
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.check = Some(Arc::new(check));
        self
    }

    /// Set the health check from an async function returning a [`Status`].
    pub fn check_fn<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Status> + Send + 'static,
    {
        self.check(check::check_fn(f))
    }

    /// Set the health check from a fallible async function; `Ok` maps to up
    /// and `Err` to down.
    pub fn fallible_check<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.check(check::fallible(f))
    }

    pub fn build(self) -> Component {
        Component {
            name: self.name,
            critical: self.critical,
            timeout: self.timeout,
            interval: self.interval,
            monitored: self.monitored,
            check: self.check,
        }
    }
}

/// Snapshot of one component's identity and last-observed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: String,
    pub critical: bool,
    pub status: Status,
}

/// Shared per-component state. The cached status slot is exclusively owned
/// here: the monitor loop (or the on-demand evaluation path) is the sole
/// writer, everyone else reads through [`ComponentState::status`].
pub(crate) struct ComponentState {
    pub(crate) name: String,
    pub(crate) critical: bool,
    pub(crate) timeout: Duration,
    pub(crate) interval: Duration,
    pub(crate) monitored: bool,
    check: Arc<dyn Check>,
    status: AtomicU8,
}

impl ComponentState {
    pub(crate) fn new(
        name: String,
        critical: bool,
        timeout: Duration,
        interval: Duration,
        monitored: bool,
        check: Arc<dyn Check>,
    ) -> Self {
        Self {
            name,
            critical,
            timeout,
            interval,
            monitored,
            check,
            // Optimistically up until the first evaluation.
            status: AtomicU8::new(Status::Up.severity()),
        }
    }

    /// Last-observed status. Lock-free; safe against the single writer.
    pub(crate) fn status(&self) -> Status {
        Status::from_severity(self.status.load(Ordering::Relaxed))
    }

    pub(crate) fn snapshot(&self) -> ComponentStatus {
        ComponentStatus {
            name: self.name.clone(),
            critical: self.critical,
            status: self.status(),
        }
    }

    /// Evaluate the component's check once, bounded by its timeout, and
    /// update the cached status. Timeouts and failures become down; errors
    /// never propagate out of this path.
    pub(crate) async fn evaluate(&self) {
        let status = match tokio::time::timeout(self.timeout, self.check.status()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    "Health check for {} timed out after {:?}",
                    self.name, self.timeout
                );
                Status::Down
            }
        };

        let previous = self.status();
        if status != previous {
            info!(
                "Component {} status changed: {} -> {}",
                self.name, previous, status
            );
        }
        self.status.store(status.severity(), Ordering::Relaxed);
    }

    /// Periodic monitor loop for the component.
    ///
    /// The first check fires after one full interval, mirroring a periodic
    /// timer rather than an eager first check. Ticks are strictly
    /// sequential: a check that runs long delays the next tick instead of
    /// overlapping it. Cancellation is terminal and leaves the last-known
    /// status in place.
    pub(crate) async fn monitor(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first real check happens one interval after registration.
        ticker.tick().await;

        debug!(
            "Monitoring component {} every {:?} (timeout {:?})",
            self.name, self.interval, self.timeout
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Stopped monitoring component {}", self.name);
                    return;
                }
                _ = ticker.tick() => {
                    self.evaluate().await;
                }
            }
        }
    }
}
