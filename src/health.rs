use crate::component::{
    Component, ComponentState, ComponentStatus, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, UNNAMED,
};
use crate::status::Status;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Monitors the health of the services/components an application depends on
/// and aggregates their statuses into one overall application status.
///
/// Components are registered up front; the registry is then typically shared
/// behind an `Arc` with the exposition endpoints. Each continuously
/// monitored component gets its own background task, and status queries are
/// pure reads over the cached per-component statuses.
pub struct Health {
    components: Vec<Arc<ComponentState>>,
    cancel: CancellationToken,
    started_at: Instant,
}

impl Health {
    /// Create an empty registry. The construction time is the anchor for
    /// uptime reporting, so independent instances report independent uptimes.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            cancel: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// Register a component to be monitored and considered in the overall
    /// health of the application.
    ///
    /// Applies defaults before admitting the component: a blank name becomes
    /// `"unnamed"`, the timeout defaults to 5s, the interval to 15s, and an
    /// interval that does not exceed the timeout is raised to `timeout + 1s`.
    /// Unless the component was built with
    /// [`on_demand`](crate::ComponentBuilder::on_demand), a background
    /// monitor loop is spawned immediately, so registration must happen
    /// inside a tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if the component has no check. A component without a check
    /// capability is a programming defect, not a runtime condition.
    pub fn register(&mut self, component: Component) {
        let state = Arc::new(self.admit(component));
        if state.monitored {
            tokio::spawn(Arc::clone(&state).monitor(self.cancel.child_token()));
        }
        info!(
            "Registered health component {} (critical: {})",
            state.name, state.critical
        );
        self.components.push(state);
    }

    fn admit(&self, component: Component) -> ComponentState {
        let Some(check) = component.check else {
            panic!(
                "health component {:?} registered without a check",
                component.name
            );
        };

        let name = if component.name.trim().is_empty() {
            UNNAMED.to_string()
        } else {
            component.name
        };
        let timeout = component.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut interval = component.interval.unwrap_or(DEFAULT_INTERVAL);
        if timeout >= interval {
            interval = timeout + Duration::from_secs(1);
            warn!(
                "Component {} has timeout >= interval; raising interval to {:?}",
                name, interval
            );
        }

        ComponentState::new(
            name,
            component.critical,
            timeout,
            interval,
            component.monitored,
            check,
        )
    }

    /// Overall status of the application.
    ///
    /// Pure max-severity roll-up over the cached component statuses: a
    /// critical component that is down forces down; a non-critical down or
    /// any degraded component contributes degraded; down is sticky and can
    /// never be reverted by a milder finding. No I/O, never suspends.
    pub fn status(&self) -> Status {
        self.components
            .iter()
            .map(|component| match (component.status(), component.critical) {
                (Status::Down, true) => Status::Down,
                (Status::Down, false) => Status::Degraded,
                (status, _) => status,
            })
            .max()
            .unwrap_or(Status::Up)
    }

    /// Snapshot of every component's status, in registration order.
    pub fn component_statuses(&self) -> Vec<ComponentStatus> {
        self.components
            .iter()
            .map(|component| component.snapshot())
            .collect()
    }

    /// Re-evaluate every on-demand component now, concurrently.
    ///
    /// Continuously monitored components are left to their loops. Each check
    /// is bounded by its own timeout; wrap the call in
    /// `tokio::time::timeout` to impose a tighter caller deadline, which
    /// drops the remaining in-flight checks.
    pub async fn evaluate(&self) {
        let pending = self
            .components
            .iter()
            .filter(|component| !component.monitored)
            .map(|component| component.evaluate());
        join_all(pending).await;
    }

    /// Wall-clock time since this registry was constructed.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stop monitoring all components.
    ///
    /// Idempotent and non-blocking: in-flight checks are dropped at their
    /// next suspension point and no further status updates occur. Status
    /// queries keep returning the last-known values, so a dependency that
    /// went dark is still reported by its last observation.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Health {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering};

    fn fixed(name: &str, critical: bool, status: Status) -> Component {
        Component::builder(name)
            .critical(critical)
            .on_demand()
            .check_fn(move || async move { status })
            .build()
    }

    async fn registry(components: Vec<Component>) -> Health {
        let mut health = Health::new();
        for component in components {
            health.register(component);
        }
        health.evaluate().await;
        health
    }

    /// The stepwise precedence rule, spelled out the long way, used as the
    /// oracle for the max-severity roll-up.
    fn stepwise(components: &[(bool, Status)]) -> Status {
        let mut overall = Status::Up;
        for (critical, status) in components {
            if *status == Status::Down && *critical {
                overall = Status::Down;
            }
            if *status == Status::Down && !critical && overall != Status::Down {
                overall = Status::Degraded;
            }
            if *status == Status::Degraded && overall != Status::Down {
                overall = Status::Degraded;
            }
        }
        overall
    }

    const STATUSES: [Status; 3] = [Status::Up, Status::Degraded, Status::Down];
    const FLAGS: [bool; 2] = [false, true];

    #[tokio::test]
    async fn aggregation_matches_stepwise_rule_for_two_components() {
        for a_status in STATUSES {
            for a_critical in FLAGS {
                for b_status in STATUSES {
                    for b_critical in FLAGS {
                        let inputs = [(a_critical, a_status), (b_critical, b_status)];
                        let health = registry(vec![
                            fixed("a", a_critical, a_status),
                            fixed("b", b_critical, b_status),
                        ])
                        .await;
                        assert_eq!(
                            health.status(),
                            stepwise(&inputs),
                            "mismatch for {:?}",
                            inputs
                        );
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn aggregation_matches_stepwise_rule_for_three_components() {
        for a_status in STATUSES {
            for a_critical in FLAGS {
                for b_status in STATUSES {
                    for b_critical in FLAGS {
                        for c_status in STATUSES {
                            for c_critical in FLAGS {
                                let inputs = [
                                    (a_critical, a_status),
                                    (b_critical, b_status),
                                    (c_critical, c_status),
                                ];
                                let health = registry(vec![
                                    fixed("a", a_critical, a_status),
                                    fixed("b", b_critical, b_status),
                                    fixed("c", c_critical, c_status),
                                ])
                                .await;
                                assert_eq!(
                                    health.status(),
                                    stepwise(&inputs),
                                    "mismatch for {:?}",
                                    inputs
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn empty_registry_is_up() {
        let health = Health::new();
        assert_eq!(health.status(), Status::Up);
        assert!(health.component_statuses().is_empty());
    }

    #[tokio::test]
    async fn all_up_yields_up() {
        let health = registry(vec![
            fixed("redis", false, Status::Up),
            fixed("mongo", true, Status::Up),
        ])
        .await;
        assert_eq!(health.status(), Status::Up);
    }

    #[tokio::test]
    async fn critical_down_dominates_everything() {
        for other in STATUSES {
            for other_critical in FLAGS {
                let health = registry(vec![
                    fixed("mongo", true, Status::Down),
                    fixed("redis", other_critical, other),
                ])
                .await;
                assert_eq!(health.status(), Status::Down);
            }
        }
    }

    #[tokio::test]
    async fn non_critical_down_yields_degraded() {
        let health = registry(vec![
            fixed("redis", false, Status::Down),
            fixed("mongo", true, Status::Up),
        ])
        .await;
        assert_eq!(health.status(), Status::Degraded);
    }

    #[tokio::test]
    async fn degraded_component_yields_degraded() {
        let health = registry(vec![
            fixed("redis", false, Status::Degraded),
            fixed("mongo", true, Status::Up),
        ])
        .await;
        assert_eq!(health.status(), Status::Degraded);
    }

    #[tokio::test]
    async fn down_is_sticky_across_components() {
        // A later degraded finding must not soften an earlier critical down.
        let health = registry(vec![
            fixed("a", true, Status::Down),
            fixed("b", true, Status::Degraded),
        ])
        .await;
        assert_eq!(health.status(), Status::Down);
    }

    #[tokio::test]
    async fn component_statuses_preserve_registration_order() {
        let health = registry(vec![
            fixed("redis", false, Status::Up),
            fixed("mongo", true, Status::Down),
        ])
        .await;
        let statuses = health.component_statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "redis");
        assert!(!statuses[0].critical);
        assert_eq!(statuses[0].status, Status::Up);
        assert_eq!(statuses[1].name, "mongo");
        assert!(statuses[1].critical);
        assert_eq!(statuses[1].status, Status::Down);
        assert_eq!(health.status(), Status::Down);
    }

    #[tokio::test]
    async fn blank_name_gets_sentinel() {
        let health = registry(vec![fixed("   ", false, Status::Up)]).await;
        assert_eq!(health.component_statuses()[0].name, "unnamed");
    }

    #[tokio::test]
    async fn defaults_applied_at_registration() {
        let mut health = Health::new();
        health.register(
            Component::builder("redis")
                .on_demand()
                .check_fn(|| async { Status::Up })
                .build(),
        );
        assert_eq!(health.components[0].timeout, Duration::from_secs(5));
        assert_eq!(health.components[0].interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn interval_raised_above_timeout() {
        let mut health = Health::new();
        health.register(
            Component::builder("redis")
                .on_demand()
                .timeout(Duration::from_secs(10))
                .interval(Duration::from_secs(10))
                .check_fn(|| async { Status::Up })
                .build(),
        );
        assert_eq!(health.components[0].interval, Duration::from_secs(11));
    }

    #[tokio::test]
    #[should_panic(expected = "registered without a check")]
    async fn register_without_check_panics() {
        let mut health = Health::new();
        health.register(Component::builder("redis").build());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_freezes_last_known_status() {
        let desired = Arc::new(AtomicU8::new(Status::Down.severity()));
        let source = Arc::clone(&desired);

        let mut health = Health::new();
        health.register(
            Component::builder("redis")
                .critical(true)
                .timeout(Duration::from_millis(100))
                .interval(Duration::from_millis(500))
                .check_fn(move || {
                    let source = Arc::clone(&source);
                    async move { Status::from_severity(source.load(Ordering::Relaxed)) }
                })
                .build(),
        );

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(health.status(), Status::Down);

        health.shutdown();
        // Idempotent.
        health.shutdown();

        // The underlying dependency "recovers", but monitoring has stopped:
        // the last observation stays frozen.
        desired.store(Status::Up.severity(), Ordering::Relaxed);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(health.status(), Status::Down);
        assert_eq!(health.component_statuses()[0].status, Status::Down);
    }

    #[tokio::test(start_paused = true)]
    async fn evaluate_skips_monitored_components() {
        let mut health = Health::new();
        health.register(
            Component::builder("monitored")
                .interval(Duration::from_secs(60))
                .check_fn(|| async { Status::Down })
                .build(),
        );
        health.register(
            Component::builder("on-demand")
                .on_demand()
                .check_fn(|| async { Status::Degraded })
                .build(),
        );

        health.evaluate().await;
        let statuses = health.component_statuses();
        // The monitored component has not ticked yet and evaluate() must not
        // touch it; the on-demand one was refreshed.
        assert_eq!(statuses[0].status, Status::Up);
        assert_eq!(statuses[1].status, Status::Degraded);
    }

    #[tokio::test]
    async fn uptime_advances() {
        let health = Health::new();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(health.uptime() >= Duration::from_millis(10));
    }
}
