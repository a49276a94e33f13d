//! Prometheus text-format exposition of the health gauges.
//!
//! Two gauge families are exposed, both encoded 0=down, 1=degraded, 2=up:
//! - `health_status`: overall status of the application instance.
//! - `health_component_status{component="..."}`: one series per component.
//!
//! Values are recomputed from the cached statuses on every render, so each
//! scrape reflects the state at pull time.

use crate::health::Health;

/// Render the health gauges in Prometheus text format (version 0.0.4).
pub fn render(health: &Health) -> String {
    let overall = health.status();
    let components = health.component_statuses();

    let mut body = String::with_capacity(256 + components.len() * 96);

    body.push_str("# HELP health_status Overall status of the application instance. 0 is down, 1 is degraded, 2 is up.\n");
    body.push_str("# TYPE health_status gauge\n");
    body.push_str(&format!("health_status {}\n", overall.gauge_value()));

    body.push_str("# HELP health_component_status Status of the application components. 0 is down, 1 is degraded, 2 is up.\n");
    body.push_str("# TYPE health_component_status gauge\n");
    for component in components {
        body.push_str(&format!(
            "health_component_status{{component=\"{}\"}} {}\n",
            escape_label_value(&component.name),
            component.status.gauge_value()
        ));
    }

    body
}

/// Escape a label value per the Prometheus text exposition rules.
fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::status::Status;

    fn fixed(name: &str, critical: bool, status: Status) -> Component {
        Component::builder(name)
            .critical(critical)
            .on_demand()
            .check_fn(move || async move { status })
            .build()
    }

    #[tokio::test]
    async fn renders_overall_and_component_gauges() {
        let mut health = Health::new();
        health.register(fixed("redis", false, Status::Degraded));
        health.register(fixed("mongo", true, Status::Up));
        health.evaluate().await;

        let body = render(&health);
        assert!(body.contains("# TYPE health_status gauge\n"));
        assert!(body.contains("health_status 1\n"));
        assert!(body.contains("# TYPE health_component_status gauge\n"));
        assert!(body.contains("health_component_status{component=\"redis\"} 1\n"));
        assert!(body.contains("health_component_status{component=\"mongo\"} 2\n"));
    }

    #[tokio::test]
    async fn recomputed_on_every_render() {
        let mut health = Health::new();
        health.register(fixed("mongo", true, Status::Down));

        // Before evaluation the optimistic initial status is reported.
        assert!(render(&health).contains("health_status 2\n"));

        health.evaluate().await;
        let body = render(&health);
        assert!(body.contains("health_status 0\n"));
        assert!(body.contains("health_component_status{component=\"mongo\"} 0\n"));
    }

    #[tokio::test]
    async fn label_values_are_escaped() {
        let mut health = Health::new();
        health.register(fixed("we\"ird", false, Status::Up));
        health.evaluate().await;

        assert!(render(&health).contains("health_component_status{component=\"we\\\"ird\"} 2\n"));
    }
}
