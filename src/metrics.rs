use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::error;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether metrics are recorded. Fixed by the first call to
/// [`init_metrics`], otherwise read from `OBSERVABILITY_ENABLED`.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task.
/// Returns None if observability is disabled or the recorder cannot be
/// installed.
pub fn init_metrics(enabled: bool) -> Option<PrometheusHandle> {
    let _ = OBSERVABILITY_ENABLED.set(enabled);
    if !is_observability_enabled() {
        return None;
    }

    let builder = match PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
        ],
    ) {
        Ok(builder) => builder,
        Err(e) => {
            error!(error = %e, "Failed to set histogram buckets");
            return None;
        }
    };

    let handle = match builder.install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

/// Metrics middleware to track HTTP requests
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router serving the Prometheus exposition on `GET /metrics`.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// `outcome` is one of `success`, `failure` or `bad_code`.
pub fn track_admin_login(outcome: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("admin_logins_total", "outcome" => outcome).increment(1);
}

pub fn track_admin_created() {
    if !is_observability_enabled() {
        return;
    }
    counter!("admins_created_total").increment(1);
}

pub fn track_class_created() {
    if !is_observability_enabled() {
        return;
    }
    counter!("classes_created_total").increment(1);
}

pub fn track_teacher_created() {
    if !is_observability_enabled() {
        return;
    }
    counter!("teachers_created_total").increment(1);
}

pub fn track_users_deleted(count: u64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("users_deleted_total").increment(count);
}
