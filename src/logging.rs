use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::io;
use std::time::Instant;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Level and message for a finished request. A plain 400 is an ordinary
/// input rejection and stays at info.
fn completion_level(status: StatusCode) -> (Level, &'static str) {
    match status.as_u16() {
        400 => (Level::INFO, "Request rejected"),
        401..=499 => (Level::WARN, "Client error"),
        500..=599 => (Level::ERROR, "Server error"),
        _ => (Level::INFO, "Request completed"),
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status();

    let (level, message) = completion_level(status);
    if level == Level::ERROR {
        error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "{message}"
        );
    } else if level == Level::WARN {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "{message}"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "{message}"
        );
    }

    response
}

/// Console filter: `RUST_LOG`, then `LOG_LEVEL` applied to this crate.
fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(format!(
            "{crate}={level},labsys_db={level},tower_http=warn",
            crate = env!("CARGO_CRATE_NAME")
        ))
    })
}

/// Sets up the console, error file and JSON file layers. Files roll daily
/// under `log_dir`.
pub fn init_tracing(log_dir: &str) -> io::Result<()> {
    use std::fs;
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    fs::create_dir_all(log_dir)?;

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter());

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "labsys.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    // Structured logs for ingestion
    let json_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "labsys.json");

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    info!(log_dir, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_params_is_not_logged_as_client_error() {
        assert_eq!(
            completion_level(StatusCode::BAD_REQUEST),
            (Level::INFO, "Request rejected")
        );
    }

    #[test]
    fn test_completion_levels() {
        assert_eq!(completion_level(StatusCode::OK).0, Level::INFO);
        assert_eq!(completion_level(StatusCode::UNAUTHORIZED).0, Level::WARN);
        assert_eq!(completion_level(StatusCode::FORBIDDEN).0, Level::WARN);
        assert_eq!(completion_level(StatusCode::NOT_FOUND).0, Level::WARN);
        assert_eq!(
            completion_level(StatusCode::INTERNAL_SERVER_ERROR),
            (Level::ERROR, "Server error")
        );
    }
}
