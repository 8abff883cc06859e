use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_app, metrics_middleware};
use crate::modules::admins::init_admins_router;
use crate::modules::classes::init_classes_router;
use crate::modules::users::{init_teachers_router, init_users_router};
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

/// Builds the application. With a metrics handle, also serves `/metrics`
/// and records per-request metrics.
pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let mut app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/admin", init_admins_router())
                .nest("/class", init_classes_router())
                .nest("/teacher", init_teachers_router())
                .nest("/user", init_users_router()),
        )
        .with_state(state.clone());

    if let Some(handle) = metrics {
        app = app
            .merge(metrics_app(handle))
            .layer(middleware::from_fn(metrics_middleware));
    }

    app.layer({
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_credentials(true)
    })
    .layer(middleware::from_fn(logging_middleware))
}
