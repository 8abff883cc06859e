use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use labsys::labsys_config::ServerConfig;
use labsys::logging::init_tracing;
use labsys::metrics::init_metrics;
use labsys::router::init_router;
use labsys::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env();
    init_tracing(&server_config.log_dir).context("failed to initialize logging")?;

    let metrics = init_metrics(server_config.observability_enabled);
    let state = AppState::from_env().await?;
    let app = init_router(state, metrics);

    let listener = tokio::net::TcpListener::bind(&server_config.addr)
        .await
        .with_context(|| format!("failed to bind {}", server_config.addr))?;

    info!(addr = %server_config.addr, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
