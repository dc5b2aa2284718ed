use dotenvy::dotenv;
use pms_admin::config::get_configuration;
use pms_admin::permissions::PermissionStores;
use pms_admin::services::{auth_client::AuthClient, backend_client::BackendClient};
use pms_admin::startup::build_router;
use pms_admin::AppState;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "pms-admin",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    );

    pms_admin::services::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let auth_client = Arc::new(AuthClient::new(configuration.auth.clone())?);
    let backend = Arc::new(BackendClient::new(configuration.backend.clone())?);
    info!(backend = %backend.base_url(), auth = %auth_client.base_url(), "Upstream clients ready");

    let state = AppState::new(auth_client, backend);
    PermissionStores::spawn_sweeper(
        state.stores.clone(),
        configuration.session.inactivity(),
        configuration.session.store_sweep_interval(),
    );

    let app = build_router(state, &configuration.session);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting pms-admin on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
