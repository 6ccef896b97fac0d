use chrono::Local;
use plan91_dashboard::{router, AppState, Config, Dashboard, HttpApi};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(api = %config.api_url, practitioner = %config.practitioner_id.as_str(), "starting dashboard");

    let api = Arc::new(HttpApi::new(config.api_url.clone(), config.session_cookie.clone()));
    let dashboard = Dashboard::new(api, config.practitioner_id.clone(), Local::now().date_naive());
    if let Err(err) = dashboard.reload().await {
        error!("initial load failed: {err}");
    }

    let app = router(AppState::new(dashboard, config.login_url.clone()));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
