use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use examlock_backend::{config::Config, AppState};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config.clone()).await?;

    // Countdown ticker: one step per second across every live attempt.
    // Auto-submit failures are logged inside tick_all and stay retryable.
    {
        let sessions = app_state.session_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                sessions.tick_all().await;
            }
        });
    }

    let app = examlock_backend::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
