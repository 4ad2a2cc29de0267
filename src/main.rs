use mimalloc::MiMalloc;
use personality_api::config::{self, LISTEN_ADDR};
use personality_api::db::{self, MySqlPersonalityStore};
use personality_api::router::{AppState, personality_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    // Bootstrap must succeed before anything binds the port.
    let (source, certs) = config::load_default()?;
    let pool = db::initialize(source, certs)?;
    let store = MySqlPersonalityStore::new(pool);

    let state = AppState::new(Arc::new(store.clone()));
    let app = personality_router(state);

    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    info!("HTTP server listening on {}", LISTEN_ADDR);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("draining database pool");
    store.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            warn!("received SIGTERM, shutting down");
        }
    }
}
