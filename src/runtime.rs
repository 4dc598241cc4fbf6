//! Runtime helpers for the host service.

use tokio::signal;
use tracing::info;

pub use telemetry::{init_tracing, init_tracing_from_env, TracingConfig};

/// Loads `.env` and initializes tracing. Call once at service startup.
pub fn init() {
    dotenvy::dotenv().ok();
    init_tracing_from_env();
}

/// Resolves on SIGINT or SIGTERM. Pair with `Engine::shutdown` for a
/// graceful stop.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
