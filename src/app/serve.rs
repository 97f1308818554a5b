use crate::adapters::http::{self, AppState};
use crate::adapters::storage::LocalArtifactStore;
use crate::core::artifacts::load_artifacts;
use crate::core::engine::InferenceEngine;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::future::Future;
use tokio::net::TcpListener;

/// Load the artifacts named by `config` into an engine.
pub async fn build_engine<C: ConfigProvider + ?Sized>(config: &C) -> Result<InferenceEngine> {
    let store = LocalArtifactStore::new(config.artifact_dir());
    tracing::info!("Loading artifacts from {}", store.resolve("").display());

    let loaded = load_artifacts(&store, config.model_file(), config.columns_file()).await?;
    Ok(InferenceEngine::from(loaded))
}

/// Full startup: artifacts first, then bind, then serve until `shutdown`.
///
/// Nothing is bound if either artifact fails to load.
pub async fn run<C, F>(config: &C, shutdown: F) -> Result<()>
where
    C: ConfigProvider + ?Sized,
    F: Future<Output = ()> + Send + 'static,
{
    let monitor = SystemMonitor::new(config.monitor());

    let engine = build_engine(config).await?;
    monitor.log_loaded(&engine);

    let address = format!("{}:{}", config.host(), config.port());
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server ready on http://{}", listener.local_addr()?);

    http::serve(listener, AppState::new(engine), shutdown).await?;

    tracing::info!("Server stopped");
    monitor.log_shutdown();
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
