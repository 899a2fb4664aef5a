mod autosave;
mod config;
mod errors;
mod persistence;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::autosave::{AutosaveOptions, Autosaver, SaveNotice, StoreSaveTarget};
use crate::config::{Config, StorageBackend};
use crate::persistence::{FileSlotStorage, MemorySlotStorage, SlotStorage};
use crate::resume::store::ResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed env vars abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let storage = build_storage(&config);
    info!("Slot storage initialized ({})", config.storage_backend.as_str());

    // Rehydrate the saved session; a corrupt or unreadable slot starts empty
    let mut store = ResumeStore::new(config.history_limit);
    match store.rehydrate(storage.as_ref(), &config.storage_key) {
        Ok(true) => info!("Restored {} resumes", store.resumes().len()),
        Ok(false) => info!("No saved session found, starting empty"),
        Err(e) => warn!("Could not restore saved session, starting empty: {e}"),
    }
    let store = store.into_shared();

    let target = StoreSaveTarget::new(store.clone(), storage, config.storage_key.clone());
    let autosaver = Autosaver::spawn(
        Arc::new(target),
        AutosaveOptions {
            debounce: config.autosave_debounce,
            notify_success: config.autosave_notify_success,
        },
    );
    info!(
        "Autosave enabled (debounce: {}ms)",
        config.autosave_debounce.as_millis()
    );
    tokio::spawn(log_save_notices(autosaver.handle().subscribe()));

    let state = AppState {
        store,
        autosave: autosaver.handle(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, flushing pending changes");
    autosaver.shutdown().await;

    Ok(())
}

fn build_storage(config: &Config) -> Arc<dyn SlotStorage> {
    match config.storage_backend {
        StorageBackend::File => Arc::new(FileSlotStorage::new(config.storage_dir.clone())),
        StorageBackend::Memory => Arc::new(MemorySlotStorage::new()),
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM. The SIGTERM handler is installed
/// when this is called, not when the future is first polled.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {e}");
            None
        }
    };

    async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            match terminate {
                Some(mut stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("Received Ctrl-C"),
            () = terminate => info!("Received SIGTERM"),
        }
    }
}

/// Mirrors autosave notices into the log.
async fn log_save_notices(mut notices: tokio::sync::broadcast::Receiver<SaveNotice>) {
    loop {
        match notices.recv().await {
            Ok(SaveNotice::Saved) => info!("Changes saved"),
            Ok(SaveNotice::Failed { message }) => warn!("Save failed: {message}"),
            Err(RecvError::Lagged(skipped)) => warn!("Missed {skipped} save notices"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        let shutdown = shutdown_signal();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("shutdown future did not resolve on SIGTERM");
    }
}
