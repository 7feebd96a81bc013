//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

use students_api::build_info;
use students_api::config::{self, Config, StorageBackend, StorageConfig};
use students_api::server::{self, AppState};
use students_api::store::{MemoryStudentStore, SqliteStudentStore, StudentStore};

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
    storage_path_override: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path)
        .await
        .with_context(|| format!("failed to load config '{config_path}'"))?;

    // CLI overrides config
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(path) = storage_path_override {
        config.storage.path = path.to_path_buf();
    }

    info!(version = %build_info::version_string(), "Starting students-api");

    let students = open_store(Path::new(config_path), &config.storage)?;
    info!(env = %config.env, backend = %config.storage.backend, "Storage initialized");

    let state = AppState::with_lock_cleanup(students, config.env.clone());
    let app = server::build_app(
        state,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host '{}'", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "Starting server");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut server_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server_task => {
            // The server stopped on its own, before any shutdown signal.
            result.context("server task panicked")?.context("server error")?;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    let _ = shutdown_tx.send(());
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(result) => {
            result.context("server task panicked")?.context("server error")?;
            info!("Server stopped");
        }
        Err(_) => {
            warn!(
                grace_seconds = config.server.shutdown_grace_seconds,
                "In-flight requests did not finish in time, forcing shutdown"
            );
            server_task.abort();
        }
    }
    Ok(())
}

/// Open the configured storage backend.
///
/// A relative SQLite path is resolved against the config file directory.
fn open_store(config_path: &Path, storage: &StorageConfig) -> Result<Arc<dyn StudentStore>> {
    match storage.backend {
        StorageBackend::Sqlite => {
            let path = config::resolve_path(config_path, &storage.path);
            let store = SqliteStudentStore::open(&path)
                .with_context(|| format!("failed to open database '{}'", path.display()))?;
            info!(path = %path.display(), "Opened student database");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, records will be lost on shutdown");
            Ok(Arc::new(MemoryStudentStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
