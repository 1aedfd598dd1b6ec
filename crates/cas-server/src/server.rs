use std::sync::Arc;

use cas_store::{FileObjectStore, InMemoryObjectStore, ObjectStore};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Open the backend named by `config`: a file store under `data_dir`, or
/// memory when no directory is set.
pub fn open_store(config: &ServerConfig) -> ServerResult<Arc<dyn ObjectStore>> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(FileObjectStore::open(dir)?)),
        None => {
            info!("using in-memory object store");
            Ok(Arc::new(InMemoryObjectStore::new()))
        }
    }
}

/// CAS storage node.
pub struct CasServer {
    state: AppState,
}

impl CasServer {
    /// Validate `config` and open its store.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store = open_store(&config)?;
        Ok(Self::with_store(store, config))
    }

    /// Serve an already opened store.
    pub fn with_store(store: Arc<dyn ObjectStore>, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let bind_addr = self.config().bind_addr;
        let app = self.router();
        let listener = TcpListener::bind(bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            backend = self.state.store.backend(),
            hash = %self.config().hash_algorithm,
            "CAS node listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
