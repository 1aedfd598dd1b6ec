use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use cas_rpc::{request_id, ErrorKind, HealthResponse, RpcDispatcher, RpcError, RpcResponse};
use cas_store::ObjectStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared by every handler. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: RpcDispatcher,
    pub store: Arc<dyn ObjectStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, config: ServerConfig) -> Self {
        Self {
            dispatcher: RpcDispatcher::new(store.clone(), &config.engine_config()),
            store,
            config: Arc::new(config),
        }
    }
}

/// JSON-RPC endpoint.
///
/// Always answers 200; failures travel inside the response body. The
/// dispatcher runs on the blocking pool because the store does file I/O.
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
    let limit = state.config.request_timeout();
    let dispatcher = state.dispatcher.clone();
    let request = body.clone();
    let task = tokio::task::spawn_blocking(move || dispatcher.dispatch_bytes(&request));

    let response = match tokio::time::timeout(limit, task).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            error!(error = %e, "dispatch task failed");
            RpcResponse::failure(
                echo_id(&body),
                &RpcError::new(ErrorKind::StorageFailure, "Storage failure: request aborted"),
            )
        }
        Err(_) => {
            warn!(timeout_ms = duration_ms(limit), "request timed out");
            RpcResponse::failure(echo_id(&body), &RpcError::timeout(duration_ms(limit)))
        }
    };
    Json(response)
}

fn echo_id(body: &[u8]) -> Value {
    serde_json::from_slice::<Value>(body)
        .map(|v| request_id(&v))
        .unwrap_or(Value::Null)
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    pub hash_algorithm: String,
    pub objects: u64,
    pub total_bytes: u64,
}

/// Info handler: node identity plus current store totals.
pub async fn info_handler(State(state): State<AppState>) -> ServerResult<Json<InfoResponse>> {
    let store = state.store.clone();
    let stats = tokio::task::spawn_blocking(move || store.stats())
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(Json(InfoResponse {
        name: "cas-server",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.store.backend(),
        hash_algorithm: state.config.hash_algorithm.to_string(),
        objects: stats.objects,
        total_bytes: stats.total_bytes,
    }))
}
