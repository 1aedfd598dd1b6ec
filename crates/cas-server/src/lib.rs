//! HTTP front end for the CAS storage node.
//!
//! Serves the JSON-RPC endpoint at `POST /` plus `GET /v1/health` and
//! `GET /v1/info`. Each RPC call is dispatched on the blocking pool and
//! bounded by the configured request timeout.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, InfoResponse};
pub use server::{open_store, CasServer};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use cas_rpc::{ErrorKind, RpcRequest, RpcResponse};
    use cas_store::{
        InMemoryObjectStore, ObjectStore, PutOutcome, StoreResult, StoreStats, StoredObject,
    };
    use cas_types::ContentAddress;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    /// Memory store whose writes stall long enough to trip a short deadline.
    #[derive(Default)]
    struct SlowStore(InMemoryObjectStore);

    impl ObjectStore for SlowStore {
        fn put(&self, address: &ContentAddress, payload: &[u8]) -> StoreResult<PutOutcome> {
            std::thread::sleep(Duration::from_millis(400));
            self.0.put(address, payload)
        }

        fn get(&self, address: &ContentAddress) -> StoreResult<StoredObject> {
            self.0.get(address)
        }

        fn exists(&self, address: &ContentAddress) -> bool {
            self.0.exists(address)
        }

        fn stats(&self) -> StoreResult<StoreStats> {
            self.0.stats()
        }

        fn backend(&self) -> &'static str {
            "slow"
        }
    }

    fn app() -> Router {
        app_with(ServerConfig::default())
    }

    fn app_with(config: ServerConfig) -> Router {
        CasServer::with_store(Arc::new(InMemoryObjectStore::new()), config).router()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn rpc(app: &Router, request: RpcRequest) -> RpcResponse {
        let body = serde_json::to_vec(&request).unwrap();
        let (status, value) = post(app, body).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(value).unwrap()
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(&app(), "/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn write_read_roundtrip_over_http() {
        let app = app();
        let written = rpc(&app, RpcRequest::write("0", "aaaaaaaaaaaaaaaaaaaa")).await;
        let address = written.result().and_then(Value::as_str).unwrap().to_string();
        assert_eq!(address.len(), 66);

        let read = rpc(&app, RpcRequest::read("1", address)).await;
        assert_eq!(read.id, json!("1"));
        assert_eq!(read.result(), Some(&json!("aaaaaaaaaaaaaaaaaaaa")));
    }

    #[tokio::test]
    async fn missing_object_is_in_band_error() {
        let resp = rpc(&app(), RpcRequest::read("x", ContentAddress::zero().encode())).await;
        assert_eq!(resp.id, json!("x"));
        assert_eq!(resp.error().and_then(|e| e.kind()), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let (status, body) = post(&app(), "not json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = ServerConfig {
            max_payload_size: 16,
            max_request_bytes: 64,
            ..ServerConfig::default()
        };
        let app = app_with(config);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::from(vec![b' '; 1024]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn info_reports_store_totals() {
        let app = app();
        rpc(&app, RpcRequest::write("0", "12345")).await;
        rpc(&app, RpcRequest::write("1", "12345")).await;
        rpc(&app, RpcRequest::write("2", "abc")).await;

        let (status, body) = get(&app, "/v1/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "cas-server");
        assert_eq!(body["hash_algorithm"], "sha3-256");
        assert_eq!(body["backend"], "memory");
        assert_eq!(body["objects"], 2);
        assert_eq!(body["total_bytes"], 8);
    }

    #[tokio::test]
    async fn concurrent_identical_posts_store_one_object() {
        let store = Arc::new(InMemoryObjectStore::new());
        let app = CasServer::with_store(store.clone(), ServerConfig::default()).router();

        let calls: Vec<_> = (0..8)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move { rpc(&app, RpcRequest::write(i, "shared")).await })
            })
            .collect();
        let mut addresses = Vec::new();
        for call in calls {
            let resp = call.await.unwrap();
            addresses.push(resp.result().cloned().unwrap());
        }
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn slow_call_times_out_as_storage_failure() {
        let config = ServerConfig {
            request_timeout_ms: 50,
            ..ServerConfig::default()
        };
        let app = CasServer::with_store(Arc::new(SlowStore::default()), config).router();

        let resp = rpc(&app, RpcRequest::write("t-1", "slow")).await;
        assert_eq!(resp.id, json!("t-1"));
        let error = resp.error().unwrap();
        assert_eq!(error.code, -32004);
        assert_eq!(error.kind(), Some(ErrorKind::StorageFailure));
        assert!(error.message.contains("timed out"), "{}", error.message);
    }
}
