use std::sync::Arc;

use cas_engine::{EngineConfig, ReadCoordinator, WriteCoordinator};
use cas_store::ObjectStore;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::envelope::{request_id, LocalCall, RpcRequest, RpcResponse};
use crate::error::RpcError;

/// Routes `local` JSON-RPC calls to the write and read coordinators.
///
/// Holds nothing but the coordinators, which share the store through an
/// `Arc`. Cloning is cheap and every clone serves the same store.
#[derive(Clone, Debug)]
pub struct RpcDispatcher {
    writer: WriteCoordinator,
    reader: ReadCoordinator,
}

impl RpcDispatcher {
    pub fn new(store: Arc<dyn ObjectStore>, config: &EngineConfig) -> Self {
        Self {
            writer: WriteCoordinator::new(store.clone(), config),
            reader: ReadCoordinator::new(store, config),
        }
    }

    pub fn from_coordinators(writer: WriteCoordinator, reader: ReadCoordinator) -> Self {
        Self { writer, reader }
    }

    /// Handle a raw request body.
    pub fn dispatch_bytes(&self, body: &[u8]) -> RpcResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.dispatch(value),
            Err(e) => {
                debug!(error = %e, "request body is not JSON");
                RpcResponse::failure(Value::Null, &RpcError::parse_error(e))
            }
        }
    }

    /// Handle an already decoded request.
    pub fn dispatch(&self, value: Value) -> RpcResponse {
        let echo_id = request_id(&value);

        let request = match RpcRequest::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                debug!(id = %echo_id, error = %e, "rejected envelope");
                return RpcResponse::failure(echo_id, &e);
            }
        };

        let call = request.params.name();
        match self.route(request.params) {
            Ok(result) => {
                debug!(id = %request.id, call, "call completed");
                RpcResponse::success(request.id, result)
            }
            Err(e) => {
                warn!(id = %request.id, call, code = e.code(), error = %e.message, "call failed");
                RpcResponse::failure(request.id, &e)
            }
        }
    }

    fn route(&self, call: LocalCall) -> Result<Value, RpcError> {
        match call {
            LocalCall::Write(params) => {
                let address = self.writer.write(params.data.as_bytes())?;
                Ok(Value::String(address.encode()))
            }
            LocalCall::Read(params) => {
                let payload = self.reader.read(&params.id)?;
                Ok(render_payload(payload))
            }
        }
    }
}

/// UTF-8 payloads go back as a plain string. Anything else is wrapped as
/// `{"encoding": "hex", "data": ...}` so it never collides with text.
fn render_payload(payload: Vec<u8>) -> Value {
    match String::from_utf8(payload) {
        Ok(text) => Value::String(text),
        Err(e) => json!({ "encoding": "hex", "data": hex::encode(e.as_bytes()) }),
    }
}
