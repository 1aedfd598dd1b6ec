use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RpcError, RpcErrorObject};

/// The only protocol version accepted.
pub const JSONRPC_VERSION: &str = "2.0";

/// The only outer method accepted; the operation lives in `params.method`.
pub const LOCAL_METHOD: &str = "local";

/// Inner call carried in the `params` of a `local` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "lowercase")]
pub enum LocalCall {
    Read(ReadParams),
    Write(WriteParams),
}

impl LocalCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::Write(_) => "write",
        }
    }
}

/// `read` arguments: the address text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadParams {
    pub id: String,
}

/// `write` arguments: the payload as a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteParams {
    pub data: String,
}

/// A validated inbound envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    pub params: LocalCall,
}

impl RpcRequest {
    /// Build a `write` request.
    pub fn write(id: impl Into<Value>, data: impl Into<String>) -> Self {
        Self::local(id.into(), LocalCall::Write(WriteParams { data: data.into() }))
    }

    /// Build a `read` request.
    pub fn read(id: impl Into<Value>, address: impl Into<String>) -> Self {
        Self::local(id.into(), LocalCall::Read(ReadParams { id: address.into() }))
    }

    fn local(id: Value, params: LocalCall) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: LOCAL_METHOD.into(),
            params,
        }
    }

    /// Validate a decoded JSON value as a `local` read/write envelope.
    ///
    /// Checks run outside-in: object shape, `jsonrpc`, `id`, outer
    /// `method`, then the inner call. The first failure wins.
    pub fn from_value(value: Value) -> Result<Self, RpcError> {
        let Value::Object(mut map) = value else {
            return Err(RpcError::invalid_request("request must be a JSON object"));
        };

        match map.get("jsonrpc") {
            Some(Value::String(v)) if v == JSONRPC_VERSION => {}
            Some(other) => {
                return Err(RpcError::invalid_request(format!(
                    "unsupported jsonrpc version {other}"
                )))
            }
            None => return Err(RpcError::invalid_request("missing `jsonrpc`")),
        }

        let id = match map.remove("id") {
            Some(id) if is_valid_id(&id) => id,
            Some(other) => {
                return Err(RpcError::invalid_request(format!(
                    "`id` must be a string or number, got {other}"
                )))
            }
            None => return Err(RpcError::invalid_request("missing `id`")),
        };

        match map.get("method") {
            Some(Value::String(m)) if m == LOCAL_METHOD => {}
            Some(Value::String(m)) => {
                return Err(RpcError::invalid_request(format!(
                    "unsupported method `{m}`"
                )))
            }
            Some(_) => return Err(RpcError::invalid_request("`method` must be a string")),
            None => return Err(RpcError::invalid_request("missing `method`")),
        }

        let params = map
            .remove("params")
            .ok_or_else(|| RpcError::invalid_request("missing `params`"))?;
        let params: LocalCall = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_request(format!("bad `params`: {e}")))?;

        Ok(Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            method: LOCAL_METHOD.into(),
            params,
        })
    }
}

/// A JSON-RPC id is a string or a number.
pub(crate) fn is_valid_id(id: &Value) -> bool {
    id.is_string() || id.is_number()
}

/// The id to echo for `request`, or `null` when it carries no usable one.
pub fn request_id(request: &Value) -> Value {
    request
        .get("id")
        .filter(|id| is_valid_id(id))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Exactly one of `result` or `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcOutcome {
    Result(Value),
    Error(RpcErrorObject),
}

/// Outbound envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: RpcOutcome,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            outcome: RpcOutcome::Result(result),
        }
    }

    pub fn failure(id: Value, error: &RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            outcome: RpcOutcome::Error(error.to_object()),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            RpcOutcome::Result(v) => Some(v),
            RpcOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RpcErrorObject> {
        match &self.outcome {
            RpcOutcome::Error(e) => Some(e),
            RpcOutcome::Result(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RpcOutcome::Result(_))
    }
}
