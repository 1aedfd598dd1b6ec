//! JSON-RPC surface of the CAS storage node.
//!
//! Every call arrives as a JSON-RPC 2.0 envelope whose outer method is the
//! fixed string `local`; the real operation (`read` or `write`) and its
//! arguments sit one level down in `params`:
//!
//! ```text
//! { "jsonrpc": "2.0", "id": "0", "method": "local",
//!   "params": { "method": "write", "params": { "data": "hello" } } }
//! ```
//!
//! [`RpcDispatcher`] parses the envelope, routes the inner call to the write
//! or read coordinator, and shapes the response. It never fails: every
//! problem becomes an error response carrying a stable [`ErrorKind`] code.

pub mod dispatcher;
pub mod endpoint;
pub mod envelope;
pub mod error;

pub use dispatcher::RpcDispatcher;
pub use endpoint::{endpoints, HealthResponse};
pub use envelope::{
    request_id, LocalCall, ReadParams, RpcOutcome, RpcRequest, RpcResponse, WriteParams,
    JSONRPC_VERSION, LOCAL_METHOD,
};
pub use error::{codes, ErrorKind, RpcError, RpcErrorObject};
