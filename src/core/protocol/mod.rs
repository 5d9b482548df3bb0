//! JSON-RPC protocol layer: envelope types and the request dispatcher.

mod dispatcher;
pub mod message;

pub use dispatcher::{Dispatcher, SUPPORTED_PROTOCOL_VERSIONS};
pub use message::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, ResponsePayload};
