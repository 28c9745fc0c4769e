//! JSON-RPC 2.0 envelope for the RPC transport
//!
//! Frames are newline-delimited JSON objects over a plain TCP stream. Framing
//! problems use the standard JSON-RPC codes; failed operations use
//! [`RpcStatus`] codes so that clients can tell "already exists" from
//! "not found" the same way the REST transport does with HTTP statuses.

use crate::models::RecordKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// A JSON-RPC 2.0 success/error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: Value::from(id),
        }
    }

    /// Validate that this is a proper JSON-RPC 2.0 request.
    pub fn validate(&self) -> Result<(), String> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err("jsonrpc must be \"2.0\"".to_string());
        }
        if self.method.is_empty() {
            return Err("method must not be empty".to_string());
        }
        Ok(())
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Create an error response carrying an operation status.
    pub fn status(id: Value, status: RpcStatus, message: impl Into<String>) -> Self {
        Self::error(id, status.code(), message)
    }

    /// Create a parse error response (id is null because we couldn't parse it).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(Value::Null, PARSE_ERROR, message)
    }
}

/// Status vocabulary of the RPC transport. The numeric values follow the
/// canonical gRPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatus {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Internal,
    Unauthenticated,
}

impl RpcStatus {
    pub fn code(self) -> i32 {
        match self {
            RpcStatus::InvalidArgument => 3,
            RpcStatus::NotFound => 5,
            RpcStatus::AlreadyExists => 6,
            RpcStatus::Internal => 13,
            RpcStatus::Unauthenticated => 16,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            3 => Some(RpcStatus::InvalidArgument),
            5 => Some(RpcStatus::NotFound),
            6 => Some(RpcStatus::AlreadyExists),
            13 => Some(RpcStatus::Internal),
            16 => Some(RpcStatus::Unauthenticated),
            _ => None,
        }
    }
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpcStatus::InvalidArgument => "INVALID_ARGUMENT",
            RpcStatus::NotFound => "NOT_FOUND",
            RpcStatus::AlreadyExists => "ALREADY_EXISTS",
            RpcStatus::Internal => "INTERNAL",
            RpcStatus::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

/// Every method the RPC transport understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    Register,
    SignIn,
    Add(RecordKind),
    Get(RecordKind),
    Delete(RecordKind),
}

impl RpcMethod {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Register" => return Some(RpcMethod::Register),
            "SignIn" => return Some(RpcMethod::SignIn),
            _ => {}
        }

        RecordKind::ALL.into_iter().find_map(|kind| {
            let suffix = kind.rpc_name();
            if name == suffix {
                Some(RpcMethod::Get(kind))
            } else if name.strip_prefix("Add") == Some(suffix) {
                Some(RpcMethod::Add(kind))
            } else if name.strip_prefix("Delete") == Some(suffix) {
                Some(RpcMethod::Delete(kind))
            } else {
                None
            }
        })
    }

    pub fn name(self) -> String {
        match self {
            RpcMethod::Register => "Register".to_string(),
            RpcMethod::SignIn => "SignIn".to_string(),
            RpcMethod::Add(kind) => format!("Add{}", kind.rpc_name()),
            RpcMethod::Get(kind) => kind.rpc_name().to_string(),
            RpcMethod::Delete(kind) => format!("Delete{}", kind.rpc_name()),
        }
    }
}

/// Result of `Register` and `SignIn`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReply {
    pub user: i64,
    pub token: String,
}

/// Session fields carried by every protected RPC message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionParams {
    #[serde(default)]
    pub user: i64,
    #[serde(default)]
    pub token: String,
}

/// Params of the `Card`/`Login`/`Text`/`Binary` and `Delete*` methods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordIdParams {
    #[serde(flatten)]
    pub session: SessionParams,
    pub id: String,
}
