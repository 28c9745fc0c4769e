//! Wire types shared by the Keeper server and its clients
//!
//! Both transports move the same four record kinds around:
//!
//! 1. **Card**: payment card details (`/api/card`, RPC `*Card`)
//! 2. **Credential**: a login/password pair (`/api/login`, RPC `*Login`)
//! 3. **Text**: free-form text (`/api/txt`, RPC `*Text`)
//! 4. **Binary**: raw bytes, base64 encoded in JSON (`/api/bin`, RPC `*Binary`)
//!
//! The [`models`] module holds the record shapes and the [`VaultRecord`] trait
//! that lets transport code stay generic over the kind. The [`rpc`] module holds
//! the JSON-RPC 2.0 envelope and the status vocabulary of the RPC transport.

pub mod models;
pub mod rpc;

pub use models::{
    AuthResponse, Binary, Card, Credential, Record, RecordKind, Text, UserCredentials, VaultRecord,
};
pub use rpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, RecordIdParams, RpcMethod, RpcStatus,
    SessionParams, SessionReply,
};
