use shared::RpcStatus;
use std::fmt;

/// Result type alias for Keeper CLI operations
pub type KeeperResult<T> = Result<T, KeeperError>;

/// Main error type for the Keeper CLI
#[derive(Debug)]
pub enum KeeperError {
    /// A protected call was made before register or sign-in
    AuthRequired,
    /// Registration hit a login that is already taken
    UserAlreadyExists,
    /// Sign-in with an unknown login or a wrong password
    InvalidCredentials,
    /// A record with this id already exists
    AlreadyExists,
    /// No record with this id
    NotFound,
    /// The server rejected the session token
    Unauthenticated,
    /// The server rejected the request payload
    InvalidInput(String),
    /// Any other HTTP failure
    Server { status: u16, message: String },
    /// Any other RPC failure
    Rpc { code: i32, message: String },
    /// IO-related errors
    Io(std::io::Error),
    /// HTTP request errors
    Http(reqwest::Error),
    /// JSON serialization/deserialization errors
    Json(serde_json::Error),
    /// TOML parsing errors
    Toml(toml::de::Error),
    /// Configuration errors
    Config(String),
    /// Network connectivity errors
    Network(String),
}

impl KeeperError {
    /// Map a failed REST response
    pub fn from_http_status(status: u16, message: String) -> Self {
        match status {
            400 => KeeperError::InvalidInput(message),
            401 => KeeperError::Unauthenticated,
            404 => KeeperError::NotFound,
            409 => KeeperError::AlreadyExists,
            _ => KeeperError::Server { status, message },
        }
    }

    /// Map a failed RPC response
    pub fn from_rpc_error(code: i32, message: String) -> Self {
        match RpcStatus::from_code(code) {
            Some(RpcStatus::InvalidArgument) => KeeperError::InvalidInput(message),
            Some(RpcStatus::Unauthenticated) => KeeperError::Unauthenticated,
            Some(RpcStatus::NotFound) => KeeperError::NotFound,
            Some(RpcStatus::AlreadyExists) => KeeperError::AlreadyExists,
            Some(RpcStatus::Internal) | None => KeeperError::Rpc { code, message },
        }
    }
}

impl fmt::Display for KeeperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeeperError::AuthRequired => write!(f, "Not signed in: register or sign in first"),
            KeeperError::UserAlreadyExists => write!(f, "A user with this login already exists"),
            KeeperError::InvalidCredentials => write!(f, "Invalid login or password"),
            KeeperError::AlreadyExists => write!(f, "A record with this id already exists"),
            KeeperError::NotFound => write!(f, "Record not found"),
            KeeperError::Unauthenticated => write!(f, "Session rejected by the server"),
            KeeperError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            KeeperError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            KeeperError::Rpc { code, message } => write!(f, "RPC error ({}): {}", code, message),
            KeeperError::Io(e) => write!(f, "IO error: {}", e),
            KeeperError::Http(e) => write!(f, "HTTP error: {}", e),
            KeeperError::Json(e) => write!(f, "JSON error: {}", e),
            KeeperError::Toml(e) => write!(f, "TOML error: {}", e),
            KeeperError::Config(msg) => write!(f, "Configuration error: {}", msg),
            KeeperError::Network(msg) => write!(f, "Network error: {}", msg),
        }
    }
}

impl std::error::Error for KeeperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeeperError::Io(e) => Some(e),
            KeeperError::Http(e) => Some(e),
            KeeperError::Json(e) => Some(e),
            KeeperError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeeperError {
    fn from(err: std::io::Error) -> Self {
        KeeperError::Io(err)
    }
}

impl From<reqwest::Error> for KeeperError {
    fn from(err: reqwest::Error) -> Self {
        KeeperError::Http(err)
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        KeeperError::Json(err)
    }
}

impl From<toml::de::Error> for KeeperError {
    fn from(err: toml::de::Error) -> Self {
        KeeperError::Toml(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert!(matches!(
            KeeperError::from_http_status(409, String::new()),
            KeeperError::AlreadyExists
        ));
        assert!(matches!(
            KeeperError::from_http_status(404, String::new()),
            KeeperError::NotFound
        ));
        assert!(matches!(
            KeeperError::from_http_status(401, String::new()),
            KeeperError::Unauthenticated
        ));
        assert!(matches!(
            KeeperError::from_http_status(400, "bad".to_string()),
            KeeperError::InvalidInput(msg) if msg == "bad"
        ));
        assert!(matches!(
            KeeperError::from_http_status(503, String::new()),
            KeeperError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_rpc_code_mapping() {
        assert!(matches!(
            KeeperError::from_rpc_error(6, String::new()),
            KeeperError::AlreadyExists
        ));
        assert!(matches!(
            KeeperError::from_rpc_error(5, String::new()),
            KeeperError::NotFound
        ));
        assert!(matches!(
            KeeperError::from_rpc_error(16, String::new()),
            KeeperError::Unauthenticated
        ));
        assert!(matches!(
            KeeperError::from_rpc_error(-32601, String::new()),
            KeeperError::Rpc { code: -32601, .. }
        ));
    }
}
