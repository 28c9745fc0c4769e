pub mod config;
pub mod error;
pub mod shutdown;

pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorKind};
