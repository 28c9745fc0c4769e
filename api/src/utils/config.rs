use serde::{Deserialize, Serialize};
use std::{env, fmt, ops::RangeInclusive, str::FromStr};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// REST server configuration
    pub server: ServerConfig,
    /// RPC listener configuration
    pub rpc: RpcConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
    /// How long in-flight requests may run after a shutdown signal
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// `None` disables the RPC listener
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Session token lifetime
    pub fn token_ttl(&self) -> chrono::Duration {
        i64::try_from(self.expiration_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_TOKEN_HOURS as i64))
    }
}

const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_TOKEN_HOURS: u64 = 24;
/// One hour up to one year
const TOKEN_HOURS_RANGE: RangeInclusive<u64> = 1..=8760;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&var, "PORT", 8080)?,
                max_body_size: parse_var(&var, "MAX_BODY_SIZE", DEFAULT_MAX_BODY_SIZE)?,
                shutdown_grace_secs: parse_var(&var, "SHUTDOWN_GRACE_SECS", 10)?,
            },
            rpc: RpcConfig {
                address: var("RPC_ADDRESS").filter(|addr| !addr.trim().is_empty()),
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite://keeper.db?mode=rwc".to_string()),
            },
            jwt: JwtConfig {
                secret: match var("SIGNING_KEY").filter(|key| !key.is_empty()) {
                    Some(key) => key,
                    None => {
                        tracing::warn!(
                            "SIGNING_KEY not set, using a random key that dies with the process"
                        );
                        random_secret()
                    }
                },
                expiration_hours: parse_var(
                    &var,
                    "TOKEN_EXPIRATION_HOURS",
                    DEFAULT_TOKEN_HOURS,
                )?,
            },
        };

        if config.server.max_body_size == 0 {
            anyhow::bail!("MAX_BODY_SIZE must be at least 1 byte");
        }
        if !TOKEN_HOURS_RANGE.contains(&config.jwt.expiration_hours) {
            anyhow::bail!(
                "TOKEN_EXPIRATION_HOURS must be between {} and {}",
                TOKEN_HOURS_RANGE.start(),
                TOKEN_HOURS_RANGE.end()
            );
        }

        Ok(config)
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// An unset variable takes `default`; a set but unparsable one is an error
fn parse_var<F, T>(var: &F, name: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid {} value: {:?}", name, value)),
        None => Ok(default),
    }
}

// Dev only
fn random_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| rng.gen::<u8>())
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.server.shutdown_grace_secs, 10);
        assert!(config.rpc.address.is_none());
        assert_eq!(config.database.url, "sqlite://keeper.db?mode=rwc");
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.jwt.secret.len(), 64);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("RPC_ADDRESS", "127.0.0.1:3200"),
            ("SIGNING_KEY", "top-secret"),
            ("TOKEN_EXPIRATION_HOURS", "1"),
        ])
        .unwrap();
        assert_eq!(config.http_addr(), "0.0.0.0:9000");
        assert_eq!(config.rpc.address.as_deref(), Some("127.0.0.1:3200"));
        assert_eq!(config.jwt.secret, "top-secret");
        assert_eq!(config.jwt.expiration_hours, 1);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("MAX_BODY_SIZE", "lots")]).is_err());
        assert!(config_from(&[("MAX_BODY_SIZE", "0")]).is_err());
        assert!(config_from(&[("SHUTDOWN_GRACE_SECS", "soon")]).is_err());
        assert!(config_from(&[("TOKEN_EXPIRATION_HOURS", "forever")]).is_err());
        assert!(config_from(&[("TOKEN_EXPIRATION_HOURS", "0")]).is_err());
        assert!(config_from(&[("TOKEN_EXPIRATION_HOURS", "10000000000")]).is_err());
    }

    #[test]
    fn test_token_ttl_bounds() {
        let config = config_from(&[("TOKEN_EXPIRATION_HOURS", "8760")]).unwrap();
        assert_eq!(config.jwt.token_ttl(), chrono::Duration::hours(8760));
        assert!(config_from(&[("TOKEN_EXPIRATION_HOURS", "8761")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config_from(&[("SIGNING_KEY", "top-secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_random_secrets_differ() {
        assert_ne!(random_secret(), random_secret());
    }
}
