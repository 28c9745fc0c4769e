use crate::utils::error::{KeeperError, KeeperResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Which session client to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Rest,
    Rpc,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Rest => write!(f, "rest"),
            Transport::Rpc => write!(f, "rpc"),
        }
    }
}

/// Configuration structure for the Keeper CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST transport
    pub address: String,
    /// `host:port` of the RPC transport
    pub rpc_address: String,
    pub transport: Transport,
    /// Connect timeout in seconds
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "http://localhost:8080".to_string(),
            rpc_address: "localhost:3200".to_string(),
            transport: Transport::Rest,
            timeout: 30,
        }
    }
}

/// Configuration manager for loading and saving config
pub struct ConfigManager;

impl ConfigManager {
    /// Get the path to the config file
    pub fn config_path() -> KeeperResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| KeeperError::Config("Unable to find config directory".to_string()))?;

        Ok(config_dir.join("keeper").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> KeeperResult<Config> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> KeeperResult<Config> {
        if !config_path.exists() {
            let default_config = Config::default();
            Self::save_to(&default_config, config_path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(config_path)
            .map_err(|e| KeeperError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(config: &Config) -> KeeperResult<()> {
        Self::save_to(config, &Self::config_path()?)
    }

    pub fn save_to(config: &Config, config_path: &Path) -> KeeperResult<()> {
        Self::validate(config)?;

        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(config)
            .map_err(|e| KeeperError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, contents)
            .map_err(|e| KeeperError::Config(format!("Failed to write config file: {}", e)))?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(config_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(config_path, perms)?;
        }

        Ok(())
    }

    pub fn validate(config: &Config) -> KeeperResult<()> {
        Self::validate_address(&config.address)?;
        Self::validate_rpc_address(&config.rpc_address)
    }

    /// Validate REST base URL format
    pub fn validate_address(url: &str) -> KeeperResult<()> {
        if url.is_empty() {
            return Err(KeeperError::Config("Server address cannot be empty".to_string()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(KeeperError::Config(
                "Server address must start with http:// or https://".to_string(),
            ));
        }

        if url.parse::<reqwest::Url>().is_err() {
            return Err(KeeperError::Config("Invalid server address format".to_string()));
        }

        Ok(())
    }

    /// Validate an RPC `host:port` pair
    pub fn validate_rpc_address(addr: &str) -> KeeperResult<()> {
        let valid = addr
            .rsplit_once(':')
            .map(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok())
            .unwrap_or(false);

        if !valid {
            return Err(KeeperError::Config(format!(
                "RPC address '{}' must be in host:port form",
                addr
            )));
        }
        Ok(())
    }
}
