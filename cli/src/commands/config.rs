use crate::config::{Config, ConfigManager, Transport};
use crate::utils::error::KeeperResult;
use clap::Subcommand;
use colored::*;
use std::path::Path;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration
    Show,
    /// Set the REST base URL
    SetAddress { address: String },
    /// Set the RPC `host:port`
    SetRpcAddress { address: String },
    /// Choose the default transport
    SetTransport {
        #[arg(value_enum)]
        transport: Transport,
    },
    /// Set the connect timeout in seconds
    SetTimeout { seconds: u64 },
}

/// Execute a config command against the user's config file
pub fn execute(command: ConfigCommand) -> KeeperResult<()> {
    let path = ConfigManager::config_path()?;
    execute_at(command, &path)
}

pub fn execute_at(command: ConfigCommand, path: &Path) -> KeeperResult<()> {
    let mut config = ConfigManager::load_from(path)?;

    let changed = match command {
        ConfigCommand::Show => {
            print_config(&config, path);
            return Ok(());
        }
        ConfigCommand::SetAddress { address } => {
            ConfigManager::validate_address(&address)?;
            config.address = address;
            "address"
        }
        ConfigCommand::SetRpcAddress { address } => {
            ConfigManager::validate_rpc_address(&address)?;
            config.rpc_address = address;
            "rpc_address"
        }
        ConfigCommand::SetTransport { transport } => {
            config.transport = transport;
            "transport"
        }
        ConfigCommand::SetTimeout { seconds } => {
            config.timeout = seconds;
            "timeout"
        }
    };

    ConfigManager::save_to(&config, path)?;
    println!("{} Updated {}", "✓".green().bold(), changed.bold());
    Ok(())
}

fn print_config(config: &Config, path: &Path) {
    println!("{} {}", "Config file:".bold(), path.display());
    println!("  {} {}", "address:".bold(), config.address);
    println!("  {} {}", "rpc_address:".bold(), config.rpc_address);
    println!("  {} {}", "transport:".bold(), config.transport.to_string().cyan());
    println!("  {} {}s", "timeout:".bold(), config.timeout);
}
