use clap::{Parser, Subcommand};
use colored::*;
use keeper_cli::commands::config::ConfigCommand;
use keeper_cli::commands::records::{BinCommand, CardCommand, LoginCommand, TextCommand};
use keeper_cli::commands::{config, records, register, Credentials};
use keeper_cli::config::{Config as Settings, ConfigManager, Transport};
use keeper_cli::KeeperResult;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "keeper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Command-line client for the Keeper secret vault",
    long_about = "Keeper stores payment cards, login/password pairs, texts and binary files \
                  on a Keeper server, over REST or RPC."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, env = "KEEPER_ADDRESS", help = "REST base URL")]
    address: Option<String>,

    #[arg(long, global = true, env = "KEEPER_RPC_ADDRESS", help = "RPC host:port")]
    rpc_address: Option<String>,

    #[arg(long, global = true, value_enum, env = "KEEPER_TRANSPORT", help = "Transport to use")]
    transport: Option<Transport>,

    #[arg(long, global = true, help = "Enable verbose output")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register(Credentials),

    /// Manage payment cards
    Card {
        #[command(flatten)]
        credentials: Credentials,
        #[command(subcommand)]
        command: CardCommand,
    },

    /// Manage login/password pairs
    Login {
        #[command(flatten)]
        credentials: Credentials,
        #[command(subcommand)]
        command: LoginCommand,
    },

    /// Manage texts
    Text {
        #[command(flatten)]
        credentials: Credentials,
        #[command(subcommand)]
        command: TextCommand,
    },

    /// Manage binary files
    Bin {
        #[command(flatten)]
        credentials: Credentials,
        #[command(subcommand)]
        command: BinCommand,
    },

    /// Show or change the CLI configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "keeper_cli=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> KeeperResult<()> {
    let verbose = cli.verbose;
    let settings = || -> KeeperResult<Settings> {
        let mut settings = ConfigManager::load()?;
        if let Some(address) = cli.address {
            settings.address = address;
        }
        if let Some(rpc_address) = cli.rpc_address {
            settings.rpc_address = rpc_address;
        }
        if let Some(transport) = cli.transport {
            settings.transport = transport;
        }
        ConfigManager::validate(&settings)?;
        Ok(settings)
    };

    match cli.command {
        Commands::Config(command) => config::execute(command),
        Commands::Register(credentials) => {
            register::execute(&settings()?, &credentials, verbose).await
        }
        Commands::Card {
            credentials,
            command,
        } => records::execute_card(&settings()?, &credentials, command, verbose).await,
        Commands::Login {
            credentials,
            command,
        } => records::execute_login(&settings()?, &credentials, command, verbose).await,
        Commands::Text {
            credentials,
            command,
        } => records::execute_text(&settings()?, &credentials, command, verbose).await,
        Commands::Bin {
            credentials,
            command,
        } => records::execute_bin(&settings()?, &credentials, command, verbose).await,
    }
}
