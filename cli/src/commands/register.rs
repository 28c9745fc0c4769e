use super::Credentials;
use crate::api::create_client;
use crate::config::Config;
use crate::utils::error::KeeperResult;
use colored::*;

/// Execute the register command
pub async fn execute(
    config: &Config,
    credentials: &Credentials,
    verbose: bool,
) -> KeeperResult<()> {
    if verbose {
        println!(
            "Registering '{}' via {} transport...",
            credentials.user, config.transport
        );
    }

    let password = credentials.resolve_password()?;
    let mut client = create_client(config)?;
    client.register(&credentials.user, &password).await?;

    println!(
        "{} Registered user {}",
        "✓".green().bold(),
        credentials.user.bold()
    );
    Ok(())
}
