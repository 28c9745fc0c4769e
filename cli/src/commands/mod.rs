pub mod config;
pub mod records;
pub mod register;

use crate::api::{create_client, VaultClient};
use crate::config::Config;
use crate::utils::error::{KeeperError, KeeperResult};
use clap::Args;

/// Who to act as
#[derive(Debug, Clone, Args)]
pub struct Credentials {
    /// Account login
    #[arg(short, long, env = "KEEPER_USER")]
    pub user: String,

    /// Account password; prompted for when omitted
    #[arg(long, env = "KEEPER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl Credentials {
    /// The password from the flag or environment, else from a hidden prompt
    pub fn resolve_password(&self) -> KeeperResult<String> {
        let password = match &self.password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password(format!("Password for {}: ", self.user))?,
        };

        if password.is_empty() {
            return Err(KeeperError::InvalidInput("Password cannot be empty".to_string()));
        }
        Ok(password)
    }
}

/// Sign in through the configured transport
pub async fn open_session(
    config: &Config,
    credentials: &Credentials,
) -> KeeperResult<Box<dyn VaultClient>> {
    let password = credentials.resolve_password()?;
    let mut client = create_client(config)?;
    client.sign_in(&credentials.user, &password).await?;
    Ok(client)
}
