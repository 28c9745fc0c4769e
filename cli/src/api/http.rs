use super::types::ErrorBody;
use super::VaultClient;
use crate::config::{Config, ConfigManager};
use crate::utils::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{AuthResponse, Record, RecordKind, UserCredentials};
use std::time::Duration;
use tracing::debug;

/// Session client over the REST transport
pub struct HttpClient {
    client: Client,
    base_url: String,
    /// Full `Authorization` header value from the last register/sign-in
    auth_header: Option<String>,
}

impl HttpClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> KeeperResult<Self> {
        ConfigManager::validate_address(&config.address)?;

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.timeout))
            .user_agent(format!("keeper-cli/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Ensure URL doesn't end with slash for consistent path construction
        let base_url = config.address.trim_end_matches('/');

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            auth_header: None,
        })
    }

    fn auth_header(&self) -> KeeperResult<&str> {
        self.auth_header.as_deref().ok_or(KeeperError::AuthRequired)
    }

    fn record_url(&self, kind: RecordKind, id: &str) -> KeeperResult<String> {
        // URL parsing folds these segments away, so they can never reach the record
        if id == "." || id == ".." {
            return Err(KeeperError::InvalidInput(format!(
                "record id {:?} is reserved",
                id
            )));
        }
        Ok(format!(
            "{}/api/{}/{}",
            self.base_url,
            kind.path_segment(),
            urlencoding::encode(id)
        ))
    }

    async fn open_session(&mut self, path: &str, login: &str, password: &str) -> KeeperResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let body = UserCredentials {
            login: login.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let header_value = response
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let session: AuthResponse = self.handle_response(response).await?;
        self.auth_header =
            Some(header_value.unwrap_or_else(|| format!("Bearer {}", session.token)));
        debug!("Session opened, expires at {}", session.expires_at);
        Ok(())
    }

    /// Handle API response and convert to result
    async fn handle_response<T>(&self, response: Response) -> KeeperResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(KeeperError::Json)
        } else {
            Err(Self::error_from(status.as_u16(), text))
        }
    }

    /// Like [`Self::handle_response`] for calls whose success body is ignored
    async fn handle_empty_response(&self, response: Response) -> KeeperResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await?;
        Err(Self::error_from(status.as_u16(), text))
    }

    fn error_from(status: u16, text: String) -> KeeperError {
        // Try to parse as API error, fallback to generic error
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) if !body.message.is_empty() => body.message,
            _ if text.is_empty() => format!("HTTP {} error", status),
            _ => text,
        };
        KeeperError::from_http_status(status, message)
    }
}

#[async_trait]
impl VaultClient for HttpClient {
    async fn register(&mut self, login: &str, password: &str) -> KeeperResult<()> {
        self.open_session("/api/register", login, password)
            .await
            .map_err(|e| match e {
                KeeperError::AlreadyExists => KeeperError::UserAlreadyExists,
                other => other,
            })
    }

    async fn sign_in(&mut self, login: &str, password: &str) -> KeeperResult<()> {
        self.open_session("/api/signin", login, password)
            .await
            .map_err(|e| match e {
                KeeperError::Unauthenticated => KeeperError::InvalidCredentials,
                other => other,
            })
    }

    async fn add(&mut self, record: Record) -> KeeperResult<()> {
        let auth = self.auth_header()?;
        let url = format!("{}/api/{}", self.base_url, record.kind().path_segment());

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, auth)
            .json(&record)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn get(&mut self, kind: RecordKind, id: &str) -> KeeperResult<Record> {
        let auth = self.auth_header()?;

        let response = self
            .client
            .get(self.record_url(kind, id)?)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await?;
        let value: serde_json::Value = self.handle_response(response).await?;
        Ok(Record::from_value(kind, value)?)
    }

    async fn delete(&mut self, kind: RecordKind, id: &str) -> KeeperResult<()> {
        let auth = self.auth_header()?;

        let response = self
            .client
            .delete(self.record_url(kind, id)?)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    fn is_authenticated(&self) -> bool {
        self.auth_header.is_some()
    }
}
