use super::VaultClient;
use crate::config::{Config, ConfigManager};
use crate::utils::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use shared::{
    JsonRpcRequest, JsonRpcResponse, Record, RecordKind, RpcMethod, SessionReply, UserCredentials,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

struct RpcConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    next_id: u64,
}

/// Session client over the RPC transport.
///
/// The TCP connection is opened on the first call and reused afterwards.
pub struct RpcClient {
    address: String,
    connect_timeout: Duration,
    connection: Option<RpcConnection>,
    session: Option<SessionReply>,
}

impl RpcClient {
    pub fn new(config: &Config) -> KeeperResult<Self> {
        ConfigManager::validate_rpc_address(&config.rpc_address)?;

        Ok(Self {
            address: config.rpc_address.clone(),
            connect_timeout: Duration::from_secs(config.timeout),
            connection: None,
            session: None,
        })
    }

    async fn connection(&mut self) -> KeeperResult<&mut RpcConnection> {
        if self.connection.is_none() {
            let connect = TcpStream::connect(&self.address);
            let stream = tokio::time::timeout(self.connect_timeout, connect)
                .await
                .map_err(|_| {
                    KeeperError::Network(format!("Timed out connecting to {}", self.address))
                })??;
            debug!("Connected to RPC server at {}", self.address);

            let (reader, writer) = stream.into_split();
            self.connection = Some(RpcConnection {
                lines: BufReader::new(reader).lines(),
                writer,
                next_id: 1,
            });
        }

        self.connection
            .as_mut()
            .ok_or_else(|| KeeperError::Network("RPC connection unavailable".to_string()))
    }

    async fn call(&mut self, method: RpcMethod, params: Value) -> KeeperResult<Value> {
        let conn = self.connection().await?;

        let request = JsonRpcRequest::new(method.name(), params, conn.next_id);
        conn.next_id += 1;
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let exchange = async {
            conn.writer.write_all(line.as_bytes()).await?;
            conn.writer.flush().await?;
            conn.lines.next_line().await
        };

        let reply = match exchange.await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                self.connection = None;
                return Err(KeeperError::Network(
                    "Connection closed by the RPC server".to_string(),
                ));
            }
            Err(e) => {
                self.connection = None;
                return Err(KeeperError::Io(e));
            }
        };

        let response: JsonRpcResponse = serde_json::from_str(&reply)?;
        // A null id is only legal on errors the server could not attribute to a request
        let attributable = response.id.is_null() && response.error.is_some();
        if response.id != request.id && !attributable {
            self.connection = None;
            return Err(KeeperError::Network(format!(
                "RPC reply id {} does not match request id {}",
                response.id, request.id
            )));
        }
        if let Some(error) = response.error {
            return Err(KeeperError::from_rpc_error(error.code, error.message));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn open_session(
        &mut self,
        method: RpcMethod,
        login: &str,
        password: &str,
    ) -> KeeperResult<()> {
        let params = serde_json::to_value(UserCredentials {
            login: login.to_string(),
            password: password.to_string(),
        })?;

        let result = self.call(method, params).await?;
        let session: SessionReply = serde_json::from_value(result)?;
        debug!(user = session.user, "Session opened");
        self.session = Some(session);
        Ok(())
    }

    /// `{user, token}` of the current session, to be extended per call
    fn session_params(&self) -> KeeperResult<Map<String, Value>> {
        let session = self.session.as_ref().ok_or(KeeperError::AuthRequired)?;

        let mut params = Map::new();
        params.insert("user".to_string(), json!(session.user));
        params.insert("token".to_string(), json!(session.token));
        Ok(params)
    }
}

#[async_trait]
impl VaultClient for RpcClient {
    async fn register(&mut self, login: &str, password: &str) -> KeeperResult<()> {
        self.open_session(RpcMethod::Register, login, password)
            .await
            .map_err(|e| match e {
                KeeperError::AlreadyExists => KeeperError::UserAlreadyExists,
                other => other,
            })
    }

    async fn sign_in(&mut self, login: &str, password: &str) -> KeeperResult<()> {
        self.open_session(RpcMethod::SignIn, login, password)
            .await
            .map_err(|e| match e {
                KeeperError::Unauthenticated => KeeperError::InvalidCredentials,
                other => other,
            })
    }

    async fn add(&mut self, record: Record) -> KeeperResult<()> {
        let mut params = self.session_params()?;
        let kind = record.kind();
        params.insert(kind.rpc_field().to_string(), serde_json::to_value(&record)?);

        self.call(RpcMethod::Add(kind), Value::Object(params)).await?;
        Ok(())
    }

    async fn get(&mut self, kind: RecordKind, id: &str) -> KeeperResult<Record> {
        let mut params = self.session_params()?;
        params.insert("id".to_string(), json!(id));

        let mut result = self.call(RpcMethod::Get(kind), Value::Object(params)).await?;
        let payload = result
            .get_mut(kind.rpc_field())
            .map(Value::take)
            .ok_or_else(|| {
                let field = kind.rpc_field();
                KeeperError::Network(format!("RPC reply is missing the `{}` field", field))
            })?;
        Ok(Record::from_value(kind, payload)?)
    }

    async fn delete(&mut self, kind: RecordKind, id: &str) -> KeeperResult<()> {
        let mut params = self.session_params()?;
        params.insert("id".to_string(), json!(id));

        self.call(RpcMethod::Delete(kind), Value::Object(params)).await?;
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
