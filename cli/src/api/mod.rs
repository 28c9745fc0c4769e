//! Session clients
//!
//! [`VaultClient`] is the transport-agnostic interface; [`HttpClient`] and
//! [`RpcClient`] implement it over the REST and RPC transports. Each client
//! keeps its own session after `register`/`sign_in` and refuses protected calls
//! with [`KeeperError::AuthRequired`] until then, without touching the network.

pub mod http;
pub mod rpc;
pub mod types;

use crate::config::{Config, Transport};
use crate::utils::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use shared::{Binary, Card, Credential, Record, RecordKind, Text, VaultRecord};

pub use http::HttpClient;
pub use rpc::RpcClient;

#[async_trait]
pub trait VaultClient: Send {
    /// Create an account and start a session for it
    async fn register(&mut self, login: &str, password: &str) -> KeeperResult<()>;

    async fn sign_in(&mut self, login: &str, password: &str) -> KeeperResult<()>;

    async fn add(&mut self, record: Record) -> KeeperResult<()>;

    async fn get(&mut self, kind: RecordKind, id: &str) -> KeeperResult<Record>;

    /// Succeeds when the record does not exist
    async fn delete(&mut self, kind: RecordKind, id: &str) -> KeeperResult<()>;

    fn is_authenticated(&self) -> bool;

    async fn add_card(&mut self, card: Card) -> KeeperResult<()> {
        self.add(card.into()).await
    }

    async fn get_card(&mut self, id: &str) -> KeeperResult<Card> {
        expect_kind(self.get(RecordKind::Card, id).await?)
    }

    async fn delete_card(&mut self, id: &str) -> KeeperResult<()> {
        self.delete(RecordKind::Card, id).await
    }

    async fn add_credential(&mut self, credential: Credential) -> KeeperResult<()> {
        self.add(credential.into()).await
    }

    async fn get_credential(&mut self, id: &str) -> KeeperResult<Credential> {
        expect_kind(self.get(RecordKind::Credential, id).await?)
    }

    async fn delete_credential(&mut self, id: &str) -> KeeperResult<()> {
        self.delete(RecordKind::Credential, id).await
    }

    async fn add_text(&mut self, text: Text) -> KeeperResult<()> {
        self.add(text.into()).await
    }

    async fn get_text(&mut self, id: &str) -> KeeperResult<Text> {
        expect_kind(self.get(RecordKind::Text, id).await?)
    }

    async fn delete_text(&mut self, id: &str) -> KeeperResult<()> {
        self.delete(RecordKind::Text, id).await
    }

    async fn add_binary(&mut self, binary: Binary) -> KeeperResult<()> {
        self.add(binary.into()).await
    }

    async fn get_binary(&mut self, id: &str) -> KeeperResult<Binary> {
        expect_kind(self.get(RecordKind::Binary, id).await?)
    }

    async fn delete_binary(&mut self, id: &str) -> KeeperResult<()> {
        self.delete(RecordKind::Binary, id).await
    }
}

fn expect_kind<R: VaultRecord>(record: Record) -> KeeperResult<R> {
    let kind = record.kind();
    R::from_record(record).ok_or_else(|| {
        KeeperError::Network(format!("expected a {} record, received a {}", R::KIND, kind))
    })
}

/// Build the session client selected by the configuration
pub fn create_client(config: &Config) -> KeeperResult<Box<dyn VaultClient>> {
    match config.transport {
        Transport::Rest => Ok(Box::new(HttpClient::new(config)?)),
        Transport::Rpc => Ok(Box::new(RpcClient::new(config)?)),
    }
}
