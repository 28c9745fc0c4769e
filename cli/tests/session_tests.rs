//! End-to-end session tests: both clients against an in-process keeper-api

use keeper_api::{
    auth::JwtVerifier, create_app, AppState, Config as ServerConfig, RpcServer, SqliteStore,
};
use keeper_cli::api::{create_client, VaultClient};
use keeper_cli::config::{Config, Transport};
use keeper_cli::KeeperError;
use shared::{Binary, Card, Credential, Text};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

struct Server {
    config: Config,
    // Dropping the sender stops the RPC listener
    _shutdown: watch::Sender<bool>,
}

impl Server {
    async fn start(transport: Transport) -> Self {
        let vars: HashMap<&str, &str> = [("SIGNING_KEY", "session-test-key")].into_iter().collect();
        let server_config = ServerConfig::from_vars(|name| vars.get(name).map(|v| v.to_string()));
        let server_config = Arc::new(server_config.unwrap());
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let state = AppState::new(store, Arc::new(JwtVerifier), server_config);

        let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let http_addr = http.local_addr().unwrap();
        let app = create_app(state.clone());
        tokio::spawn(async move { axum::serve(http, app).await });

        let rpc = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let rpc_addr = rpc.local_addr().unwrap();
        let (shutdown, rx) = watch::channel(false);
        tokio::spawn(RpcServer::new(state).serve(rpc, rx));

        Self {
            config: Config {
                address: format!("http://{}", http_addr),
                rpc_address: rpc_addr.to_string(),
                transport,
                timeout: 5,
            },
            _shutdown: shutdown,
        }
    }

    fn client(&self) -> Box<dyn VaultClient> {
        create_client(&self.config).unwrap()
    }
}

fn card() -> Card {
    Card {
        id: "c1".to_string(),
        fio: "ALICE SMITH".to_string(),
        number: "4111111111111111".to_string(),
        date: "12/30".to_string(),
        cvv: "123".to_string(),
        metainfo: "personal".to_string(),
    }
}

async fn full_scenario(transport: Transport) {
    let server = Server::start(transport).await;

    let mut alice = server.client();
    assert!(!alice.is_authenticated());
    alice.register("alice", "p1").await.unwrap();
    assert!(alice.is_authenticated());

    alice.add_card(card()).await.unwrap();
    assert_eq!(alice.get_card("c1").await.unwrap(), card());
    assert!(matches!(alice.add_card(card()).await, Err(KeeperError::AlreadyExists)));

    let credential = Credential {
        id: "mail".to_string(),
        login: "alice@example.com".to_string(),
        password: "hunter2".to_string(),
        metainfo: String::new(),
    };
    alice.add_credential(credential.clone()).await.unwrap();
    assert_eq!(alice.get_credential("mail").await.unwrap(), credential);

    let text = Text {
        id: "note".to_string(),
        content: "line one\nline two".to_string(),
        metainfo: String::new(),
    };
    alice.add_text(text.clone()).await.unwrap();
    assert_eq!(alice.get_text("note").await.unwrap(), text);

    let binary = Binary {
        id: "blob".to_string(),
        data: vec![0, 159, 146, 150, 255],
        metainfo: "raw".to_string(),
    };
    alice.add_binary(binary.clone()).await.unwrap();
    assert_eq!(alice.get_binary("blob").await.unwrap(), binary);

    alice.delete_card("c1").await.unwrap();
    assert!(matches!(alice.get_card("c1").await, Err(KeeperError::NotFound)));
    // Deleting again still succeeds
    alice.delete_card("c1").await.unwrap();

    let mut again = server.client();
    assert!(matches!(
        again.register("alice", "other").await,
        Err(KeeperError::UserAlreadyExists)
    ));
    assert!(matches!(
        again.sign_in("alice", "wrong").await,
        Err(KeeperError::InvalidCredentials)
    ));
    again.sign_in("alice", "p1").await.unwrap();
    assert_eq!(again.get_text("note").await.unwrap(), text);

    let mut bob = server.client();
    bob.register("bob", "p2").await.unwrap();
    assert!(matches!(bob.get_text("note").await, Err(KeeperError::NotFound)));
}

#[tokio::test]
async fn test_rest_session_end_to_end() {
    full_scenario(Transport::Rest).await;
}

#[tokio::test]
async fn test_rpc_session_end_to_end() {
    full_scenario(Transport::Rpc).await;
}

#[tokio::test]
async fn test_transports_share_one_vault() {
    let rest = Server::start(Transport::Rest).await;
    let rpc_config = Config {
        transport: Transport::Rpc,
        ..rest.config.clone()
    };

    let mut writer = rest.client();
    writer.register("carol", "p3").await.unwrap();
    writer.add_card(card()).await.unwrap();

    let mut reader = create_client(&rpc_config).unwrap();
    reader.sign_in("carol", "p3").await.unwrap();
    assert_eq!(reader.get_card("c1").await.unwrap(), card());
}

#[tokio::test]
async fn test_calls_before_sign_in_fail_locally() {
    let server = Server::start(Transport::Rpc).await;
    let mut client = server.client();
    assert!(matches!(
        client.get_text("anything").await,
        Err(KeeperError::AuthRequired)
    ));
}
