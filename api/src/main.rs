use keeper_api::{
    auth::JwtVerifier,
    create_app,
    db::{CredentialStore, SqliteStore},
    utils::shutdown::{shutdown_signal, wait_for_shutdown},
    AppState, Config, RpcServer,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::watch, task::JoinSet};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keeper_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    info!("Starting Keeper server with config: {:?}", config);

    // Initialize database connection
    let store = Arc::new(SqliteStore::connect(&config.database.url).await?);
    let state = AppState::new(store.clone(), Arc::new(JwtVerifier), config.clone());

    // Bind every listener before serving so that a bad address fails startup
    let http_listener = TcpListener::bind(config.http_addr()).await?;
    info!("REST server listening on {}", http_listener.local_addr()?);
    let rpc_listener = match &config.rpc.address {
        Some(addr) => Some(TcpListener::bind(addr).await?),
        None => {
            info!("RPC_ADDRESS not set, RPC transport disabled");
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut servers = JoinSet::new();

    let app = create_app(state.clone());
    let rest_shutdown = wait_for_shutdown(shutdown_rx.clone());
    servers.spawn(async move {
        axum::serve(http_listener, app)
            .with_graceful_shutdown(rest_shutdown)
            .await
    });

    if let Some(listener) = rpc_listener {
        let rpc = RpcServer::new(state);
        let rpc_shutdown = shutdown_rx.clone();
        servers.spawn(async move { rpc.serve(listener, rpc_shutdown).await });
    }

    // Run until a signal arrives or a server exits on its own
    tokio::select! {
        _ = shutdown_signal() => {}
        Some(result) = servers.join_next() => {
            match result {
                Ok(Ok(())) => warn!("Server exited unexpectedly"),
                Ok(Err(e)) => error!("Server error: {}", e),
                Err(e) => error!("Server task failed: {}", e),
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let grace = Duration::from_secs(config.server.shutdown_grace_secs);
    let drained = tokio::time::timeout(grace, async {
        while servers.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("Grace period of {:?} elapsed, abandoning in-flight work", grace);
        servers.abort_all();
    }

    store.close().await;
    info!("Shutdown complete");
    Ok(())
}
