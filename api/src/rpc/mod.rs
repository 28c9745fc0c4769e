//! RPC transport
//!
//! Newline-delimited JSON-RPC 2.0 over TCP. Each connection gets its own task
//! and may carry any number of sequential requests. Method names and status
//! codes live in [`shared::rpc`].

pub mod dispatch;

use crate::{state::AppState, utils::shutdown::wait_for_shutdown};
use serde_json::Value;
use shared::{rpc::INVALID_REQUEST, JsonRpcResponse};
use std::io;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpListener, TcpStream},
    sync::watch,
    task::JoinSet,
};
use tracing::{debug, info, warn};

pub struct RpcServer {
    state: AppState,
}

impl RpcServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Accept connections until `shutdown` flips, then wait for open
    /// connections to finish their current request.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> io::Result<()> {
        info!("RPC server listening on {}", listener.local_addr()?);

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                _ = wait_for_shutdown(shutdown.clone()) => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "RPC client connected");
                        let state = self.state.clone();
                        let shutdown = shutdown.clone();
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, state, shutdown).await {
                                warn!(%peer, "RPC connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => warn!("Failed to accept RPC connection: {}", e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!("RPC server draining {} connection(s)", connections.len());
        while connections.join_next().await.is_some() {}
        info!("RPC server stopped");
        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    state: AppState,
    shutdown: watch::Receiver<bool>,
) -> io::Result<()> {
    let max_frame = state.config.server.max_body_size;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();

    loop {
        frame.clear();
        // One byte past the limit tells an oversized frame from one that fits exactly
        let mut limited = (&mut reader).take(max_frame as u64 + 1);
        let read = tokio::select! {
            _ = wait_for_shutdown(shutdown.clone()) => break,
            read = limited.read_until(b'\n', &mut frame) => read?,
        };
        if read == 0 {
            break;
        }

        if frame.len() > max_frame && frame.last() != Some(&b'\n') {
            warn!(limit = max_frame, "RPC frame too large, closing connection");
            let response = JsonRpcResponse::error(
                Value::Null,
                INVALID_REQUEST,
                format!("Request exceeds {} bytes", max_frame),
            );
            write_response(&mut writer, &response).await?;
            break;
        }

        if frame.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = dispatch::process_request(&state, &frame).await;
        write_response(&mut writer, &response).await?;
    }

    Ok(())
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &JsonRpcResponse,
) -> io::Result<()> {
    let mut json = serde_json::to_vec(response)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await
}
