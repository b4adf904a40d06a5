use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::client::handler::{handle_client, truncate_utf8};
use crate::client::results::AdmissionResult;
use crate::client::{Client, ClientRegistry};
use crate::error::{ChatServerError, HandshakeError};
use crate::server::config::ServerConfig;

const SERVER_FULL_NOTICE: &[u8] = b"server full. try again later.\n";

pub struct Server {
    registry: Arc<ClientRegistry>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Binds the listening socket and prepares an empty registry.
    ///
    /// A bind failure is fatal: the server must not serve any client.
    pub async fn new(config: ServerConfig) -> Result<Self, ChatServerError> {
        let socket_addr = config.socket_addr();

        let listener = match TcpListener::bind(&socket_addr).await {
            Ok(listener) => {
                info!("Server bound to {}", socket_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket_addr, e);
                return Err(ChatServerError::Bind {
                    addr: socket_addr,
                    source: e,
                });
            }
        };

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            registry: Arc::new(ClientRegistry::new(config.max_clients)),
            listener,
            config: Arc::new(config),
            shutdown_tx,
        })
    }

    /// Returns the address the listener is bound to.
    ///
    /// Reflects the kernel-assigned port when the configured port is 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a shared handle to the client registry.
    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections until `shutdown` is called.
    pub async fn start(&self) {
        info!(
            "Starting chat server on {} (max {} clients)",
            self.config.socket_addr(),
            self.config.max_clients
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let registry = Arc::clone(&self.registry);
                        let config = Arc::clone(&self.config);
                        let shutdown_tx = self.shutdown_tx.clone();

                        // Spawn a task for each client so accept loop doesn't block
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_new_client(stream, addr, registry, config, shutdown_tx).await
                            {
                                warn!("Failed to handle client {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
    }

    /// Signals the accept loop and every session task to stop.
    pub fn shutdown(&self) {
        // A send error only means nothing is listening anymore
        let _ = self.shutdown_tx.send(());
    }
}

/// Handles a new connection: runs the name handshake, admits the client
/// into the registry, and spawns its session handler.
async fn handle_new_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    registry: Arc<ClientRegistry>,
    config: Arc<ServerConfig>,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<(), ChatServerError> {
    info!("Client connected: {}", client_addr);

    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    // Subscribe before the handshake so a shutdown fired while this
    // client is still typing its name is not missed.
    let mut shutdown_rx = shutdown_tx.subscribe();

    let mut name = String::new();
    let n = tokio::select! {
        result = reader.read_line(&mut name) => result.map_err(HandshakeError::Io)?,
        _ = shutdown_rx.recv() => return Ok(()),
    };
    if n == 0 {
        return Err(HandshakeError::Disconnected.into());
    }

    let mut display_name = name.trim_end_matches(['\r', '\n']).to_string();
    truncate_utf8(&mut display_name, config.max_name_length);

    let client = Client::new(display_name, client_addr, write_half);

    match registry.try_admit(client).await {
        AdmissionResult::Admitted(client) => {
            info!(
                "Admitted client {} as {:?} ({}/{} clients)",
                client_addr,
                client.display_name(),
                registry.len().await,
                config.max_clients
            );

            tokio::spawn(handle_client(
                reader,
                registry,
                client_addr,
                config.max_message_length,
                shutdown_rx,
            ));

            Ok(())
        }
        AdmissionResult::Full(client) => {
            warn!("Server full, rejecting client {}", client_addr);

            let writer = client.writer();
            let mut writer = writer.lock().await;
            writer.write_all(SERVER_FULL_NOTICE).await?;
            writer.flush().await?;

            // Dropping the client closes the connection
            Ok(())
        }
    }
}
