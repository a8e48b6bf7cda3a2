//! `SixstoneServer` builder and accept loop.

use std::path::PathBuf;
use std::sync::Arc;

use sixstone_hub::{HubConfig, SessionHub, Store};
use sixstone_protocol::JsonCodec;

use crate::handler::handle_connection;
use crate::transport::WsListener;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) hub: SessionHub,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Sixstone server.
///
/// # Example
///
/// ```rust,ignore
/// let server = SixstoneServer::builder()
///     .bind("0.0.0.0:8080")
///     .data_dir("/var/lib/sixstone")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct SixstoneServerBuilder {
    bind_addr: String,
    hub_config: HubConfig,
    data_dir: Option<PathBuf>,
}

impl SixstoneServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            hub_config: HubConfig::default(),
            data_dir: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the hub configuration (staleness TTL, log capacity,
    /// admin key).
    pub fn hub_config(mut self, config: HubConfig) -> Self {
        self.hub_config = config;
        self
    }

    /// Enables persistence under the given data directory. Counters
    /// and boards saved there by a previous run are restored on build.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Binds the listener, restores any persisted state, and returns
    /// the server ready to run.
    pub async fn build(self) -> Result<SixstoneServer, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let hub = match self.data_dir {
            Some(dir) => SessionHub::with_store(self.hub_config, Store::new(dir)),
            None => SessionHub::new(self.hub_config),
        };
        hub.load().await?;

        Ok(SixstoneServer {
            listener,
            state: Arc::new(ServerState {
                hub,
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for SixstoneServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Sixstone game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SixstoneServer {
    listener: WsListener,
    state: Arc<ServerState>,
}

impl SixstoneServer {
    /// Creates a new builder.
    pub fn builder() -> SixstoneServerBuilder {
        SixstoneServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Sixstone server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
