//! TCP acceptor: owns the listener and spawns one session task per connection

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::registry::{PositionRegistry, SessionId};
use crate::session::Session;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Accepts connections and hands each one the shared registry
pub struct Server {
    listener: TcpListener,
    registry: Arc<PositionRegistry>,
    config: ServerConfig,
    /// Free session slots when a limit is configured
    capacity: Option<Arc<Semaphore>>,
    next_session_id: SessionId,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Self::with_registry(config, Arc::new(PositionRegistry::new())).await
    }

    pub async fn with_registry(
        config: ServerConfig,
        registry: Arc<PositionRegistry>,
    ) -> Result<Self, ServerError> {
        let addr = config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!("Server listening on {}", listener.local_addr().unwrap_or(addr));

        let capacity = config
            .max_sessions
            .map(|limit| Arc::new(Semaphore::new(limit)));

        Ok(Server {
            listener,
            registry,
            config,
            capacity,
            next_session_id: 1,
        })
    }

    /// Actual listening address, useful when binding port 0
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> Arc<PositionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accept loop. Never returns; failures of single connections are logged
    /// and the loop keeps going.
    pub async fn run(mut self) {
        info!("Waiting for connections");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => self.admit(stream, peer),
                Err(e) => {
                    // Usually transient (e.g. out of file descriptors)
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    fn admit(&mut self, stream: TcpStream, peer: SocketAddr) {
        let permit = match self.reserve_slot() {
            Ok(permit) => permit,
            Err(limit) => {
                warn!(
                    "Refusing connection from {}: server full ({} sessions)",
                    peer, limit
                );
                return;
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle for {}: {}", peer, e);
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        let session = Session::new(
            id,
            stream,
            peer,
            Arc::clone(&self.registry),
            self.config.session.clone(),
        );

        tokio::spawn(async move {
            let _permit = permit;
            // Outcome is already logged by the session.
            let _ = session.run().await;
        });
    }

    /// Takes a session slot, or reports the limit if none is free.
    fn reserve_slot(&self) -> Result<Option<OwnedSemaphorePermit>, usize> {
        let Some(capacity) = &self.capacity else {
            return Ok(None);
        };

        Arc::clone(capacity)
            .try_acquire_owned()
            .map(Some)
            .map_err(|_| self.config.max_sessions.unwrap_or_default())
    }
}
