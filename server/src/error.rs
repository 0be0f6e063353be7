use crate::registry::RegistryError;
use shared::ProtocolError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Why the server could not start serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("no routable local address: {0}")]
    AddressDiscovery(std::io::Error),
}

/// Why a single session ended abnormally. Never escapes the session task.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no message within {0:?}")]
    IdleTimeout(Duration),
}
