//! Server configuration and address discovery.

use crate::error::ServerError;
use shared::{DEFAULT_PORT, MAX_MESSAGE_SIZE};
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

/// Any publicly routable address works; no packet is ever sent to it.
const ROUTE_PROBE: &str = "8.8.8.8:80";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the acceptor listens on
    pub bind_address: SocketAddr,
    /// Per-session settings handed to every spawned session
    pub session: SessionConfig,
    /// Soft cap on concurrent sessions. `None` accepts without bound.
    pub max_sessions: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Largest request frame accepted, terminator excluded
    pub max_message_size: usize,
    /// Close sessions that stay silent this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    /// Refuse a name while another live session is using it
    pub reject_duplicate_names: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            idle_timeout: None,
            reject_duplicate_names: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            session: SessionConfig::default(),
            max_sessions: None,
        }
    }
}

impl ServerConfig {
    pub fn with_address(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Self::default()
        }
    }
}

/// Local address the OS would use to reach the outside world.
///
/// Connecting a UDP socket only selects a route, so this works offline as long
/// as a default route exists.
pub fn outbound_ip() -> Result<IpAddr, ServerError> {
    let probe = UdpSocket::bind("0.0.0.0:0").map_err(ServerError::AddressDiscovery)?;
    probe
        .connect(ROUTE_PROBE)
        .map_err(ServerError::AddressDiscovery)?;
    let local = probe.local_addr().map_err(ServerError::AddressDiscovery)?;
    Ok(local.ip())
}
