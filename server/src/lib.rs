//! # Position Server Library
//!
//! Authoritative server for the Rocket Palz position-synchronization game.
//! Clients report a directional command for a named player once per tick and
//! get back where every known player currently stands.
//!
//! ## Architecture Design
//!
//! ### One Task Per Connection
//! The acceptor (`network`) owns the listening socket and spawns an independent
//! tokio task for each accepted connection. Sessions never wait on each other;
//! a slow or silent client only occupies its own task.
//!
//! ### Single Shared Registry
//! All game state lives in one `PositionRegistry` behind a mutex. Sessions only
//! reach it through its operations, each of which holds the lock for a bounded
//! amount of work and never across I/O. Mutations and snapshots are therefore
//! linearizable across all sessions.
//!
//! ### Request/Response Protocol
//! Every request is a newline-terminated JSON document
//! `{"name": "...", "command": "none|up|down|left|right"}` and is answered with
//! exactly one snapshot `{"<name>": {"x": .., "y": ..}, ...}` reflecting the
//! registry right after that request was applied.
//!
//! ## Module Organization
//!
//! - `config`: bind address, session limits, timeouts
//! - `registry`: the shared name → position map
//! - `session`: per-connection state machine and cleanup
//! - `network`: listener and session spawning
//! - `error`: startup and per-session error types
//!
//! ## Failure Containment
//! A malformed message, oversized frame, reset or idle timeout ends only the
//! offending session. Its player is removed so the avatar disappears from every
//! other client's next snapshot. Only startup failures (address in use, no
//! routable address) are fatal.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::with_address("0.0.0.0:10018".parse()?);
//!     let server = Server::new(config).await?;
//!
//!     // Accepts forever, one task per client
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod registry;
pub mod session;

pub use config::{ServerConfig, SessionConfig};
pub use error::{ServerError, SessionError};
pub use network::Server;
pub use registry::{PositionRegistry, RegistryError, SessionId};
pub use session::{Session, SessionState};
