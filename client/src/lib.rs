//! # Game Client Library
//!
//! Headless client for the position server. It keeps one TCP connection open,
//! reports a command for its player on every poll and keeps the latest
//! snapshot of all player positions for whatever front end draws them.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Connection handling and the poll cycle:
//! - Command queue fed from input sources on other tasks
//! - `none` is sent whenever the queue is empty, so every poll still returns
//!   fresh positions
//! - Newline-framed JSON requests and snapshots
//!
//! ### Roster Module (`roster`)
//! Maps snapshots onto the fixed set of character sprites: present means shown
//! at its position, absent means hidden.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::GameClient;
//! use client::roster::Avatars;
//! use shared::Command;
//!
//! # async fn example() -> Result<(), client::error::ClientError> {
//! let mut client = GameClient::connect("192.168.1.20:10018", "musk").await?;
//! let mut avatars = Avatars::new();
//!
//! client.queue(Command::Right);
//! let snapshot = client.poll().await?;
//! for (name, visibility) in avatars.update(snapshot) {
//!     println!("{} -> {:?}", name, visibility);
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod network;
pub mod roster;
