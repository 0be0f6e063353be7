//! Wire types and constants shared by the position server and its clients.

pub mod codec;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use codec::{decode_message, encode_message, read_frame, write_frame};

pub const DEFAULT_PORT: u16 = 10018;
/// Largest client request the server accepts, terminator excluded.
pub const MAX_MESSAGE_SIZE: usize = 1024;
/// Largest snapshot a client accepts. Snapshots grow with the player count.
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024;

/// Characters the front end ships sprites for.
pub const ROSTER: [&str; 4] = ["musk", "bruno", "bezos", "beck"];

/// Full server reply: every known player and where they stand.
pub type Snapshot = BTreeMap<String, Position>;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directional input a client reports once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::None,
        Command::Up,
        Command::Down,
        Command::Left,
        Command::Right,
    ];

    /// Offset applied to a position. Screen coordinates: `up` moves toward y = -inf.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Command::None => (0, 0),
            Command::Up => (0, -1),
            Command::Down => (0, 1),
            Command::Left => (-1, 0),
            Command::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::None => "none",
            Command::Up => "up",
            Command::Down => "down",
            Command::Left => "left",
            Command::Right => "right",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command `{0}`")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == s.trim())
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Client request: which player moves and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEnvelope {
    pub name: String,
    pub command: Command,
}

impl CommandEnvelope {
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }
}

/// Integer grid position. Unbounded in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn step(&mut self, command: Command) {
        let (dx, dy) = command.delta();
        self.x = self.x.saturating_add(dx);
        self.y = self.y.saturating_add(dy);
    }

    pub fn moved(mut self, command: Command) -> Self {
        self.step(command);
        self
    }
}
