//! Authoritative player positions shared by every session.
//!
//! The map is never handed out. Callers go through the locked operations
//! below, each of which takes the same mutex, does O(1) work on the map (or a
//! single copy for snapshots) and releases it before any I/O happens.

use log::debug;
use shared::{Command, Position, Snapshot};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Identifies a session for name ownership.
pub type SessionId = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("player name `{name}` is held by session {owner}")]
    NameTaken { name: String, owner: SessionId },
}

#[derive(Debug, Default)]
struct Players {
    positions: HashMap<String, Position>,
    /// Only populated by the exclusive-name operations.
    owners: HashMap<String, SessionId>,
}

impl Players {
    fn apply(&mut self, name: &str, command: Command) -> Position {
        let position = self.positions.entry(name.to_string()).or_default();
        position.step(command);
        *position
    }

    fn snapshot(&self) -> Snapshot {
        self.positions
            .iter()
            .map(|(name, position)| (name.clone(), *position))
            .collect()
    }

    fn claim(&mut self, name: &str, session: SessionId) -> Result<(), RegistryError> {
        if let Some(&owner) = self.owners.get(name) {
            if owner != session {
                return Err(RegistryError::NameTaken {
                    name: name.to_string(),
                    owner,
                });
            }
            return Ok(());
        }

        self.owners.insert(name.to_string(), session);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PositionRegistry {
    players: Mutex<Players>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Every operation leaves the map consistent before returning, so a panic in
    // another holder cannot have left a half-written entry behind.
    fn lock(&self) -> MutexGuard<'_, Players> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `name` by `command`, inserting it at the origin first if unseen.
    pub fn apply(&self, name: &str, command: Command) -> Position {
        self.lock().apply(name, command)
    }

    /// [`apply`](Self::apply) followed by [`snapshot`](Self::snapshot) under one
    /// lock acquisition, so the result reflects exactly this mutation.
    pub fn apply_and_snapshot(&self, name: &str, command: Command) -> Snapshot {
        let mut players = self.lock();
        players.apply(name, command);
        players.snapshot()
    }

    /// Like [`apply_and_snapshot`](Self::apply_and_snapshot), but refuses names
    /// currently owned by another session and claims unowned ones for `session`.
    pub fn apply_exclusive(
        &self,
        name: &str,
        command: Command,
        session: SessionId,
    ) -> Result<Snapshot, RegistryError> {
        let mut players = self.lock();
        players.claim(name, session)?;
        players.apply(name, command);
        Ok(players.snapshot())
    }

    /// Deletes `name` if present. Absent names are a no-op.
    pub fn remove(&self, name: &str) -> Option<Position> {
        let mut players = self.lock();
        players.owners.remove(name);
        let removed = players.positions.remove(name);
        if removed.is_some() {
            debug!("Removed player {}", name);
        }
        removed
    }

    /// Deletes `name` only if `session` owns it, or nobody does.
    ///
    /// Returns true when an entry was removed.
    pub fn release(&self, name: &str, session: SessionId) -> bool {
        let mut players = self.lock();
        if players
            .owners
            .get(name)
            .is_some_and(|&owner| owner != session)
        {
            return false;
        }

        players.owners.remove(name);
        players.positions.remove(name).is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    pub fn position(&self, name: &str) -> Option<Position> {
        self.lock().positions.get(name).copied()
    }

    pub fn owner(&self, name: &str) -> Option<SessionId> {
        self.lock().owners.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().positions.is_empty()
    }
}
