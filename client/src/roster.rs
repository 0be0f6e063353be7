//! Which avatars a front end should show, and where.
//!
//! A player present in the snapshot is shown at its position; a player missing
//! from it has left and is hidden.

use shared::{Position, Snapshot, ROSTER};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown(Position),
    Hidden,
}

/// Tracks the last visibility of every roster avatar between polls
#[derive(Debug)]
pub struct Avatars {
    avatars: BTreeMap<&'static str, Visibility>,
}

impl Avatars {
    pub fn new() -> Self {
        Self {
            avatars: ROSTER
                .into_iter()
                .map(|name| (name, Visibility::Hidden))
                .collect(),
        }
    }

    pub fn visibility(&self, name: &str) -> Option<Visibility> {
        self.avatars.get(name).copied()
    }

    /// Applies a snapshot and returns the avatars whose visibility changed.
    ///
    /// Names outside the roster have no sprite and are ignored.
    pub fn update(&mut self, snapshot: &Snapshot) -> Vec<(&'static str, Visibility)> {
        let mut changed = Vec::new();

        for (name, current) in self.avatars.iter_mut() {
            let next = match snapshot.get(*name) {
                Some(position) => Visibility::Shown(*position),
                None => Visibility::Hidden,
            };
            if *current != next {
                *current = next;
                changed.push((*name, next));
            }
        }

        changed
    }
}

impl Default for Avatars {
    fn default() -> Self {
        Self::new()
    }
}
