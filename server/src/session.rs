//! One client connection, driven from first byte to close.
//!
//! A session reads a request frame, applies it to the shared registry, answers
//! with the full snapshot and waits for the next frame. Any failure ends only
//! this session. Whatever the exit path, the player name the session last used
//! is removed from the registry exactly once: on the normal close path, or from
//! `Drop` if the task is cancelled first.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::registry::{PositionRegistry, SessionId};
use log::{debug, info, trace, warn};
use shared::{decode_message, encode_message, read_frame, write_frame, CommandEnvelope, Snapshot};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingMessage,
    Processing,
    Responded,
    Closed,
}

pub struct Session<S> {
    id: SessionId,
    peer: SocketAddr,
    stream: BufReader<S>,
    registry: Arc<PositionRegistry>,
    config: SessionConfig,
    /// Name from the most recent request, `None` until one decodes
    player: Option<String>,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        id: SessionId,
        stream: S,
        peer: SocketAddr,
        registry: Arc<PositionRegistry>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id,
            peer,
            stream: BufReader::new(stream),
            registry,
            config,
            player: None,
            state: SessionState::AwaitingMessage,
        }
    }

    /// Serves the connection until it closes, then cleans up.
    ///
    /// Returns the reason the session ended abnormally, if any. The error is
    /// informational; registry cleanup has already happened.
    pub async fn run(mut self) -> Result<(), SessionError> {
        info!("Session {} connected from {}", self.id, self.peer);

        let outcome = self.serve().await;
        match &outcome {
            Ok(()) => info!("Session {} ({}) closed by peer", self.id, self.peer),
            Err(e) => warn!("Session {} ({}) terminated: {}", self.id, self.peer, e),
        }

        self.close().await;
        outcome
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        loop {
            self.transition(SessionState::AwaitingMessage);
            let Some(frame) = self.next_frame().await? else {
                return Ok(());
            };

            self.transition(SessionState::Processing);
            debug!(
                "Session {} received: {}",
                self.id,
                String::from_utf8_lossy(&frame)
            );

            let envelope: CommandEnvelope = decode_message(&frame)?;
            let snapshot = self.apply(envelope)?;
            let payload = encode_message(&snapshot)?;

            debug!(
                "Session {} sent: {}",
                self.id,
                String::from_utf8_lossy(&payload)
            );
            write_frame(&mut self.stream, &payload).await?;
            self.transition(SessionState::Responded);
        }
    }

    async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        let read = read_frame(&mut self.stream, self.config.max_message_size);

        let frame = match self.config.idle_timeout {
            Some(limit) => timeout(limit, read)
                .await
                .map_err(|_| SessionError::IdleTimeout(limit))??,
            None => read.await?,
        };
        Ok(frame)
    }

    fn apply(&mut self, envelope: CommandEnvelope) -> Result<Snapshot, SessionError> {
        let CommandEnvelope { name, command } = envelope;

        if !self.config.reject_duplicate_names {
            // Shared names are allowed: last write wins and any session using
            // the name removes it on close.
            let snapshot = self.registry.apply_and_snapshot(&name, command);
            self.player = Some(name);
            return Ok(snapshot);
        }

        if self.player.as_deref().is_some_and(|current| current != name) {
            self.leave();
        }
        let snapshot = self.registry.apply_exclusive(&name, command, self.id)?;
        self.player = Some(name);
        Ok(snapshot)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Session {} shutdown: {}", self.id, e);
        }
        self.transition(SessionState::Closed);
        self.leave();
    }
}

impl<S> Session<S> {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            trace!("Session {} {:?} -> {:?}", self.id, self.state, next);
            self.state = next;
        }
    }

    /// Drops this session's player from the registry. Runs at most once per
    /// name because the name is taken out of the session.
    fn leave(&mut self) {
        let Some(name) = self.player.take() else {
            return;
        };

        let removed = if self.config.reject_duplicate_names {
            self.registry.release(&name, self.id)
        } else {
            self.registry.remove(&name).is_some()
        };

        if removed {
            info!("Player {} left ({})", name, self.peer);
        }
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        self.leave();
    }
}
