use crate::error::ClientError;
use log::{debug, info};
use shared::{
    decode_message, encode_message, read_frame, write_frame, Command, CommandEnvelope, Snapshot,
    MAX_SNAPSHOT_SIZE,
};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Connection to the position server on behalf of one player.
///
/// Input sources push commands through [`command_sender`](Self::command_sender)
/// from any task; each [`poll`](Self::poll) sends the oldest queued command, or
/// `none` when the queue is empty, and stores the snapshot the server returns.
pub struct GameClient {
    stream: BufReader<TcpStream>,
    player: String,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    player_locations: Snapshot,
}

impl GameClient {
    /// Connects to `server`, given as `host:port`.
    pub async fn connect(server: &str, player: impl Into<String>) -> Result<Self, ClientError> {
        info!("Connecting to {}", server);
        let stream = TcpStream::connect(server)
            .await
            .map_err(|source| ClientError::Connect {
                addr: server.to_string(),
                source,
            })?;
        // Requests are tiny and latency-bound.
        let _ = stream.set_nodelay(true);

        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Ok(GameClient {
            stream: BufReader::new(stream),
            player: player.into(),
            command_tx,
            command_rx,
            player_locations: Snapshot::new(),
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn command_sender(&self) -> mpsc::UnboundedSender<Command> {
        self.command_tx.clone()
    }

    pub fn queue(&self, command: Command) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.command_tx.send(command);
    }

    /// Sends the next command and waits for the resulting snapshot.
    pub async fn poll(&mut self) -> Result<&Snapshot, ClientError> {
        let command = self.command_rx.try_recv().unwrap_or_default();
        let envelope = CommandEnvelope::new(self.player.as_str(), command);

        let payload = encode_message(&envelope)?;
        debug!("message sent: {}", String::from_utf8_lossy(&payload));
        write_frame(&mut self.stream, &payload).await?;

        let frame = read_frame(&mut self.stream, MAX_SNAPSHOT_SIZE)
            .await?
            .ok_or(ClientError::Disconnected)?;
        debug!("message received: {}", String::from_utf8_lossy(&frame));

        self.player_locations = decode_message(&frame)?;
        Ok(&self.player_locations)
    }

    /// Snapshot from the most recent successful poll
    pub fn player_locations(&self) -> &Snapshot {
        &self.player_locations
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        info!("Closing connection");
        self.stream
            .shutdown()
            .await
            .map_err(|e| ClientError::Protocol(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Position;
    use tokio::net::TcpListener;

    /// Minimal stand-in server that checks each request and replies with a fixed snapshot.
    async fn scripted_server(expected: Vec<&'static str>, reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufReader::new(stream);
            for line in expected {
                let frame = read_frame(&mut stream, 1024).await.unwrap().unwrap();
                assert_eq!(String::from_utf8(frame).unwrap(), line);
                write_frame(&mut stream, reply.as_bytes()).await.unwrap();
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_poll_sends_none_when_idle() {
        let addr = scripted_server(
            vec![r#"{"name":"musk","command":"none"}"#],
            r#"{"musk":{"x":0,"y":0}}"#,
        )
        .await;

        let mut client = GameClient::connect(&addr, "musk").await.unwrap();
        let snapshot = client.poll().await.unwrap();

        assert_eq!(snapshot["musk"], Position::new(0, 0));
    }

    #[tokio::test]
    async fn test_poll_drains_queue_in_order() {
        let addr = scripted_server(
            vec![
                r#"{"name":"bruno","command":"up"}"#,
                r#"{"name":"bruno","command":"left"}"#,
                r#"{"name":"bruno","command":"none"}"#,
            ],
            r#"{"bruno":{"x":-1,"y":-1}}"#,
        )
        .await;

        let mut client = GameClient::connect(&addr, "bruno").await.unwrap();
        client.queue(Command::Up);
        client.command_sender().send(Command::Left).unwrap();

        for _ in 0..3 {
            client.poll().await.unwrap();
        }

        assert_eq!(
            client.player_locations().get("bruno"),
            Some(&Position::new(-1, -1))
        );
    }

    #[tokio::test]
    async fn test_poll_reports_disconnect() {
        let addr = scripted_server(vec![], "{}").await;

        let mut client = GameClient::connect(&addr, "beck").await.unwrap();
        let result = client.poll().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = GameClient::connect(&addr, "musk").await;

        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }
}
