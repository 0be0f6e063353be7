//! Newline-delimited JSON framing.
//!
//! TCP is a byte stream, so a single read may carry half a message or three of
//! them. Every message travels as one JSON document followed by `\n`, and the
//! reader buffers until it sees the terminator.

use crate::ProtocolError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const DELIMITER: u8 = b'\n';

/// Reads the next frame, without its terminator.
///
/// Returns `Ok(None)` once the peer has closed the stream. A trailing frame
/// with no terminator before end-of-stream is still returned. Frames longer
/// than `max_len` fail with [`ProtocolError::FrameTooLarge`] rather than
/// growing the buffer without bound.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut frame = Vec::new();
    // Room for the payload plus a `\r\n` terminator.
    let limit = max_len as u64 + 2;
    let read = (&mut *reader)
        .take(limit)
        .read_until(DELIMITER, &mut frame)
        .await?;

    if read == 0 {
        return Ok(None);
    }

    if frame.last() == Some(&DELIMITER) {
        frame.pop();
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
    }
    if frame.len() > max_len {
        return Err(ProtocolError::FrameTooLarge { limit: max_len });
    }

    Ok(Some(frame))
}

/// Writes `payload` followed by the terminator and flushes.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.extend_from_slice(payload);
    frame.push(DELIMITER);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub fn encode_message<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode_message<T: DeserializeOwned>(frame: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(frame)?)
}
