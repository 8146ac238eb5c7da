//! `Content-Length: <decimal>\r\n\r\n<payload>` message framing.
//!
//! This is the wire contract the daemon and CLI speak to each other, chosen
//! to match the header-based framing of the system jerminal reimplements
//! rather than a bespoke binary length prefix.

use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed Content-Length header")]
    MalformedHeader,
    #[error("message of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },
    #[error("connection closed before a full message arrived")]
    ConnectionClosed,
}

pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
const SEPARATOR: &[u8] = b"\r\n\r\n";
const HEADER_PREFIX: &str = "Content-Length: ";

/// Wraps `payload` with its `Content-Length` header. Does not enforce
/// `MAX_MESSAGE_SIZE`; use [`write_message`] for a checked async write.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = format!("{HEADER_PREFIX}{}\r\n\r\n", payload.len()).into_bytes();
    out.extend_from_slice(payload);
    out
}

pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<(), FramingError> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(FramingError::TooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    writer.write_all(&frame(payload)).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one framed message, scanning byte by byte for the header separator
/// before reading the declared payload length. A scanner rather than a
/// buffered-reader split, since the header length itself is variable.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut header = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read_exact(&mut byte).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(FramingError::ConnectionClosed),
            Err(e) => return Err(FramingError::Io(e)),
        }
        header.push(byte[0]);
        if header.ends_with(SEPARATOR) {
            break;
        }
        if header.len() > 256 {
            return Err(FramingError::MalformedHeader);
        }
    }

    let header_line = std::str::from_utf8(&header[..header.len() - SEPARATOR.len()])
        .map_err(|_| FramingError::MalformedHeader)?;
    let content_length: usize = header_line
        .strip_prefix(HEADER_PREFIX)
        .ok_or(FramingError::MalformedHeader)?
        .trim()
        .parse()
        .map_err(|_| FramingError::MalformedHeader)?;

    if content_length > MAX_MESSAGE_SIZE {
        return Err(FramingError::TooLarge {
            size: content_length,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut payload = vec![0u8; content_length];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FramingError::ConnectionClosed
        } else {
            FramingError::Io(e)
        }
    })?;
    Ok(payload)
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
