//! Transmit path to the current connection
//!
//! Every frame sent to the test harness goes through [`Transmitter`]: replies
//! written by the read loop and unsolicited pushes triggered by direct sets.
//! The write half of the current connection lives behind one async mutex, so
//! a whole frame is written before any other sender gets the stream.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use vhal_proto::{EncodeMessage, Response};

use crate::error::ServerError;

/// Write half of a connection
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Shared handle to the current connection's write half
#[derive(Clone, Default)]
pub struct Transmitter {
    current: Arc<Mutex<Option<BoxedWriter>>>,
}

impl Transmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `writer` the current connection, replacing any previous one
    pub async fn attach(&self, writer: BoxedWriter) {
        let previous = self.current.lock().await.replace(writer);
        if previous.is_some() {
            warn!("Replacing an attached connection");
        }
    }

    /// Drop the current connection, shutting down its write half
    pub async fn detach(&self) {
        let writer = self.current.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.shutdown().await {
                debug!("Error shutting down connection: {}", e);
            }
        }
    }

    /// Whether a connection is attached
    pub async fn is_connected(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Encode and write one response frame
    ///
    /// Returns `Ok(false)` when no connection is attached; the frame is
    /// dropped.
    pub async fn send(&self, response: &Response) -> Result<bool, ServerError> {
        let frame = response.encode_frame();

        let mut current = self.current.lock().await;
        let Some(writer) = current.as_mut() else {
            debug!("No connection, dropping {:?} frame", response.kind);
            return Ok(false);
        };

        match write_frame(writer, &frame).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!("Failed to send {:?} frame: {}", response.kind, e);
                Err(ServerError::Io(e))
            }
        }
    }
}

async fn write_frame(writer: &mut BoxedWriter, frame: &[u8]) -> std::io::Result<()> {
    writer.write_all(frame).await?;
    writer.flush().await
}

impl std::fmt::Debug for Transmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transmitter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use vhal_proto::{ids, DecodeMessage, PropertyValue, RawValue, ResponseKind, Status};

    async fn read_frame<R: tokio::io::AsyncRead + Unpin>(reader: &mut R) -> Response {
        let mut header = [0u8; 4];
        reader.read_exact(&mut header).await.unwrap();
        let len = u32::from_ne_bytes(header) as usize;
        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await.unwrap();
        Response::decode(&body).unwrap()
    }

    #[tokio::test]
    async fn test_send_without_connection() {
        let tx = Transmitter::new();
        assert!(!tx.is_connected().await);
        let sent = tx
            .send(&Response::new(ResponseKind::GetConfigAll, Status::ResultOk))
            .await
            .unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_send_writes_frame() {
        let (client, server) = tokio::io::duplex(4096);
        let (_server_read, server_write) = tokio::io::split(server);
        let (mut client_read, _client_write) = tokio::io::split(client);

        let tx = Transmitter::new();
        tx.attach(Box::new(server_write)).await;
        assert!(tx.is_connected().await);

        let value = PropertyValue::new(ids::DISPLAY_BRIGHTNESS, 0, RawValue::int32(4));
        assert!(tx.send(&Response::async_update(value.clone())).await.unwrap());

        let received = read_frame(&mut client_read).await;
        assert_eq!(received.kind, ResponseKind::SetPropertyAsync);
        assert_eq!(received.values, vec![value]);

        tx.detach().await;
        assert!(!tx.is_connected().await);
    }

    #[tokio::test]
    async fn test_concurrent_sends_do_not_interleave() {
        let (client, server) = tokio::io::duplex(64);
        let (_server_read, server_write) = tokio::io::split(server);
        let (mut client_read, _client_write) = tokio::io::split(client);

        let tx = Transmitter::new();
        tx.attach(Box::new(server_write)).await;

        let senders: Vec<_> = (0..8)
            .map(|i| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let value = PropertyValue::new(
                        ids::INFO_MAKE,
                        0,
                        RawValue::string(format!("vehicle-{i}-").repeat(20)),
                    );
                    tx.send(&Response::async_update(value)).await.unwrap();
                })
            })
            .collect();

        let mut makes = Vec::new();
        for _ in 0..8 {
            let frame = read_frame(&mut client_read).await;
            makes.push(frame.values[0].value.string_value.clone());
        }
        for s in senders {
            s.await.unwrap();
        }

        makes.sort();
        let mut expected: Vec<_> = (0..8).map(|i| format!("vehicle-{i}-").repeat(20)).collect();
        expected.sort();
        assert_eq!(makes, expected);
    }
}
