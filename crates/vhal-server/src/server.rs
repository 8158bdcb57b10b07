//! Debug socket server
//!
//! Listens on a TCP port and serves one test-harness connection at a time:
//!
//! ```text
//! Idle -> Listening -> (Accepted <-> Serving) -> Idle
//! ```
//!
//! The accept step is polled at a fixed interval so the shutdown flag is
//! observed promptly. Once a connection is accepted the read loop blocks on
//! it until the peer disconnects or sends a malformed frame; the server then
//! returns to listening. Shutdown is cooperative and only takes effect at the
//! accept step.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use vhal_proto::{body_len, DecodeMessage, Request, DEBUG_SOCKET_PORT, DEFAULT_MAX_FRAME_LEN, FRAME_HEADER_LEN};

use crate::dispatch::Dispatcher;
use crate::error::ServerError;
use crate::hal::VehicleHal;
use crate::transport::Transmitter;

/// Default accept poll interval in milliseconds
pub const DEFAULT_ACCEPT_POLL_MS: u64 = 100;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub address: SocketAddr,
    /// How often the accept step checks the shutdown flag
    pub accept_poll: Duration,
    /// Largest frame body accepted from the harness
    pub max_frame_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], DEBUG_SOCKET_PORT)),
            accept_poll: Duration::from_millis(DEFAULT_ACCEPT_POLL_MS),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl ServerConfig {
    /// Listen on `address` with default poll interval and frame limit
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Loopback address with an ephemeral port
    pub fn loopback() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    pub fn with_accept_poll(mut self, interval: Duration) -> Self {
        self.accept_poll = interval;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

/// Emulator debug socket server
#[derive(Debug)]
pub struct EmulatorServer {
    config: ServerConfig,
    hal: Arc<VehicleHal>,
    dispatcher: Dispatcher,
    shutdown: Arc<AtomicBool>,
}

impl EmulatorServer {
    pub fn new(config: ServerConfig, hal: Arc<VehicleHal>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(Arc::clone(&hal)),
            hal,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listening socket and run the server on a background task
    pub async fn spawn(self) -> Result<ServerHandle, ServerError> {
        let listener = TcpListener::bind(self.config.address).await.map_err(|e| {
            error!("Failed to bind {}: {}", self.config.address, e);
            ServerError::Io(e)
        })?;
        let local_addr = listener.local_addr()?;
        info!("Emulator server listening on {}", local_addr);

        let shutdown = Arc::clone(&self.shutdown);
        let task = tokio::spawn(async move { self.run(listener).await });

        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
        })
    }

    /// Accept and serve connections until shutdown is requested
    pub async fn run(self, listener: TcpListener) -> Result<(), ServerError> {
        while !self.shutdown.load(Ordering::Acquire) {
            let (stream, peer) = match timeout(self.config.accept_poll, listener.accept()).await {
                Err(_) => continue,
                Ok(Ok(accepted)) => accepted,
                Ok(Err(e)) => {
                    warn!("Accept failed: {}", e);
                    tokio::time::sleep(self.config.accept_poll).await;
                    continue;
                }
            };

            info!("Harness connected from {}", peer);
            if let Err(e) = stream.set_nodelay(true) {
                debug!("Could not set TCP_NODELAY: {}", e);
            }

            let (mut reader, writer) = stream.into_split();
            let tx = self.hal.transmitter();
            tx.attach(Box::new(writer)).await;

            match serve_connection(&mut reader, &self.dispatcher, tx, self.config.max_frame_len).await {
                Err(ServerError::PeerClosed) => debug!("Harness {} disconnected", peer),
                Err(ServerError::Malformed(e)) => {
                    warn!("Malformed frame from {}, closing connection: {}", peer, e)
                }
                Err(e) => warn!("Connection to {} failed: {}", peer, e),
                Ok(()) => {}
            }

            tx.detach().await;
        }

        info!("Emulator server stopped");
        Ok(())
    }
}

/// Read framed requests and transmit replies until the connection ends
///
/// Returns [`ServerError::PeerClosed`] on a clean or short read, and
/// [`ServerError::Malformed`] when a frame cannot be decoded.
pub async fn serve_connection<R>(
    reader: &mut R,
    dispatcher: &Dispatcher,
    tx: &Transmitter,
    max_frame_len: usize,
) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; FRAME_HEADER_LEN];

    loop {
        read_full(reader, &mut header).await?;
        let len = body_len(header, max_frame_len)?;

        let mut body = vec![0u8; len];
        read_full(reader, &mut body).await?;

        let request = Request::decode(&body)?;
        let response = dispatcher.dispatch(request).await;
        tx.send(&response).await?;
    }
}

async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), ServerError>
where
    R: AsyncRead + Unpin,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ServerError::PeerClosed),
        Err(e) => Err(ServerError::Io(e)),
    }
}

/// Handle to a running server
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Ask the server to stop at its next accept poll
    ///
    /// A connection being served is not interrupted; the server stops once
    /// that connection ends.
    pub fn shutdown(&self) {
        debug!("Shutdown requested for server on {}", self.local_addr);
        self.shutdown.store(true, Ordering::Release);
    }

    /// Whether the server task has finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the server task to finish
    pub async fn join(self) -> Result<(), ServerError> {
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, AsyncWriteExt};
    use tokio::sync::mpsc;
    use vhal_proto::ids::{self, gear};
    use vhal_proto::{EncodeMessage, ParseError, PropertyValue, RawValue, Response, ResponseKind};
    use vhal_sim::StaticCatalog;

    fn setup() -> (Arc<VehicleHal>, Dispatcher, mpsc::UnboundedReceiver<PropertyValue>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hal = Arc::new(VehicleHal::new(Arc::new(StaticCatalog::builtin()), tx));
        let dispatcher = Dispatcher::new(Arc::clone(&hal));
        (hal, dispatcher, rx)
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 33452);
        assert_eq!(config.accept_poll, Duration::from_millis(100));
        assert_eq!(config.max_frame_len, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_serve_replies_and_ends_on_eof() {
        let (hal, dispatcher, _rx) = setup();
        let (client, server) = duplex(64 * 1024);
        let (mut server_read, server_write) = split(server);
        let (mut client_read, mut client_write) = split(client);
        hal.transmitter().attach(Box::new(server_write)).await;

        let mut frames = Request::SetProperty(PropertyValue::new(
            ids::GEAR_SELECTION,
            0,
            RawValue::int32(gear::DRIVE),
        ))
        .encode_frame();
        frames.extend(Request::GetProperty { prop: ids::GEAR_SELECTION, area_id: None }.encode_frame());
        client_write.write_all(&frames).await.unwrap();
        client_write.shutdown().await.unwrap();

        let result = serve_connection(&mut server_read, &dispatcher, hal.transmitter(), 1024).await;
        assert!(matches!(result, Err(ServerError::PeerClosed)));

        hal.transmitter().detach().await;
        let mut received = Vec::new();
        client_read.read_to_end(&mut received).await.unwrap();
        let mut rest = received.as_slice();
        let mut responses = Vec::new();
        while rest.len() >= 4 {
            let len = u32::from_ne_bytes(rest[..4].try_into().unwrap()) as usize;
            responses.push(Response::decode(&rest[4..4 + len]).unwrap());
            rest = &rest[4 + len..];
        }

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].kind, ResponseKind::SetProperty);
        assert_eq!(responses[1].kind, ResponseKind::GetProperty);
        assert_eq!(responses[1].values[0].value.int32_values, vec![gear::DRIVE]);
    }

    #[tokio::test]
    async fn test_serve_rejects_empty_frame() {
        let (hal, dispatcher, _rx) = setup();
        let (client, server) = duplex(1024);
        let (mut server_read, _server_write) = split(server);
        let (_client_read, mut client_write) = split(client);

        client_write.write_all(&0u32.to_ne_bytes()).await.unwrap();

        let result = serve_connection(&mut server_read, &dispatcher, hal.transmitter(), 1024).await;
        assert!(matches!(result, Err(ServerError::Malformed(ParseError::EmptyFrame))));
    }

    #[tokio::test]
    async fn test_serve_rejects_oversize_frame() {
        let (hal, dispatcher, _rx) = setup();
        let (client, server) = duplex(1024);
        let (mut server_read, _server_write) = split(server);
        let (_client_read, mut client_write) = split(client);

        client_write.write_all(&4096u32.to_ne_bytes()).await.unwrap();

        let result = serve_connection(&mut server_read, &dispatcher, hal.transmitter(), 1024).await;
        assert!(matches!(
            result,
            Err(ServerError::Malformed(ParseError::Oversize { len: 4096, max: 1024 }))
        ));
    }

    #[tokio::test]
    async fn test_serve_short_body_is_peer_close() {
        let (hal, dispatcher, _rx) = setup();
        let (client, server) = duplex(1024);
        let (mut server_read, _server_write) = split(server);
        let (_client_read, mut client_write) = split(client);

        client_write.write_all(&16u32.to_ne_bytes()).await.unwrap();
        client_write.write_all(&[0u8; 3]).await.unwrap();
        client_write.shutdown().await.unwrap();

        let result = serve_connection(&mut server_read, &dispatcher, hal.transmitter(), 1024).await;
        assert!(matches!(result, Err(ServerError::PeerClosed)));
    }

    #[tokio::test]
    async fn test_shutdown_when_idle() {
        let (hal, _dispatcher, _rx) = setup();
        let config = ServerConfig::loopback().with_accept_poll(Duration::from_millis(10));
        let handle = EmulatorServer::new(config, hal).spawn().await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);

        handle.shutdown();
        tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .expect("server did not stop")
            .unwrap();
    }
}
