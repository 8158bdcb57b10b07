//! Vehicle HAL Emulator Server
//!
//! This crate exposes the simulated vehicle over the emulator debug socket.
//! It includes:
//!
//! - **VehicleHal**: host-facing get/set with change notifications
//! - **Dispatcher**: maps harness commands to HAL calls
//! - **EmulatorServer**: single-connection TCP server with a shared
//!   transmit path for replies and unsolicited updates
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tokio::sync::mpsc;
//! use vhal_server::{EmulatorServer, ServerConfig, VehicleHal};
//! use vhal_sim::StaticCatalog;
//!
//! # async fn example() -> Result<(), vhal_server::ServerError> {
//! let (events_tx, mut events_rx) = mpsc::unbounded_channel();
//! let hal = Arc::new(VehicleHal::new(Arc::new(StaticCatalog::builtin()), events_tx));
//!
//! let server = EmulatorServer::new(ServerConfig::default(), Arc::clone(&hal))
//!     .spawn()
//!     .await?;
//!
//! while let Some(value) = events_rx.recv().await {
//!     println!("0x{:08x} changed: {:?}", value.prop, value.value);
//! }
//!
//! server.shutdown();
//! server.join().await
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod hal;
pub mod server;
pub mod transport;

pub use dispatch::Dispatcher;
pub use error::{HalError, ServerError};
pub use hal::VehicleHal;
pub use server::{serve_connection, EmulatorServer, ServerConfig, ServerHandle};
pub use transport::{BoxedWriter, Transmitter};
