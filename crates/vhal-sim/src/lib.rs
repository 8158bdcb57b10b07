//! Simulated Vehicle State
//!
//! This crate holds the state of the emulated vehicle behind the debug
//! socket. It includes:
//!
//! - **PropertyCatalog**: the static list of supported property configs
//! - **PropertyStore**: current values for every (property, area) pair
//! - **Obd2Provider**: OBD2 live and freeze frames computed on read
//!
//! # Example
//!
//! ```rust
//! use vhal_proto::ids::{self, gear};
//! use vhal_proto::{PropertyValue, RawValue};
//! use vhal_sim::{PropertyCatalog, PropertyStore, StaticCatalog};
//!
//! let catalog = StaticCatalog::builtin();
//! let store = PropertyStore::initialize(catalog.configs());
//!
//! store
//!     .set(&PropertyValue::new(ids::GEAR_SELECTION, 0, RawValue::int32(gear::DRIVE)))
//!     .unwrap();
//! let value = store.get(ids::GEAR_SELECTION, 0).unwrap();
//! assert_eq!(value.value.int32_values, vec![gear::DRIVE]);
//! ```

pub mod catalog;
pub mod clock;
pub mod defaults;
pub mod error;
pub mod obd2;
pub mod store;

pub use catalog::{PropertyCatalog, StaticCatalog};
pub use error::{CatalogError, ProviderError, StoreError};
pub use obd2::{ComputedPropertyProvider, Obd2Provider, Obd2SensorStore};
pub use store::{PropertyKey, PropertyStore};
