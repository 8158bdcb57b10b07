//! Host-facing vehicle HAL
//!
//! [`VehicleHal`] ties the catalog, the property store, the computed-property
//! providers and the transmit path together. It is the one place values are
//! read and written, whether the request comes from the socket or from the
//! hosting process.
//!
//! Every successful write emits exactly one notification carrying the
//! updated value on the channel passed to [`VehicleHal::new`]. The channel is
//! unbounded so a slow consumer never stalls the socket read loop.
//!
//! Writes are serialized: store update, push and notification for one write
//! complete before the next write starts, so the last pushed or notified
//! value always matches the stored one.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};
use vhal_proto::{normalize_area, PropertyConfig, PropertyValue, Response};
use vhal_sim::{ComputedPropertyProvider, Obd2Provider, PropertyCatalog, PropertyStore};

use crate::error::HalError;
use crate::transport::Transmitter;

/// Emulated vehicle HAL shared by the server and the host
pub struct VehicleHal {
    catalog: Arc<dyn PropertyCatalog>,
    store: PropertyStore,
    providers: Vec<Arc<dyn ComputedPropertyProvider>>,
    transmitter: Transmitter,
    events: mpsc::UnboundedSender<PropertyValue>,
    write_order: Mutex<()>,
}

impl VehicleHal {
    /// Build the HAL for a catalog
    ///
    /// Stored values are initialized from the catalog, and an OBD2 provider
    /// is registered when the catalog declares OBD2 frames.
    pub fn new(catalog: Arc<dyn PropertyCatalog>, events: mpsc::UnboundedSender<PropertyValue>) -> Self {
        let store = PropertyStore::initialize(catalog.configs());
        let providers: Vec<Arc<dyn ComputedPropertyProvider>> =
            match Obd2Provider::from_catalog(catalog.configs()) {
                Some(obd2) => vec![Arc::new(obd2)],
                None => Vec::new(),
            };

        info!(
            "Vehicle HAL ready: {} configs, {} stored values",
            catalog.configs().len(),
            store.len()
        );

        Self {
            catalog,
            store,
            providers,
            transmitter: Transmitter::new(),
            events,
            write_order: Mutex::new(()),
        }
    }

    /// Register an additional computed-property provider
    ///
    /// Providers are consulted in registration order, after the OBD2
    /// provider, and take precedence over stored values for the ids they
    /// support.
    pub fn with_provider(mut self, provider: Arc<dyn ComputedPropertyProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Every supported property config
    pub fn list_properties(&self) -> &[PropertyConfig] {
        self.catalog.configs()
    }

    /// Config for one property
    pub fn config(&self, prop: i32) -> Option<&PropertyConfig> {
        self.catalog.config(prop)
    }

    /// The stored values
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    /// Transmit path to the current connection
    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }

    /// Current value of a (property, area) pair
    ///
    /// Computed properties are built by their provider; everything else is
    /// copied from the store.
    pub fn get(&self, prop: i32, area_id: i32) -> Result<PropertyValue, HalError> {
        if let Some(provider) = self.providers.iter().find(|p| p.supports(prop)) {
            return Ok(provider.compute(prop)?);
        }
        Ok(self.store.get(prop, area_id)?)
    }

    /// Copy of every stored value
    pub fn snapshot(&self) -> Vec<PropertyValue> {
        self.store.snapshot()
    }

    /// Write a value from the hosting process
    ///
    /// On success the new value is pushed to the connected harness as a
    /// `SET_PROPERTY_ASYNC` message and a notification is emitted.
    pub async fn set(&self, value: &PropertyValue) -> Result<PropertyValue, HalError> {
        let _order = self.write_order.lock().await;
        let stored = self.store.set(value)?;

        // A failed push leaves the store updated; the read loop notices the
        // broken connection on its own.
        let _ = self
            .transmitter
            .send(&Response::async_update(stored.clone()))
            .await;

        self.notify(&stored);
        Ok(stored)
    }

    /// Write a value received from the harness
    ///
    /// Emits a notification but pushes nothing back; the reply to the
    /// command tells the harness the outcome.
    pub async fn apply_remote(&self, value: &PropertyValue) -> Result<PropertyValue, HalError> {
        let _order = self.write_order.lock().await;
        let stored = self.store.set(value)?;
        self.notify(&stored);
        Ok(stored)
    }

    fn notify(&self, value: &PropertyValue) {
        if self.events.send(value.clone()).is_err() {
            debug!(
                "Notification receiver gone, dropping update for 0x{:08x} area 0x{:x}",
                value.prop,
                normalize_area(value.prop, value.area_id)
            );
        }
    }
}

impl std::fmt::Debug for VehicleHal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleHal")
            .field("configs", &self.catalog.configs().len())
            .field("store", &self.store.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}
