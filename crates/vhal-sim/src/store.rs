//! Property store
//!
//! Holds the current value of every (property id, area id) pair implied by
//! the catalog. The key space is fixed at initialization: writes replace
//! existing entries and never create new ones.
//!
//! All reads and writes of the value table go through a single mutex. The
//! lock is held for one lookup and copy, never across I/O, and callers only
//! ever receive independent copies.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use vhal_proto::{ids, normalize_area, PropertyConfig, PropertyType, PropertyValue, RawValue};

use crate::clock;
use crate::defaults::{self, Seed};
use crate::error::StoreError;

/// Key of a stored value: (property id, normalized area id)
pub type PropertyKey = (i32, i32);

/// Mutex-guarded table of current property values
#[derive(Debug)]
pub struct PropertyStore {
    /// Position of each key in `values`; immutable after construction
    index: HashMap<PropertyKey, usize>,
    /// Declared type of each entry, parallel to `values`
    types: Vec<PropertyType>,
    values: Mutex<Vec<PropertyValue>>,
}

impl PropertyStore {
    /// Expand a catalog into stored values
    ///
    /// Each config yields one entry per area (a single area-0 entry for
    /// global properties), sized for its declared type, seeded from the
    /// default table and stamped with the creation time. Complex properties
    /// are left to computed-property providers and are not stored.
    pub fn initialize(configs: &[PropertyConfig]) -> Self {
        let mut index = HashMap::new();
        let mut types = Vec::new();
        let mut values = Vec::new();
        let created = clock::elapsed_nanos();

        for cfg in configs {
            let Some(ty) = cfg.property_type() else {
                warn!("Skipping property 0x{:08x}: unknown value type", cfg.prop);
                continue;
            };

            if ty == PropertyType::Complex {
                match defaults::seed_for(cfg.prop) {
                    Some(Seed::Computed) => {
                        debug!("Property 0x{:08x} is served by a computed-property provider", cfg.prop)
                    }
                    _ => warn!("Complex property 0x{:08x} has no provider", cfg.prop),
                }
                continue;
            }

            let seed = defaults::seed_for(cfg.prop);
            if seed.is_none() {
                warn!("No default value for property 0x{:08x}, using zero", cfg.prop);
            }

            for area_id in cfg.area_ids() {
                let key = (cfg.prop, area_id);
                if index.contains_key(&key) {
                    warn!(
                        "Duplicate catalog entry for property 0x{:08x} area 0x{:x}",
                        cfg.prop, area_id
                    );
                    continue;
                }

                let mut raw = RawValue::zeroed(ty);
                if let Some(seed) = seed {
                    if !seed.apply(&mut raw) {
                        warn!(
                            "Default {:?} does not fit {} property 0x{:08x}",
                            seed,
                            ty.name(),
                            cfg.prop
                        );
                    }
                }

                index.insert(key, values.len());
                types.push(ty);
                values.push(PropertyValue {
                    timestamp: created,
                    ..PropertyValue::new(cfg.prop, area_id, raw)
                });
            }
        }

        debug!("Property store initialized with {} entries", values.len());

        Self {
            index,
            types,
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PropertyValue>> {
        // Entries are replaced whole under the lock, so a poisoned table is
        // still consistent.
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn position(&self, prop: i32, area_id: i32) -> Result<usize, StoreError> {
        let area = normalize_area(prop, area_id);
        self.index.get(&(prop, area)).copied().ok_or_else(|| {
            warn!(
                "Property not found: {} (0x{:08x}) area 0x{:x}",
                ids::name(prop).unwrap_or("unknown"),
                prop,
                area
            );
            StoreError::NotFound { prop, area }
        })
    }

    /// Copy out the current value of a (property, area) pair
    ///
    /// Global properties are looked up under area 0 whatever `area_id` is.
    pub fn get(&self, prop: i32, area_id: i32) -> Result<PropertyValue, StoreError> {
        let pos = self.position(prop, area_id)?;
        Ok(self.lock()[pos].clone())
    }

    /// Replace the payload of an existing entry and stamp it
    ///
    /// Returns the value as stored, with its normalized area and new
    /// timestamp.
    pub fn set(&self, value: &PropertyValue) -> Result<PropertyValue, StoreError> {
        let pos = self.position(value.prop, value.area_id)?;
        let expected = self.types[pos];
        if !value.value.matches(expected) {
            return Err(StoreError::TypeMismatch {
                prop: value.prop,
                expected,
            });
        }

        let mut values = self.lock();
        let entry = &mut values[pos];
        entry.value = value.value.clone();
        entry.timestamp = clock::elapsed_nanos();
        Ok(entry.clone())
    }

    /// Copy of every stored value, in catalog order
    pub fn snapshot(&self) -> Vec<PropertyValue> {
        self.lock().clone()
    }

    /// Whether an entry exists for the (property, area) pair
    pub fn contains(&self, prop: i32, area_id: i32) -> bool {
        self.index.contains_key(&(prop, normalize_area(prop, area_id)))
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
