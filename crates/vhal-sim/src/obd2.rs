//! OBD2 diagnostic frames
//!
//! OBD2 live and freeze frames are complex properties: nothing is stored for
//! them. Each read builds a fresh frame from an [`Obd2SensorStore`], which
//! holds the integer and float sensor readings plus a bitmask marking which
//! sensors have been populated.
//!
//! The sensor store is sized from the catalog's frame config, whose
//! `config_array` carries `[vendor integer sensors, vendor float sensors]`
//! on top of the system-defined sensors.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use vhal_proto::{ids, PropertyConfig, PropertyValue, RawValue};

use crate::clock;
use crate::error::ProviderError;

/// Number of system-defined integer sensors
pub const SYSTEM_INTEGER_SENSORS: usize = 32;

/// Number of system-defined float sensors
pub const SYSTEM_FLOAT_SENSORS: usize = 69;

/// Diagnostic trouble code reported with freeze frames
pub const FREEZE_FRAME_DTC: &str = "P0010";

/// System integer sensor indices
pub mod integer_sensor {
    pub const FUEL_SYSTEM_STATUS: usize = 0;
    pub const MALFUNCTION_INDICATOR_LIGHT_ON: usize = 1;
    pub const IGNITION_MONITORS_SUPPORTED: usize = 2;
    pub const IGNITION_SPECIFIC_MONITORS: usize = 3;
    pub const INTAKE_AIR_TEMPERATURE: usize = 4;
    pub const COMMANDED_SECONDARY_AIR_STATUS: usize = 5;
    pub const NUM_OXYGEN_SENSORS_PRESENT: usize = 6;
    pub const RUNTIME_SINCE_ENGINE_START: usize = 7;
    pub const DISTANCE_TRAVELED_WITH_MALFUNCTION_INDICATOR_LIGHT_ON: usize = 8;
    pub const WARMUPS_SINCE_CODES_CLEARED: usize = 9;
    pub const DISTANCE_TRAVELED_SINCE_CODES_CLEARED: usize = 10;
    pub const ABSOLUTE_BAROMETRIC_PRESSURE: usize = 11;
    pub const CONTROL_MODULE_VOLTAGE: usize = 12;
    pub const AMBIENT_AIR_TEMPERATURE: usize = 13;
    pub const MAX_FUEL_AIR_EQUIVALENCE_RATIO: usize = 16;
    pub const FUEL_TYPE: usize = 21;
}

/// System float sensor indices
pub mod float_sensor {
    pub const CALCULATED_ENGINE_LOAD: usize = 0;
    pub const SHORT_TERM_FUEL_TRIM_BANK1: usize = 2;
    pub const LONG_TERM_FUEL_TRIM_BANK1: usize = 3;
    pub const SHORT_TERM_FUEL_TRIM_BANK2: usize = 4;
    pub const LONG_TERM_FUEL_TRIM_BANK2: usize = 5;
    pub const INTAKE_MANIFOLD_ABSOLUTE_PRESSURE: usize = 7;
    pub const ENGINE_RPM: usize = 8;
    pub const VEHICLE_SPEED: usize = 9;
    pub const TIMING_ADVANCE: usize = 10;
    pub const THROTTLE_POSITION: usize = 12;
    pub const OXYGEN_SENSOR1_VOLTAGE: usize = 13;
    pub const FUEL_TANK_LEVEL_INPUT: usize = 42;
    pub const EVAPORATION_SYSTEM_VAPOR_PRESSURE: usize = 43;
    pub const CATALYST_TEMPERATURE_BANK1_SENSOR1: usize = 44;
    pub const RELATIVE_THROTTLE_POSITION: usize = 50;
    pub const ABSOLUTE_THROTTLE_POSITION_B: usize = 51;
    pub const ACCELERATOR_PEDAL_POSITION_D: usize = 53;
    pub const ACCELERATOR_PEDAL_POSITION_E: usize = 54;
    pub const COMMANDED_THROTTLE_ACTUATOR: usize = 56;
}

// Encoded enum values used by the default readings
const FUEL_SYSTEM_CLOSED_LOOP: i32 = 2;
const IGNITION_MONITOR_SPARK: i32 = 0;
const SECONDARY_AIR_FROM_OUTSIDE_OR_OFF: i32 = 4;
const FUEL_TYPE_GASOLINE: i32 = 1;
const COMPONENTS_AVAILABLE: i32 = 1 << 0;
const MISFIRE_AVAILABLE: i32 = 1 << 4;
const AC_REFRIGERANT_AVAILABLE: i32 = 1 << 12;
const EVAPORATIVE_SYSTEM_AVAILABLE: i32 = 1 << 16;

const DEFAULT_INTEGER_READINGS: &[(usize, i32)] = &[
    (integer_sensor::FUEL_SYSTEM_STATUS, FUEL_SYSTEM_CLOSED_LOOP),
    (integer_sensor::MALFUNCTION_INDICATOR_LIGHT_ON, 0),
    (integer_sensor::IGNITION_MONITORS_SUPPORTED, IGNITION_MONITOR_SPARK),
    (
        integer_sensor::IGNITION_SPECIFIC_MONITORS,
        COMPONENTS_AVAILABLE | MISFIRE_AVAILABLE | AC_REFRIGERANT_AVAILABLE | EVAPORATIVE_SYSTEM_AVAILABLE,
    ),
    (integer_sensor::INTAKE_AIR_TEMPERATURE, 35),
    (integer_sensor::COMMANDED_SECONDARY_AIR_STATUS, SECONDARY_AIR_FROM_OUTSIDE_OR_OFF),
    (integer_sensor::NUM_OXYGEN_SENSORS_PRESENT, 1),
    (integer_sensor::RUNTIME_SINCE_ENGINE_START, 500),
    (integer_sensor::DISTANCE_TRAVELED_WITH_MALFUNCTION_INDICATOR_LIGHT_ON, 0),
    (integer_sensor::WARMUPS_SINCE_CODES_CLEARED, 51),
    (integer_sensor::DISTANCE_TRAVELED_SINCE_CODES_CLEARED, 365),
    (integer_sensor::ABSOLUTE_BAROMETRIC_PRESSURE, 30),
    (integer_sensor::CONTROL_MODULE_VOLTAGE, 12),
    (integer_sensor::AMBIENT_AIR_TEMPERATURE, 18),
    (integer_sensor::MAX_FUEL_AIR_EQUIVALENCE_RATIO, 1),
    (integer_sensor::FUEL_TYPE, FUEL_TYPE_GASOLINE),
];

const DEFAULT_FLOAT_READINGS: &[(usize, f32)] = &[
    (float_sensor::CALCULATED_ENGINE_LOAD, 0.153),
    (float_sensor::SHORT_TERM_FUEL_TRIM_BANK1, -0.16),
    (float_sensor::LONG_TERM_FUEL_TRIM_BANK1, -0.16),
    (float_sensor::SHORT_TERM_FUEL_TRIM_BANK2, -0.16),
    (float_sensor::LONG_TERM_FUEL_TRIM_BANK2, -0.16),
    (float_sensor::INTAKE_MANIFOLD_ABSOLUTE_PRESSURE, 7.5),
    (float_sensor::ENGINE_RPM, 1250.0),
    (float_sensor::VEHICLE_SPEED, 40.0),
    (float_sensor::TIMING_ADVANCE, 2.5),
    (float_sensor::THROTTLE_POSITION, 19.75),
    (float_sensor::OXYGEN_SENSOR1_VOLTAGE, 0.265),
    (float_sensor::FUEL_TANK_LEVEL_INPUT, 0.824),
    (float_sensor::EVAPORATION_SYSTEM_VAPOR_PRESSURE, -0.373),
    (float_sensor::CATALYST_TEMPERATURE_BANK1_SENSOR1, 190.0),
    (float_sensor::RELATIVE_THROTTLE_POSITION, 3.0),
    (float_sensor::ABSOLUTE_THROTTLE_POSITION_B, 0.306),
    (float_sensor::ACCELERATOR_PEDAL_POSITION_D, 0.188),
    (float_sensor::ACCELERATOR_PEDAL_POSITION_E, 0.094),
    (float_sensor::COMMANDED_THROTTLE_ACTUATOR, 0.024),
];

/// Sensor readings backing OBD2 frames
#[derive(Debug, Clone, PartialEq)]
pub struct Obd2SensorStore {
    integer_sensors: Vec<i32>,
    float_sensors: Vec<f32>,
    sensors_bitmask: Vec<u8>,
}

impl Obd2SensorStore {
    /// Create an empty store with room for vendor-specific sensors
    pub fn new(vendor_integer_sensors: usize, vendor_float_sensors: usize) -> Self {
        let ints = SYSTEM_INTEGER_SENSORS + vendor_integer_sensors;
        let floats = SYSTEM_FLOAT_SENSORS + vendor_float_sensors;
        Self {
            integer_sensors: vec![0; ints],
            float_sensors: vec![0.0; floats],
            sensors_bitmask: vec![0; (ints + floats).div_ceil(8)],
        }
    }

    /// Create a store sized from a frame config's `config_array`
    ///
    /// Missing or negative vendor counts are treated as zero.
    pub fn from_config(cfg: &PropertyConfig) -> Self {
        let vendor = |i: usize| {
            cfg.config_array
                .get(i)
                .and_then(|&n| usize::try_from(n).ok())
                .unwrap_or(0)
        };
        Self::new(vendor(0), vendor(1))
    }

    /// Store populated with the default emulated readings
    pub fn with_defaults(vendor_integer_sensors: usize, vendor_float_sensors: usize) -> Self {
        let mut store = Self::new(vendor_integer_sensors, vendor_float_sensors);
        store.fill_defaults();
        store
    }

    /// Write the default emulated readings
    pub fn fill_defaults(&mut self) {
        // Indices are within the system range, which every store covers
        for &(index, value) in DEFAULT_INTEGER_READINGS {
            let written = self.set_integer_sensor(index, value);
            debug_assert!(written.is_ok(), "default integer sensor {index} out of range");
        }
        for &(index, value) in DEFAULT_FLOAT_READINGS {
            let written = self.set_float_sensor(index, value);
            debug_assert!(written.is_ok(), "default float sensor {index} out of range");
        }
    }

    /// Record an integer reading and mark it present
    pub fn set_integer_sensor(&mut self, index: usize, value: i32) -> Result<(), ProviderError> {
        let count = self.integer_sensors.len();
        let slot = self
            .integer_sensors
            .get_mut(index)
            .ok_or(ProviderError::SensorOutOfRange {
                kind: "integer",
                index,
                count,
            })?;
        *slot = value;
        self.mark(index);
        Ok(())
    }

    /// Record a float reading and mark it present
    pub fn set_float_sensor(&mut self, index: usize, value: f32) -> Result<(), ProviderError> {
        let count = self.float_sensors.len();
        let slot = self
            .float_sensors
            .get_mut(index)
            .ok_or(ProviderError::SensorOutOfRange {
                kind: "float",
                index,
                count,
            })?;
        *slot = value;
        self.mark(self.integer_sensors.len() + index);
        Ok(())
    }

    // Integer sensors occupy the low bits, float sensors follow
    fn mark(&mut self, bit: usize) {
        self.sensors_bitmask[bit / 8] |= 1 << (bit % 8);
    }

    pub fn integer_sensors(&self) -> &[i32] {
        &self.integer_sensors
    }

    pub fn float_sensors(&self) -> &[f32] {
        &self.float_sensors
    }

    /// Presence bitmask, least significant bit first
    pub fn sensors_bitmask(&self) -> &[u8] {
        &self.sensors_bitmask
    }
}

/// Produces values for properties that are computed on read
pub trait ComputedPropertyProvider: Send + Sync {
    /// Whether this provider computes the property
    fn supports(&self, prop: i32) -> bool;

    /// Build the current value of a computed property
    fn compute(&self, prop: i32) -> Result<PropertyValue, ProviderError>;
}

/// Computed-property provider for OBD2 live and freeze frames
#[derive(Debug)]
pub struct Obd2Provider {
    sensors: Mutex<Obd2SensorStore>,
    supported: Vec<i32>,
}

impl Obd2Provider {
    /// Create a provider for the given frame properties
    pub fn new(sensors: Obd2SensorStore, supported: Vec<i32>) -> Self {
        Self {
            sensors: Mutex::new(sensors),
            supported,
        }
    }

    /// Build a provider for the OBD2 frames a catalog declares
    ///
    /// The live frame config sizes the sensor store; the freeze frame config
    /// is used when no live frame is declared. Returns `None` when the
    /// catalog has neither.
    pub fn from_catalog(configs: &[PropertyConfig]) -> Option<Self> {
        let find = |prop| configs.iter().find(|cfg| cfg.prop == prop);
        let live = find(ids::OBD2_LIVE_FRAME);
        let freeze = find(ids::OBD2_FREEZE_FRAME);
        let sizing = live.or(freeze)?;

        let mut sensors = Obd2SensorStore::from_config(sizing);
        sensors.fill_defaults();

        let supported: Vec<i32> = [live, freeze].into_iter().flatten().map(|cfg| cfg.prop).collect();
        info!(
            "OBD2 provider ready: {} integer sensors, {} float sensors",
            sensors.integer_sensors().len(),
            sensors.float_sensors().len()
        );
        Some(Self::new(sensors, supported))
    }

    fn lock(&self) -> MutexGuard<'_, Obd2SensorStore> {
        self.sensors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Update an integer reading for subsequent frames
    pub fn set_integer_sensor(&self, index: usize, value: i32) -> Result<(), ProviderError> {
        self.lock().set_integer_sensor(index, value)
    }

    /// Update a float reading for subsequent frames
    pub fn set_float_sensor(&self, index: usize, value: f32) -> Result<(), ProviderError> {
        self.lock().set_float_sensor(index, value)
    }

    fn frame(&self, prop: i32) -> RawValue {
        let sensors = self.lock();
        RawValue {
            int32_values: sensors.integer_sensors().to_vec(),
            float_values: sensors.float_sensors().to_vec(),
            bytes: sensors.sensors_bitmask().to_vec(),
            string_value: if prop == ids::OBD2_FREEZE_FRAME {
                FREEZE_FRAME_DTC.to_string()
            } else {
                String::new()
            },
            ..Default::default()
        }
    }
}

impl ComputedPropertyProvider for Obd2Provider {
    fn supports(&self, prop: i32) -> bool {
        self.supported.contains(&prop)
    }

    fn compute(&self, prop: i32) -> Result<PropertyValue, ProviderError> {
        if !self.supports(prop) {
            return Err(ProviderError::Unsupported(prop));
        }
        debug!("Building OBD2 frame for 0x{:08x}", prop);
        let mut value = PropertyValue::new(prop, 0, self.frame(prop));
        value.timestamp = clock::elapsed_nanos();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vhal_proto::{ChangeMode, PropertyAccess};

    fn frame_config(prop: i32, vendor: [i32; 2]) -> PropertyConfig {
        PropertyConfig::new(prop, PropertyAccess::Read, ChangeMode::OnChange).with_config_array(vendor)
    }

    #[test]
    fn test_sizing() {
        let store = Obd2SensorStore::new(0, 0);
        assert_eq!(store.integer_sensors().len(), 32);
        assert_eq!(store.float_sensors().len(), 69);
        // 101 bits
        assert_eq!(store.sensors_bitmask().len(), 13);

        let store = Obd2SensorStore::from_config(&frame_config(ids::OBD2_LIVE_FRAME, [3, 4]));
        assert_eq!(store.integer_sensors().len(), 35);
        assert_eq!(store.float_sensors().len(), 73);
        assert_eq!(store.sensors_bitmask().len(), 14);
    }

    #[test]
    fn test_negative_vendor_counts_are_zero() {
        let store = Obd2SensorStore::from_config(&frame_config(ids::OBD2_LIVE_FRAME, [-5, -1]));
        assert_eq!(store.integer_sensors().len(), 32);
        assert_eq!(store.float_sensors().len(), 69);

        let bare = PropertyConfig::new(ids::OBD2_LIVE_FRAME, PropertyAccess::Read, ChangeMode::OnChange);
        assert_eq!(Obd2SensorStore::from_config(&bare), Obd2SensorStore::new(0, 0));
    }

    #[test]
    fn test_bitmask_positions() {
        let mut store = Obd2SensorStore::new(0, 0);
        store.set_integer_sensor(1, 7).unwrap();
        store.set_integer_sensor(9, 7).unwrap();
        assert_eq!(store.sensors_bitmask()[0], 0b0000_0010);
        assert_eq!(store.sensors_bitmask()[1], 0b0000_0010);

        // Float index 0 lands on bit 32
        store.set_float_sensor(0, 1.0).unwrap();
        assert_eq!(store.sensors_bitmask()[4], 0b0000_0001);
    }

    #[test]
    fn test_out_of_range() {
        let mut store = Obd2SensorStore::new(0, 0);
        assert_eq!(
            store.set_integer_sensor(32, 1),
            Err(ProviderError::SensorOutOfRange {
                kind: "integer",
                index: 32,
                count: 32
            })
        );
        assert!(store.set_float_sensor(69, 1.0).is_err());
        assert!(store.sensors_bitmask().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_defaults() {
        let store = Obd2SensorStore::with_defaults(0, 0);
        assert_eq!(store.integer_sensors()[integer_sensor::FUEL_SYSTEM_STATUS], 2);
        assert_eq!(
            store.integer_sensors()[integer_sensor::IGNITION_SPECIFIC_MONITORS],
            1 | (1 << 4) | (1 << 12) | (1 << 16)
        );
        assert_eq!(store.float_sensors()[float_sensor::ENGINE_RPM], 1250.0);
        assert_eq!(store.float_sensors()[float_sensor::VEHICLE_SPEED], 40.0);

        let marked: u32 = store.sensors_bitmask().iter().map(|b| b.count_ones()).sum();
        assert_eq!(marked as usize, DEFAULT_INTEGER_READINGS.len() + DEFAULT_FLOAT_READINGS.len());
    }

    #[test]
    fn test_default_readings_fit_system_sensors() {
        assert!(DEFAULT_INTEGER_READINGS
            .iter()
            .all(|&(index, _)| index < SYSTEM_INTEGER_SENSORS));
        assert!(DEFAULT_FLOAT_READINGS
            .iter()
            .all(|&(index, _)| index < SYSTEM_FLOAT_SENSORS));
    }

    #[test]
    fn test_provider_from_catalog() {
        let configs = vec![
            frame_config(ids::OBD2_LIVE_FRAME, [2, 0]),
            frame_config(ids::OBD2_FREEZE_FRAME, [9, 9]),
        ];
        let provider = Obd2Provider::from_catalog(&configs).unwrap();
        assert!(provider.supports(ids::OBD2_LIVE_FRAME));
        assert!(provider.supports(ids::OBD2_FREEZE_FRAME));
        assert!(!provider.supports(ids::GEAR_SELECTION));

        let live = provider.compute(ids::OBD2_LIVE_FRAME).unwrap();
        assert_eq!(live.area_id, 0);
        assert_eq!(live.value.int32_values.len(), 34);
        assert_eq!(live.value.float_values.len(), 69);
        assert!(live.value.string_value.is_empty());
    }

    #[test]
    fn test_provider_freeze_only() {
        let provider =
            Obd2Provider::from_catalog(&[frame_config(ids::OBD2_FREEZE_FRAME, [0, 0])]).unwrap();
        assert!(!provider.supports(ids::OBD2_LIVE_FRAME));

        let freeze = provider.compute(ids::OBD2_FREEZE_FRAME).unwrap();
        assert_eq!(freeze.value.string_value, FREEZE_FRAME_DTC);
        assert_eq!(
            provider.compute(ids::OBD2_LIVE_FRAME),
            Err(ProviderError::Unsupported(ids::OBD2_LIVE_FRAME))
        );
    }

    #[test]
    fn test_provider_absent_without_frames() {
        let configs = vec![PropertyConfig::new(
            ids::GEAR_SELECTION,
            PropertyAccess::Read,
            ChangeMode::OnChange,
        )];
        assert!(Obd2Provider::from_catalog(&configs).is_none());
    }

    #[test]
    fn test_sensor_updates_visible_in_frames() {
        let provider =
            Obd2Provider::from_catalog(&[frame_config(ids::OBD2_LIVE_FRAME, [0, 0])]).unwrap();
        provider.set_float_sensor(float_sensor::VEHICLE_SPEED, 88.0).unwrap();
        let frame = provider.compute(ids::OBD2_LIVE_FRAME).unwrap();
        assert_eq!(frame.value.float_values[float_sensor::VEHICLE_SPEED], 88.0);
    }

    proptest! {
        #[test]
        fn test_bitmask_len_covers_all_sensors(ints in 0usize..64, floats in 0usize..64) {
            let store = Obd2SensorStore::new(ints, floats);
            let total = store.integer_sensors().len() + store.float_sensors().len();
            prop_assert!(store.sensors_bitmask().len() * 8 >= total);
            prop_assert!(store.sensors_bitmask().len() * 8 < total + 8);
        }

        #[test]
        fn test_single_float_sets_single_bit(index in 0usize..SYSTEM_FLOAT_SENSORS) {
            let mut store = Obd2SensorStore::new(0, 0);
            store.set_float_sensor(index, 1.0).unwrap();
            let bit = SYSTEM_INTEGER_SENSORS + index;
            let ones: u32 = store.sensors_bitmask().iter().map(|b| b.count_ones()).sum();
            prop_assert_eq!(ones, 1);
            prop_assert_eq!(store.sensors_bitmask()[bit / 8], 1u8 << (bit % 8));
        }
    }
}
