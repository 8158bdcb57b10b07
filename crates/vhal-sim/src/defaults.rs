//! Seed values applied to stored properties at startup

use vhal_proto::ids::{self, driving_status, fan_direction, gear, ignition};
use vhal_proto::RawValue;

/// Seed for one property id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seed {
    /// First int32 element (booleans and enums included)
    Int32(i32),
    /// First float element
    Float(f32),
    /// String payload
    String(&'static str),
    /// Value is produced by a computed-property provider, not stored
    Computed,
}

/// Seed defaults keyed by property id
pub const SEEDS: &[(i32, Seed)] = &[
    (ids::INFO_MAKE, Seed::String("Default Car")),
    (ids::HVAC_POWER_ON, Seed::Int32(1)),
    (ids::HVAC_DEFROSTER, Seed::Int32(0)),
    (ids::HVAC_RECIRC_ON, Seed::Int32(1)),
    (ids::HVAC_AC_ON, Seed::Int32(1)),
    (ids::HVAC_AUTO_ON, Seed::Int32(1)),
    (ids::HVAC_FAN_SPEED, Seed::Int32(3)),
    (ids::HVAC_FAN_DIRECTION, Seed::Int32(fan_direction::FACE)),
    (ids::HVAC_TEMPERATURE_SET, Seed::Float(16.0)),
    (ids::NIGHT_MODE, Seed::Int32(0)),
    (ids::DRIVING_STATUS, Seed::Int32(driving_status::UNRESTRICTED)),
    (ids::GEAR_SELECTION, Seed::Int32(gear::PARK)),
    (ids::INFO_FUEL_CAPACITY, Seed::Float(0.75)),
    (ids::DISPLAY_BRIGHTNESS, Seed::Int32(7)),
    (ids::IGNITION_STATE, Seed::Int32(ignition::ON)),
    (ids::OBD2_LIVE_FRAME, Seed::Computed),
    (ids::OBD2_FREEZE_FRAME, Seed::Computed),
];

/// Look up the seed for a property id
pub fn seed_for(prop: i32) -> Option<Seed> {
    SEEDS
        .iter()
        .find(|(id, _)| *id == prop)
        .map(|(_, seed)| *seed)
}

impl Seed {
    /// Write the seed into a zero-sized payload
    ///
    /// Returns false when the payload has no slot of the seed's shape, in
    /// which case it is left untouched.
    pub fn apply(&self, value: &mut RawValue) -> bool {
        match *self {
            Seed::Int32(v) => match value.int32_values.first_mut() {
                Some(slot) => {
                    *slot = v;
                    true
                }
                None => false,
            },
            Seed::Float(v) => match value.float_values.first_mut() {
                Some(slot) => {
                    *slot = v;
                    true
                }
                None => false,
            },
            Seed::String(s) => {
                value.string_value = s.to_string();
                true
            }
            Seed::Computed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhal_proto::PropertyType;

    #[test]
    fn test_seed_lookup() {
        assert_eq!(seed_for(ids::GEAR_SELECTION), Some(Seed::Int32(gear::PARK)));
        assert_eq!(seed_for(ids::OBD2_LIVE_FRAME), Some(Seed::Computed));
        assert_eq!(seed_for(0x1140_0fff), None);
    }

    #[test]
    fn test_apply_into_zeroed() {
        let mut value = RawValue::zeroed(PropertyType::Float);
        assert!(Seed::Float(16.0).apply(&mut value));
        assert_eq!(value.float_values, vec![16.0]);

        let mut value = RawValue::zeroed(PropertyType::String);
        assert!(Seed::String("Default Car").apply(&mut value));
        assert_eq!(value.string_value, "Default Car");
    }

    #[test]
    fn test_apply_shape_mismatch_leaves_value() {
        let mut value = RawValue::zeroed(PropertyType::Float);
        assert!(!Seed::Int32(3).apply(&mut value));
        assert_eq!(value, RawValue::zeroed(PropertyType::Float));
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let mut ids: Vec<_> = SEEDS.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SEEDS.len());
    }
}
