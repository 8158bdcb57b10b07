//! Property values and configurations
//!
//! `PropertyValue` is the unit stored and exchanged for a single
//! (property id, area id) pair. `PropertyConfig` is the read-only
//! description of a supported property as supplied by a catalog.

use crate::property::{self, PropertyType};

/// Payload of a property value
///
/// Every variant is structurally present, but only the one selected by the
/// property's declared type carries data.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawValue {
    /// Used by BOOLEAN, INT32 and INT32_VEC properties
    pub int32_values: Vec<i32>,
    /// Used by INT64 properties
    pub int64_values: Vec<i64>,
    /// Used by FLOAT and FLOAT_VEC properties
    pub float_values: Vec<f32>,
    /// Used by STRING properties
    pub string_value: String,
    /// Used by BYTES properties
    pub bytes: Vec<u8>,
}

impl RawValue {
    /// Single int32 payload
    pub fn int32(value: i32) -> Self {
        Self {
            int32_values: vec![value],
            ..Default::default()
        }
    }

    /// Boolean payload (int32 0/1)
    pub fn boolean(value: bool) -> Self {
        Self::int32(value as i32)
    }

    /// Single int64 payload
    pub fn int64(value: i64) -> Self {
        Self {
            int64_values: vec![value],
            ..Default::default()
        }
    }

    /// Single float payload
    pub fn float(value: f32) -> Self {
        Self {
            float_values: vec![value],
            ..Default::default()
        }
    }

    /// String payload
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: value.into(),
            ..Default::default()
        }
    }

    /// Byte payload
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: value.into(),
            ..Default::default()
        }
    }

    /// Zero-valued payload sized for a declared type
    ///
    /// Numeric and boolean types get a single zero element, bytes get one
    /// zero byte, strings start empty. Complex values have no stored shape.
    pub fn zeroed(ty: PropertyType) -> Self {
        match ty {
            PropertyType::Boolean | PropertyType::Int32 | PropertyType::Int32Vec => Self::int32(0),
            PropertyType::Int64 => Self::int64(0),
            PropertyType::Float | PropertyType::FloatVec => Self::float(0.0),
            PropertyType::Bytes => Self::bytes(vec![0u8]),
            PropertyType::String | PropertyType::Complex => Self::default(),
        }
    }

    /// Whether this payload is a well-formed value of the given type
    ///
    /// Scalar types need exactly one element in their list, vector types at
    /// least one; every list not used by the type must be empty.
    pub fn matches(&self, ty: PropertyType) -> bool {
        let ints = self.int32_values.len();
        let longs = self.int64_values.len();
        let floats = self.float_values.len();
        let has_string = !self.string_value.is_empty();
        let has_bytes = !self.bytes.is_empty();

        match ty {
            PropertyType::Boolean | PropertyType::Int32 => {
                ints == 1 && longs == 0 && floats == 0 && !has_string && !has_bytes
            }
            PropertyType::Int32Vec => {
                ints >= 1 && longs == 0 && floats == 0 && !has_string && !has_bytes
            }
            PropertyType::Int64 => {
                ints == 0 && longs == 1 && floats == 0 && !has_string && !has_bytes
            }
            PropertyType::Float => {
                ints == 0 && longs == 0 && floats == 1 && !has_string && !has_bytes
            }
            PropertyType::FloatVec => {
                ints == 0 && longs == 0 && floats >= 1 && !has_string && !has_bytes
            }
            PropertyType::String => ints == 0 && longs == 0 && floats == 0 && !has_bytes,
            PropertyType::Bytes => ints == 0 && longs == 0 && floats == 0 && !has_string,
            PropertyType::Complex => false,
        }
    }
}

/// Current value of one (property id, area id) pair
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyValue {
    /// Property id
    pub prop: i32,
    /// Area id (0 for global properties)
    pub area_id: i32,
    /// Monotonic nanoseconds of the last update
    pub timestamp: i64,
    /// Payload
    pub value: RawValue,
}

impl PropertyValue {
    /// Create a value with a zero timestamp
    pub fn new(prop: i32, area_id: i32, value: RawValue) -> Self {
        Self {
            prop,
            area_id,
            timestamp: 0,
            value,
        }
    }

    /// Declared type of this value's property
    pub fn property_type(&self) -> Option<PropertyType> {
        PropertyType::of(self.prop)
    }
}

/// Access mode of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PropertyAccess {
    Read,
    Write,
    ReadWrite,
}

impl PropertyAccess {
    /// Wire code
    pub fn code(&self) -> i32 {
        match self {
            Self::Read => 1,
            Self::Write => 2,
            Self::ReadWrite => 3,
        }
    }

    /// Parse a wire code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Read),
            2 => Some(Self::Write),
            3 => Some(Self::ReadWrite),
            _ => None,
        }
    }
}

/// How a property reports changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChangeMode {
    /// Never changes
    Static,
    /// Reported when the value changes
    OnChange,
    /// Sampled continuously
    Continuous,
}

impl ChangeMode {
    /// Wire code
    pub fn code(&self) -> i32 {
        match self {
            Self::Static => 0,
            Self::OnChange => 1,
            Self::Continuous => 2,
        }
    }

    /// Parse a wire code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Static),
            1 => Some(Self::OnChange),
            2 => Some(Self::Continuous),
            _ => None,
        }
    }
}

/// Numeric bounds of one area; the variant follows the property type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum AreaBounds {
    Int32 { min: i32, max: i32 },
    Int64 { min: i64, max: i64 },
    Float { min: f32, max: f32 },
}

/// Per-area configuration of a property
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaConfig {
    /// Area the bounds apply to (0 for global properties)
    pub area_id: i32,
    /// Value bounds, if the property is numeric
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds: Option<AreaBounds>,
}

/// Static description of a supported property
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyConfig {
    /// Property id
    pub prop: i32,
    /// Access mode
    pub access: PropertyAccess,
    /// Change reporting mode
    pub change_mode: ChangeMode,
    /// Bitmask of supported area ids; ignored for global properties
    #[cfg_attr(feature = "serde", serde(default))]
    pub supported_areas: i32,
    /// Auxiliary configuration integers
    #[cfg_attr(feature = "serde", serde(default))]
    pub config_array: Vec<i32>,
    /// Optional descriptive string
    #[cfg_attr(feature = "serde", serde(default))]
    pub config_string: String,
    /// Per-area numeric bounds
    #[cfg_attr(feature = "serde", serde(default))]
    pub area_configs: Vec<AreaConfig>,
    /// Minimum sample rate in Hz (continuous properties)
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_sample_rate: f32,
    /// Maximum sample rate in Hz (continuous properties)
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_sample_rate: f32,
}

impl PropertyConfig {
    /// Create a global-style config with no areas, bounds or extras
    pub fn new(prop: i32, access: PropertyAccess, change_mode: ChangeMode) -> Self {
        Self {
            prop,
            access,
            change_mode,
            supported_areas: 0,
            config_array: Vec::new(),
            config_string: String::new(),
            area_configs: Vec::new(),
            min_sample_rate: 0.0,
            max_sample_rate: 0.0,
        }
    }

    /// Set the supported-area bitmask
    pub fn with_areas(mut self, mask: i32) -> Self {
        self.supported_areas = mask;
        self
    }

    /// Set the auxiliary configuration integers
    pub fn with_config_array(mut self, values: impl Into<Vec<i32>>) -> Self {
        self.config_array = values.into();
        self
    }

    /// Add bounds for one area
    pub fn with_bounds(mut self, area_id: i32, bounds: AreaBounds) -> Self {
        self.area_configs.push(AreaConfig {
            area_id,
            bounds: Some(bounds),
        });
        self
    }

    /// Declared value type of the property
    pub fn property_type(&self) -> Option<PropertyType> {
        PropertyType::of(self.prop)
    }

    /// Whether the property is global
    pub fn is_global(&self) -> bool {
        property::is_global(self.prop)
    }

    /// Concrete area ids this property is stored under
    ///
    /// A global property yields exactly `[0]` whatever its bitmask says; any
    /// other property yields one id per set bit of `supported_areas`. A
    /// non-global property with an empty mask still gets a single entry
    /// under area 0.
    pub fn area_ids(&self) -> Vec<i32> {
        if self.is_global() || self.supported_areas == 0 {
            return vec![0];
        }
        property::split_area_mask(self.supported_areas).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids;

    #[test]
    fn test_zeroed_sizing() {
        assert_eq!(RawValue::zeroed(PropertyType::Int32).int32_values, vec![0]);
        assert_eq!(RawValue::zeroed(PropertyType::Float).float_values, vec![0.0]);
        assert_eq!(RawValue::zeroed(PropertyType::Bytes).bytes, vec![0]);
        assert!(RawValue::zeroed(PropertyType::String).string_value.is_empty());
        assert_eq!(RawValue::zeroed(PropertyType::Complex), RawValue::default());
    }

    #[test]
    fn test_zeroed_matches_its_type() {
        for ty in [
            PropertyType::Boolean,
            PropertyType::Int32,
            PropertyType::Int32Vec,
            PropertyType::Int64,
            PropertyType::Float,
            PropertyType::FloatVec,
            PropertyType::String,
            PropertyType::Bytes,
        ] {
            assert!(RawValue::zeroed(ty).matches(ty), "{}", ty.name());
        }
    }

    #[test]
    fn test_matches_rejects_wrong_variant() {
        assert!(!RawValue::float(1.0).matches(PropertyType::Int32));
        assert!(!RawValue::int32(1).matches(PropertyType::Float));
        assert!(!RawValue::string("x").matches(PropertyType::Bytes));
        assert!(!RawValue::default().matches(PropertyType::Int32));
        assert!(!RawValue::int32(1).matches(PropertyType::Complex));

        let two = RawValue {
            int32_values: vec![1, 2],
            ..Default::default()
        };
        assert!(!two.matches(PropertyType::Int32));
        assert!(two.matches(PropertyType::Int32Vec));
    }

    #[test]
    fn test_area_ids_non_global() {
        let cfg = PropertyConfig::new(ids::HVAC_FAN_SPEED, PropertyAccess::ReadWrite, ChangeMode::OnChange)
            .with_areas(0b0101);
        assert_eq!(cfg.area_ids(), vec![0b0001, 0b0100]);
    }

    #[test]
    fn test_area_ids_global_ignores_mask() {
        let cfg = PropertyConfig::new(ids::GEAR_SELECTION, PropertyAccess::Read, ChangeMode::OnChange)
            .with_areas(0b0111);
        assert_eq!(cfg.area_ids(), vec![0]);
    }

    #[test]
    fn test_access_codes() {
        for access in [PropertyAccess::Read, PropertyAccess::Write, PropertyAccess::ReadWrite] {
            assert_eq!(PropertyAccess::from_code(access.code()), Some(access));
        }
        assert_eq!(PropertyAccess::from_code(0), None);
        assert_eq!(ChangeMode::from_code(ChangeMode::Continuous.code()), Some(ChangeMode::Continuous));
    }
}
