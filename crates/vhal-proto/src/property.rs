//! Property identifier layout
//!
//! A vehicle property id is a packed 32-bit integer:
//!
//! ```text
//! 0x 1 1 40 0400
//!    | | |  +----- index within the group
//!    | | +-------- value type     (PropertyType::MASK)
//!    | +---------- area kind      (AreaKind::MASK)
//!    +------------ property group (GROUP_MASK)
//! ```
//!
//! The declared type of a property and whether it is global are both
//! derived from the id alone, never from a value.

/// Mask selecting the property group nibble
pub const GROUP_MASK: i32 = 0xf000_0000_u32 as i32;

/// System property group
pub const GROUP_SYSTEM: i32 = 0x1000_0000;

/// Vendor property group
pub const GROUP_VENDOR: i32 = 0x2000_0000;

/// Value type declared by a property id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PropertyType {
    /// UTF-8 string payload
    String,
    /// Boolean carried as a single int32 (0 or 1)
    Boolean,
    /// Single int32
    Int32,
    /// List of int32
    Int32Vec,
    /// Single int64
    Int64,
    /// Single float
    Float,
    /// List of floats
    FloatVec,
    /// Opaque byte sequence
    Bytes,
    /// Structured value assembled by a provider (never stored)
    Complex,
}

impl PropertyType {
    /// Mask selecting the type byte of a property id
    pub const MASK: i32 = 0x00ff_0000;

    /// Extract the declared type from a property id
    pub fn of(prop: i32) -> Option<Self> {
        match prop & Self::MASK {
            0x0010_0000 => Some(Self::String),
            0x0020_0000 => Some(Self::Boolean),
            0x0040_0000 => Some(Self::Int32),
            0x0041_0000 => Some(Self::Int32Vec),
            0x0050_0000 => Some(Self::Int64),
            0x0060_0000 => Some(Self::Float),
            0x0061_0000 => Some(Self::FloatVec),
            0x0070_0000 => Some(Self::Bytes),
            0x00e0_0000 => Some(Self::Complex),
            _ => None,
        }
    }

    /// The type bits as they appear inside a property id (and on the wire)
    pub fn code(&self) -> i32 {
        match self {
            Self::String => 0x0010_0000,
            Self::Boolean => 0x0020_0000,
            Self::Int32 => 0x0040_0000,
            Self::Int32Vec => 0x0041_0000,
            Self::Int64 => 0x0050_0000,
            Self::Float => 0x0060_0000,
            Self::FloatVec => 0x0061_0000,
            Self::Bytes => 0x0070_0000,
            Self::Complex => 0x00e0_0000,
        }
    }

    /// Returns a human-readable name for the type
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Int32 => "int32",
            Self::Int32Vec => "int32[]",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::FloatVec => "float[]",
            Self::Bytes => "bytes",
            Self::Complex => "complex",
        }
    }
}

/// Kind of area a property is qualified by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AreaKind {
    /// Not area specific; stored under area id 0
    Global,
    /// HVAC zone
    Zone,
    /// Window
    Window,
    /// Mirror
    Mirror,
    /// Seat
    Seat,
    /// Door
    Door,
}

impl AreaKind {
    /// Mask selecting the area nibble of a property id
    pub const MASK: i32 = 0x0f00_0000;

    /// Extract the area kind from a property id
    pub fn of(prop: i32) -> Option<Self> {
        match prop & Self::MASK {
            0x0100_0000 => Some(Self::Global),
            0x0200_0000 => Some(Self::Zone),
            0x0300_0000 => Some(Self::Window),
            0x0400_0000 => Some(Self::Mirror),
            0x0500_0000 => Some(Self::Seat),
            0x0600_0000 => Some(Self::Door),
            _ => None,
        }
    }
}

/// Whether a property has a single value independent of area
pub fn is_global(prop: i32) -> bool {
    AreaKind::of(prop) == Some(AreaKind::Global)
}

/// Area id under which a property value is stored
///
/// Global properties always live under area id 0 regardless of what the
/// caller asked for.
pub fn normalize_area(prop: i32, area_id: i32) -> i32 {
    if is_global(prop) {
        0
    } else {
        area_id
    }
}

/// Iterate the single-bit area ids set in a supported-area bitmask,
/// lowest bit first
pub fn split_area_mask(mask: i32) -> impl Iterator<Item = i32> {
    let mut remaining = mask;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let rest = remaining & remaining.wrapping_sub(1);
        let area = remaining ^ rest;
        remaining = rest;
        Some(area)
    })
}
