//! Error types for the simulated vehicle

use thiserror::Error;
use vhal_proto::PropertyType;

/// Errors returned by the property store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No entry exists for the (property, area) pair
    #[error("property 0x{prop:08x} area 0x{area:x} not found")]
    NotFound { prop: i32, area: i32 },

    /// Written payload does not match the declared property type
    #[error("property 0x{prop:08x} expects a {} payload", .expected.name())]
    TypeMismatch { prop: i32, expected: PropertyType },
}

/// Errors returned by computed-property providers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider does not compute this property
    #[error("property 0x{0:08x} is not computed by this provider")]
    Unsupported(i32),

    /// Sensor index outside the frame
    #[error("{kind} sensor index {index} out of range (frame has {count})")]
    SensorOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },
}

/// Errors loading a property catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// I/O error reading the catalog file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON for the schema
    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
}
