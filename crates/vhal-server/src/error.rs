//! Error types for the emulator server

use thiserror::Error;
use vhal_proto::{ParseError, PropertyType, Status};
use vhal_sim::{ProviderError, StoreError};

/// Errors returned by [`VehicleHal`](crate::VehicleHal) reads and writes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HalError {
    /// No stored or computed value for the (property, area) pair
    #[error("invalid property 0x{prop:08x} area 0x{area:x}")]
    InvalidProperty { prop: i32, area: i32 },

    /// Written payload does not fit the property's declared type
    #[error("property 0x{prop:08x} expects a {} payload", .expected.name())]
    TypeMismatch { prop: i32, expected: PropertyType },

    /// A computed-property provider failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl HalError {
    /// Result code reported to the test harness
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidProperty { .. } => Status::ErrorInvalidProperty,
            Self::TypeMismatch { .. } => Status::ErrorInvalidOperation,
            Self::Provider(ProviderError::Unsupported(_)) => Status::ErrorInvalidProperty,
            Self::Provider(_) => Status::ErrorUnknown,
        }
    }
}

impl From<StoreError> for HalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { prop, area } => Self::InvalidProperty { prop, area },
            StoreError::TypeMismatch { prop, expected } => Self::TypeMismatch { prop, expected },
        }
    }
}

/// Errors that end a connection or the server itself
#[derive(Debug, Error)]
pub enum ServerError {
    /// Peer closed the connection (normal end of a session)
    #[error("peer closed the connection")]
    PeerClosed,

    /// Frame could not be decoded
    #[error("malformed frame: {0}")]
    Malformed(#[from] ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server task panicked or was cancelled
    #[error("server task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err = HalError::from(StoreError::NotFound { prop: 1, area: 0 });
        assert_eq!(err.status(), Status::ErrorInvalidProperty);

        let err = HalError::from(StoreError::TypeMismatch {
            prop: 1,
            expected: PropertyType::Int32,
        });
        assert_eq!(err.status(), Status::ErrorInvalidOperation);

        let err = HalError::from(ProviderError::SensorOutOfRange {
            kind: "float",
            index: 99,
            count: 69,
        });
        assert_eq!(err.status(), Status::ErrorUnknown);
    }
}
