//! Vehicle Property Protocol Library
//!
//! This crate provides the data model of an emulated vehicle property bus
//! and the framed wire protocol a remote test harness uses to drive it:
//!
//! - **Property ids**: packed identifiers carrying group, area kind and
//!   value type ([`property`], [`ids`])
//! - **Values and configs**: [`PropertyValue`] for one (property, area)
//!   pair and [`PropertyConfig`] for a catalog entry
//! - **Wire schema**: protobuf records exchanged with the harness ([`wire`])
//! - **Codec**: length-prefixed frames decoded to [`Request`] and encoded
//!   from [`Response`] ([`codec`])
//!
//! # Example
//!
//! ```rust
//! use vhal_proto::{ids, DecodeMessage, EncodeMessage, Request, DEFAULT_MAX_FRAME_LEN};
//!
//! let frame = Request::GetProperty { prop: ids::GEAR_SELECTION, area_id: None }.encode_frame();
//! let decoded = Request::decode_frame(&frame, DEFAULT_MAX_FRAME_LEN).unwrap();
//! assert!(matches!(decoded, Request::GetProperty { prop: ids::GEAR_SELECTION, .. }));
//! ```

pub mod codec;
pub mod error;
pub mod ids;
pub mod property;
pub mod value;
pub mod wire;

pub use codec::{
    body_len, frame, unframe, DecodeMessage, EncodeMessage, Request, Response, ResponseKind,
    DEFAULT_MAX_FRAME_LEN, FRAME_HEADER_LEN,
};
pub use error::ParseError;
pub use property::{is_global, normalize_area, AreaKind, PropertyType};
pub use value::{AreaBounds, AreaConfig, ChangeMode, PropertyAccess, PropertyConfig, PropertyValue, RawValue};
pub use wire::{MsgType, Status};

/// TCP port the emulator listens on for the test harness
pub const DEBUG_SOCKET_PORT: u16 = 33452;
