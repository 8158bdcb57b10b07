//! Framed request/response codec
//!
//! # Frame Format
//! ```text
//! [len: u32, native byte order] [body: len bytes]
//! ```
//!
//! The body is one protobuf-encoded [`EmulatorMessage`]. Requests decode to
//! [`Request`], responses (including the unsolicited `SetPropertyAsync`
//! push) are built as [`Response`]. Both directions are implemented so the
//! same codec serves the emulator and a test-harness client.

use prost::Message;

use crate::error::ParseError;
use crate::property::{self, PropertyType};
use crate::value::{AreaBounds, AreaConfig, ChangeMode, PropertyAccess, PropertyConfig, PropertyValue, RawValue};
use crate::wire::{self, EmulatorMessage, MsgType, Status};

/// Size of the length prefix
pub const FRAME_HEADER_LEN: usize = 4;

/// Default upper bound on a frame body
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Decoded command from the test harness
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Config of one property
    GetConfig { prop: i32 },
    /// Every config in the catalog
    GetConfigAll,
    /// Current value of one property; area defaults to 0
    GetProperty { prop: i32, area_id: Option<i32> },
    /// Snapshot of every stored value
    GetPropertyAll,
    /// Write one value
    SetProperty(PropertyValue),
    /// Any message kind that is not a command
    Unimplemented { msg_type: i32 },
}

/// Kind of a response message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    GetConfig,
    GetConfigAll,
    GetProperty,
    GetPropertyAll,
    SetProperty,
    /// Server-initiated notification of a value change
    SetPropertyAsync,
    /// Reply to an unrecognized command; echoes its raw kind
    Unimplemented { msg_type: i32 },
}

impl ResponseKind {
    /// Raw message kind written on the wire
    pub fn msg_type(&self) -> i32 {
        match self {
            Self::GetConfig => MsgType::GetConfigResp as i32,
            Self::GetConfigAll => MsgType::GetConfigAllResp as i32,
            Self::GetProperty => MsgType::GetPropertyResp as i32,
            Self::GetPropertyAll => MsgType::GetPropertyAllResp as i32,
            Self::SetProperty => MsgType::SetPropertyResp as i32,
            Self::SetPropertyAsync => MsgType::SetPropertyAsync as i32,
            Self::Unimplemented { msg_type } => *msg_type,
        }
    }
}

/// Reply (or push) to the test harness
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Message kind
    pub kind: ResponseKind,
    /// Result code
    pub status: Status,
    /// Config records
    pub configs: Vec<PropertyConfig>,
    /// Value records
    pub values: Vec<PropertyValue>,
}

impl Response {
    /// Create a response without records
    pub fn new(kind: ResponseKind, status: Status) -> Self {
        Self {
            kind,
            status,
            configs: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Attach config records
    pub fn with_configs(mut self, configs: Vec<PropertyConfig>) -> Self {
        self.configs = configs;
        self
    }

    /// Attach value records
    pub fn with_values(mut self, values: Vec<PropertyValue>) -> Self {
        self.values = values;
        self
    }

    /// Unsolicited notification carrying an updated value
    pub fn async_update(value: PropertyValue) -> Self {
        Self::new(ResponseKind::SetPropertyAsync, Status::ResultOk).with_values(vec![value])
    }

    /// Whether the status is `RESULT_OK`
    pub fn is_ok(&self) -> bool {
        self.status == Status::ResultOk
    }

    fn to_message(&self) -> EmulatorMessage {
        EmulatorMessage {
            msg_type: self.kind.msg_type(),
            status: Some(self.status as i32),
            prop: Vec::new(),
            config: self.configs.iter().map(wire::VehiclePropConfig::from).collect(),
            value: self.values.iter().map(wire::VehiclePropValue::from).collect(),
        }
    }

    fn from_message(msg: EmulatorMessage) -> Result<Self, ParseError> {
        let raw_status = msg.status.unwrap_or(Status::ResultOk as i32);
        let status = Status::try_from(raw_status).map_err(|_| ParseError::InvalidField {
            field: "status",
            value: raw_status,
        })?;

        let kind = match MsgType::try_from(msg.msg_type) {
            Ok(MsgType::GetConfigResp) => ResponseKind::GetConfig,
            Ok(MsgType::GetConfigAllResp) => ResponseKind::GetConfigAll,
            Ok(MsgType::GetPropertyResp) => ResponseKind::GetProperty,
            Ok(MsgType::GetPropertyAllResp) => ResponseKind::GetPropertyAll,
            Ok(MsgType::SetPropertyResp) => ResponseKind::SetProperty,
            Ok(MsgType::SetPropertyAsync) => ResponseKind::SetPropertyAsync,
            _ if status == Status::ErrorUnimplementedCmd => ResponseKind::Unimplemented {
                msg_type: msg.msg_type,
            },
            _ => {
                return Err(ParseError::InvalidField {
                    field: "msg_type",
                    value: msg.msg_type,
                })
            }
        };

        let configs = msg
            .config
            .into_iter()
            .map(PropertyConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let values = msg.value.into_iter().map(PropertyValue::from).collect();

        Ok(Self {
            kind,
            status,
            configs,
            values,
        })
    }
}

impl Request {
    fn to_message(&self) -> EmulatorMessage {
        let mut msg = EmulatorMessage {
            msg_type: self.msg_type(),
            ..Default::default()
        };
        match self {
            Self::GetConfig { prop } => msg.prop.push(wire::VehiclePropGet {
                prop: *prop,
                area_id: None,
            }),
            Self::GetProperty { prop, area_id } => msg.prop.push(wire::VehiclePropGet {
                prop: *prop,
                area_id: *area_id,
            }),
            Self::SetProperty(value) => msg.value.push(wire::VehiclePropValue::from(value)),
            Self::GetConfigAll | Self::GetPropertyAll | Self::Unimplemented { .. } => {}
        }
        msg
    }

    fn from_message(msg: EmulatorMessage) -> Result<Self, ParseError> {
        let request = match MsgType::try_from(msg.msg_type) {
            Ok(MsgType::GetConfigCmd) => {
                let get = msg.prop.first().ok_or(ParseError::MissingRecord {
                    command: "GET_CONFIG_CMD",
                    record: "prop",
                })?;
                Self::GetConfig { prop: get.prop }
            }
            Ok(MsgType::GetConfigAllCmd) => Self::GetConfigAll,
            Ok(MsgType::GetPropertyCmd) => {
                let get = msg.prop.first().ok_or(ParseError::MissingRecord {
                    command: "GET_PROPERTY_CMD",
                    record: "prop",
                })?;
                Self::GetProperty {
                    prop: get.prop,
                    area_id: get.area_id,
                }
            }
            Ok(MsgType::GetPropertyAllCmd) => Self::GetPropertyAll,
            Ok(MsgType::SetPropertyCmd) => {
                let value = msg.value.into_iter().next().ok_or(ParseError::MissingRecord {
                    command: "SET_PROPERTY_CMD",
                    record: "value",
                })?;
                Self::SetProperty(PropertyValue::from(value))
            }
            _ => Self::Unimplemented {
                msg_type: msg.msg_type,
            },
        };
        Ok(request)
    }

    /// Raw message kind written on the wire
    pub fn msg_type(&self) -> i32 {
        match self {
            Self::GetConfig { .. } => MsgType::GetConfigCmd as i32,
            Self::GetConfigAll => MsgType::GetConfigAllCmd as i32,
            Self::GetProperty { .. } => MsgType::GetPropertyCmd as i32,
            Self::GetPropertyAll => MsgType::GetPropertyAllCmd as i32,
            Self::SetProperty(_) => MsgType::SetPropertyCmd as i32,
            Self::Unimplemented { msg_type } => *msg_type,
        }
    }
}

/// Messages that can be encoded to a frame body
pub trait EncodeMessage {
    /// Encode to a protobuf body (no length prefix)
    fn encode(&self) -> Vec<u8>;

    /// Encode to a complete length-prefixed frame
    fn encode_frame(&self) -> Vec<u8> {
        frame(&self.encode())
    }
}

/// Messages that can be decoded from a frame body
pub trait DecodeMessage: Sized {
    /// Decode from a protobuf body (no length prefix)
    fn decode(body: &[u8]) -> Result<Self, ParseError>;

    /// Decode from a complete length-prefixed frame
    fn decode_frame(bytes: &[u8], max_len: usize) -> Result<Self, ParseError> {
        Self::decode(unframe(bytes, max_len)?)
    }
}

impl EncodeMessage for Request {
    fn encode(&self) -> Vec<u8> {
        self.to_message().encode_to_vec()
    }
}

impl DecodeMessage for Request {
    fn decode(body: &[u8]) -> Result<Self, ParseError> {
        Self::from_message(EmulatorMessage::decode(body)?)
    }
}

impl EncodeMessage for Response {
    fn encode(&self) -> Vec<u8> {
        self.to_message().encode_to_vec()
    }
}

impl DecodeMessage for Response {
    fn decode(body: &[u8]) -> Result<Self, ParseError> {
        Self::from_message(EmulatorMessage::decode(body)?)
    }
}

/// Prepend the length prefix to a body
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    out.extend_from_slice(&(body.len() as u32).to_ne_bytes());
    out.extend_from_slice(body);
    out
}

/// Validate a length prefix read off the wire and return the body length
pub fn body_len(header: [u8; FRAME_HEADER_LEN], max_len: usize) -> Result<usize, ParseError> {
    let len = u32::from_ne_bytes(header) as usize;
    if len == 0 {
        return Err(ParseError::EmptyFrame);
    }
    if len > max_len {
        return Err(ParseError::Oversize { len, max: max_len });
    }
    Ok(len)
}

/// Split a complete frame into its body
///
/// The declared length must match the bytes that follow exactly; a short or
/// overlong frame is rejected rather than partially consumed.
pub fn unframe(bytes: &[u8], max_len: usize) -> Result<&[u8], ParseError> {
    let header: [u8; FRAME_HEADER_LEN] = bytes
        .get(..FRAME_HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(ParseError::TruncatedHeader(bytes.len()))?;
    let declared = body_len(header, max_len)?;
    let body = &bytes[FRAME_HEADER_LEN..];
    if body.len() != declared {
        return Err(ParseError::LengthMismatch {
            declared,
            available: body.len(),
        });
    }
    Ok(body)
}

impl From<&PropertyValue> for wire::VehiclePropValue {
    fn from(val: &PropertyValue) -> Self {
        let value = &val.value;
        Self {
            prop: val.prop,
            value_type: Some(val.prop & PropertyType::MASK),
            timestamp: Some(val.timestamp),
            area_id: Some(val.area_id),
            int32_values: value.int32_values.clone(),
            int64_values: value.int64_values.clone(),
            float_values: value.float_values.clone(),
            string_value: (!value.string_value.is_empty()).then(|| value.string_value.clone()),
            bytes_value: (!value.bytes.is_empty()).then(|| value.bytes.clone()),
        }
    }
}

impl From<wire::VehiclePropValue> for PropertyValue {
    fn from(val: wire::VehiclePropValue) -> Self {
        Self {
            prop: val.prop,
            area_id: val.area_id.unwrap_or(0),
            timestamp: val.timestamp.unwrap_or(0),
            value: RawValue {
                int32_values: val.int32_values,
                int64_values: val.int64_values,
                float_values: val.float_values,
                string_value: val.string_value.unwrap_or_default(),
                bytes: val.bytes_value.unwrap_or_default(),
            },
        }
    }
}

impl From<&PropertyConfig> for wire::VehiclePropConfig {
    fn from(cfg: &PropertyConfig) -> Self {
        let ty = cfg.property_type();
        let area_configs = cfg
            .area_configs
            .iter()
            .filter_map(|area| area_config_to_wire(ty, area))
            .collect();

        Self {
            prop: cfg.prop,
            access: Some(cfg.access.code()),
            change_mode: Some(cfg.change_mode.code()),
            value_type: Some(cfg.prop & PropertyType::MASK),
            supported_areas: (!cfg.is_global()).then_some(cfg.supported_areas),
            area_configs,
            config_flags: None,
            config_array: cfg.config_array.clone(),
            config_string: (!cfg.config_string.is_empty()).then(|| cfg.config_string.clone()),
            min_sample_rate: Some(cfg.min_sample_rate),
            max_sample_rate: Some(cfg.max_sample_rate),
        }
    }
}

/// Only INT32, INT64 and FLOAT properties carry bounds; the pair written
/// must agree with the declared type.
fn area_config_to_wire(ty: Option<PropertyType>, area: &AreaConfig) -> Option<wire::VehicleAreaConfig> {
    let mut out = wire::VehicleAreaConfig {
        area_id: area.area_id,
        ..Default::default()
    };
    match (ty, area.bounds?) {
        (Some(PropertyType::Int32), AreaBounds::Int32 { min, max }) => {
            out.min_int32_value = Some(min);
            out.max_int32_value = Some(max);
        }
        (Some(PropertyType::Int64), AreaBounds::Int64 { min, max }) => {
            out.min_int64_value = Some(min);
            out.max_int64_value = Some(max);
        }
        (Some(PropertyType::Float), AreaBounds::Float { min, max }) => {
            out.min_float_value = Some(min);
            out.max_float_value = Some(max);
        }
        (ty, bounds) => {
            tracing::warn!(
                "Dropping {:?} bounds for area 0x{:x} of {} property",
                bounds,
                area.area_id,
                ty.map(|t| t.name()).unwrap_or("unknown")
            );
            return None;
        }
    }
    Some(out)
}

impl TryFrom<wire::VehiclePropConfig> for PropertyConfig {
    type Error = ParseError;

    fn try_from(cfg: wire::VehiclePropConfig) -> Result<Self, Self::Error> {
        let raw_access = cfg.access.unwrap_or(0);
        let access = PropertyAccess::from_code(raw_access).ok_or(ParseError::InvalidField {
            field: "access",
            value: raw_access,
        })?;
        let raw_mode = cfg.change_mode.unwrap_or(0);
        let change_mode = ChangeMode::from_code(raw_mode).ok_or(ParseError::InvalidField {
            field: "change_mode",
            value: raw_mode,
        })?;

        let area_configs = cfg
            .area_configs
            .into_iter()
            .map(|area| {
                let bounds = match (area.min_int32_value, area.max_int32_value) {
                    (Some(min), Some(max)) => Some(AreaBounds::Int32 { min, max }),
                    _ => match (area.min_int64_value, area.max_int64_value) {
                        (Some(min), Some(max)) => Some(AreaBounds::Int64 { min, max }),
                        _ => match (area.min_float_value, area.max_float_value) {
                            (Some(min), Some(max)) => Some(AreaBounds::Float { min, max }),
                            _ => None,
                        },
                    },
                };
                AreaConfig {
                    area_id: area.area_id,
                    bounds,
                }
            })
            .collect();

        Ok(Self {
            prop: cfg.prop,
            access,
            change_mode,
            supported_areas: if property::is_global(cfg.prop) {
                0
            } else {
                cfg.supported_areas.unwrap_or(0)
            },
            config_array: cfg.config_array,
            config_string: cfg.config_string.unwrap_or_default(),
            area_configs,
            min_sample_rate: cfg.min_sample_rate.unwrap_or(0.0),
            max_sample_rate: cfg.max_sample_rate.unwrap_or(0.0),
        })
    }
}
