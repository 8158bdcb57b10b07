//! Protobuf schema of the emulator messages
//!
//! These are the on-wire records exchanged with the test harness, declared
//! by hand with `prost` derives so that no build script is needed. Field
//! numbers and labels follow the emulator's proto2 schema:
//!
//! ```text
//! EmulatorMessage   { msg_type=1, status=2, prop=3*, config=4*, value=5* }
//! VehiclePropGet    { prop=1, area_id=2 }
//! VehiclePropConfig { prop=1, access=2, change_mode=3, value_type=4,
//!                     supported_areas=5, area_configs=6*, config_flags=7,
//!                     config_array=8*, config_string=9,
//!                     min_sample_rate=10, max_sample_rate=11 }
//! VehicleAreaConfig { area_id=1, min/max int32=2/3, min/max int64=4/5,
//!                     min/max float=6/7 }
//! VehiclePropValue  { prop=1, value_type=2, timestamp=3, area_id=4,
//!                     int32_values=5*, int64_values=6*, float_values=7*,
//!                     string_value=8, bytes_value=9 }
//! ```
//!
//! Repeated scalars are written unpacked (proto2 default); prost accepts
//! both encodings on decode.

/// Message kind carried in `EmulatorMessage::msg_type`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MsgType {
    GetConfigCmd = 0,
    GetConfigResp = 1,
    GetConfigAllCmd = 2,
    GetConfigAllResp = 3,
    GetPropertyCmd = 4,
    GetPropertyResp = 5,
    GetPropertyAllCmd = 6,
    GetPropertyAllResp = 7,
    SetPropertyCmd = 8,
    SetPropertyResp = 9,
    SetPropertyAsync = 10,
}

/// Result code carried in `EmulatorMessage::status`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    ResultOk = 0,
    ErrorUnknown = 1,
    ErrorUnimplementedCmd = 2,
    ErrorInvalidProperty = 3,
    ErrorInvalidAreaId = 4,
    ErrorPropertyUninitialized = 5,
    ErrorWriteOnlyProperty = 6,
    ErrorMemoryAllocFailed = 7,
    ErrorInvalidOperation = 8,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehicleAreaConfig {
    #[prost(int32, required, tag = "1")]
    pub area_id: i32,
    #[prost(sint32, optional, tag = "2")]
    pub min_int32_value: Option<i32>,
    #[prost(sint32, optional, tag = "3")]
    pub max_int32_value: Option<i32>,
    #[prost(sint64, optional, tag = "4")]
    pub min_int64_value: Option<i64>,
    #[prost(sint64, optional, tag = "5")]
    pub max_int64_value: Option<i64>,
    #[prost(float, optional, tag = "6")]
    pub min_float_value: Option<f32>,
    #[prost(float, optional, tag = "7")]
    pub max_float_value: Option<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropConfig {
    #[prost(int32, required, tag = "1")]
    pub prop: i32,
    #[prost(int32, optional, tag = "2")]
    pub access: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub change_mode: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub value_type: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub supported_areas: Option<i32>,
    #[prost(message, repeated, tag = "6")]
    pub area_configs: Vec<VehicleAreaConfig>,
    #[prost(int32, optional, tag = "7")]
    pub config_flags: Option<i32>,
    #[prost(int32, repeated, packed = "false", tag = "8")]
    pub config_array: Vec<i32>,
    #[prost(string, optional, tag = "9")]
    pub config_string: Option<String>,
    #[prost(float, optional, tag = "10")]
    pub min_sample_rate: Option<f32>,
    #[prost(float, optional, tag = "11")]
    pub max_sample_rate: Option<f32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropValue {
    #[prost(int32, required, tag = "1")]
    pub prop: i32,
    #[prost(int32, optional, tag = "2")]
    pub value_type: Option<i32>,
    #[prost(int64, optional, tag = "3")]
    pub timestamp: Option<i64>,
    #[prost(int32, optional, tag = "4")]
    pub area_id: Option<i32>,
    #[prost(sint32, repeated, packed = "false", tag = "5")]
    pub int32_values: Vec<i32>,
    #[prost(sint64, repeated, packed = "false", tag = "6")]
    pub int64_values: Vec<i64>,
    #[prost(float, repeated, packed = "false", tag = "7")]
    pub float_values: Vec<f32>,
    #[prost(string, optional, tag = "8")]
    pub string_value: Option<String>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub bytes_value: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePropGet {
    #[prost(int32, required, tag = "1")]
    pub prop: i32,
    #[prost(int32, optional, tag = "2")]
    pub area_id: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmulatorMessage {
    #[prost(enumeration = "MsgType", required, tag = "1")]
    pub msg_type: i32,
    #[prost(enumeration = "Status", optional, tag = "2")]
    pub status: Option<i32>,
    #[prost(message, repeated, tag = "3")]
    pub prop: Vec<VehiclePropGet>,
    #[prost(message, repeated, tag = "4")]
    pub config: Vec<VehiclePropConfig>,
    #[prost(message, repeated, tag = "5")]
    pub value: Vec<VehiclePropValue>,
}
