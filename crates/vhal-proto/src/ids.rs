//! Well-known vehicle property ids and enumerated values
//!
//! Each id is composed as `index | group | type | area` (see
//! [`crate::property`]).

/// Make of the vehicle
pub const INFO_MAKE: i32 = 0x0101 | 0x1000_0000 | 0x0010_0000 | 0x0100_0000;
/// Fuel capacity, as a fraction of the nominal tank
pub const INFO_FUEL_CAPACITY: i32 = 0x0104 | 0x1000_0000 | 0x0060_0000 | 0x0100_0000;
/// Currently selected gear
pub const GEAR_SELECTION: i32 = 0x0400 | 0x1000_0000 | 0x0040_0000 | 0x0100_0000;
/// Driving restrictions in effect
pub const DRIVING_STATUS: i32 = 0x0404 | 0x1000_0000 | 0x0040_0000 | 0x0100_0000;
/// Night mode headlight state
pub const NIGHT_MODE: i32 = 0x0407 | 0x1000_0000 | 0x0020_0000 | 0x0100_0000;
/// Ignition switch position
pub const IGNITION_STATE: i32 = 0x0409 | 0x1000_0000 | 0x0040_0000 | 0x0100_0000;
/// HVAC fan speed per zone
pub const HVAC_FAN_SPEED: i32 = 0x0500 | 0x1000_0000 | 0x0040_0000 | 0x0200_0000;
/// HVAC fan direction per zone
pub const HVAC_FAN_DIRECTION: i32 = 0x0501 | 0x1000_0000 | 0x0040_0000 | 0x0200_0000;
/// HVAC target temperature per zone
pub const HVAC_TEMPERATURE_SET: i32 = 0x0503 | 0x1000_0000 | 0x0060_0000 | 0x0200_0000;
/// Defroster per window
pub const HVAC_DEFROSTER: i32 = 0x0504 | 0x1000_0000 | 0x0020_0000 | 0x0300_0000;
/// Air conditioning per zone
pub const HVAC_AC_ON: i32 = 0x0505 | 0x1000_0000 | 0x0020_0000 | 0x0200_0000;
/// Recirculation per zone
pub const HVAC_RECIRC_ON: i32 = 0x0508 | 0x1000_0000 | 0x0020_0000 | 0x0200_0000;
/// Automatic climate control per zone
pub const HVAC_AUTO_ON: i32 = 0x050A | 0x1000_0000 | 0x0020_0000 | 0x0200_0000;
/// HVAC power per zone
pub const HVAC_POWER_ON: i32 = 0x0510 | 0x1000_0000 | 0x0020_0000 | 0x0200_0000;
/// Display brightness
pub const DISPLAY_BRIGHTNESS: i32 = 0x0A03 | 0x1000_0000 | 0x0040_0000 | 0x0100_0000;
/// OBD2 live sensor frame (computed)
pub const OBD2_LIVE_FRAME: i32 = 0x0D00 | 0x1000_0000 | 0x00e0_0000 | 0x0100_0000;
/// OBD2 freeze frame with diagnostic trouble code (computed)
pub const OBD2_FREEZE_FRAME: i32 = 0x0D01 | 0x1000_0000 | 0x00e0_0000 | 0x0100_0000;

/// HVAC zone area bits
pub mod zone {
    pub const ROW_1_LEFT: i32 = 0x0001;
    pub const ROW_1_CENTER: i32 = 0x0002;
    pub const ROW_1_RIGHT: i32 = 0x0004;
    pub const ROW_2_LEFT: i32 = 0x0010;
    pub const ROW_2_CENTER: i32 = 0x0020;
    pub const ROW_2_RIGHT: i32 = 0x0040;
}

/// Window area bits
pub mod window {
    pub const FRONT_WINDSHIELD: i32 = 0x0001;
    pub const REAR_WINDSHIELD: i32 = 0x0002;
}

/// `GEAR_SELECTION` values
pub mod gear {
    pub const NEUTRAL: i32 = 0x0001;
    pub const REVERSE: i32 = 0x0002;
    pub const PARK: i32 = 0x0004;
    pub const DRIVE: i32 = 0x0008;
}

/// `HVAC_FAN_DIRECTION` values
pub mod fan_direction {
    pub const FACE: i32 = 0x1;
    pub const FLOOR: i32 = 0x2;
    pub const DEFROST: i32 = 0x4;
}

/// `DRIVING_STATUS` values
pub mod driving_status {
    pub const UNRESTRICTED: i32 = 0x00;
    pub const NO_VIDEO: i32 = 0x01;
}

/// `IGNITION_STATE` values
pub mod ignition {
    pub const UNDEFINED: i32 = 0;
    pub const LOCK: i32 = 1;
    pub const OFF: i32 = 2;
    pub const ACC: i32 = 3;
    pub const ON: i32 = 4;
    pub const START: i32 = 5;
}

/// Symbolic name of a well-known property, for logs
pub fn name(prop: i32) -> Option<&'static str> {
    let name = match prop {
        INFO_MAKE => "INFO_MAKE",
        INFO_FUEL_CAPACITY => "INFO_FUEL_CAPACITY",
        GEAR_SELECTION => "GEAR_SELECTION",
        DRIVING_STATUS => "DRIVING_STATUS",
        NIGHT_MODE => "NIGHT_MODE",
        IGNITION_STATE => "IGNITION_STATE",
        HVAC_FAN_SPEED => "HVAC_FAN_SPEED",
        HVAC_FAN_DIRECTION => "HVAC_FAN_DIRECTION",
        HVAC_TEMPERATURE_SET => "HVAC_TEMPERATURE_SET",
        HVAC_DEFROSTER => "HVAC_DEFROSTER",
        HVAC_AC_ON => "HVAC_AC_ON",
        HVAC_RECIRC_ON => "HVAC_RECIRC_ON",
        HVAC_AUTO_ON => "HVAC_AUTO_ON",
        HVAC_POWER_ON => "HVAC_POWER_ON",
        DISPLAY_BRIGHTNESS => "DISPLAY_BRIGHTNESS",
        OBD2_LIVE_FRAME => "OBD2_LIVE_FRAME",
        OBD2_FREEZE_FRAME => "OBD2_FREEZE_FRAME",
        _ => return None,
    };
    Some(name)
}
