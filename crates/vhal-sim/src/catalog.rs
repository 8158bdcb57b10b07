//! Property catalog
//!
//! The catalog is the static list of properties the emulated vehicle
//! supports. It is queried once when the store is initialized and again
//! whenever a harness asks for configs; nothing mutates it afterwards.

use std::path::Path;

use vhal_proto::ids::{self, window, zone};
use vhal_proto::{AreaBounds, ChangeMode, PropertyAccess, PropertyConfig};

use crate::error::CatalogError;

/// Source of property configurations
pub trait PropertyCatalog: Send + Sync {
    /// Every supported property config, in catalog order
    fn configs(&self) -> &[PropertyConfig];

    /// Config for a single property id
    fn config(&self, prop: i32) -> Option<&PropertyConfig> {
        self.configs().iter().find(|cfg| cfg.prop == prop)
    }
}

/// Catalog backed by a fixed list of configs
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    configs: Vec<PropertyConfig>,
}

impl StaticCatalog {
    /// Create a catalog from a list of configs
    pub fn new(configs: Vec<PropertyConfig>) -> Self {
        Self { configs }
    }

    /// The default emulated vehicle
    pub fn builtin() -> Self {
        let hvac_zones = zone::ROW_1_LEFT | zone::ROW_1_RIGHT;

        Self::new(vec![
            PropertyConfig::new(ids::INFO_MAKE, PropertyAccess::Read, ChangeMode::Static),
            PropertyConfig::new(ids::HVAC_POWER_ON, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones)
                // Properties switched off together with HVAC power
                .with_config_array([ids::HVAC_FAN_SPEED, ids::HVAC_FAN_DIRECTION]),
            PropertyConfig::new(ids::HVAC_DEFROSTER, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(window::FRONT_WINDSHIELD | window::REAR_WINDSHIELD),
            PropertyConfig::new(ids::HVAC_RECIRC_ON, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones),
            PropertyConfig::new(ids::HVAC_AC_ON, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones),
            PropertyConfig::new(ids::HVAC_AUTO_ON, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones),
            PropertyConfig::new(ids::HVAC_FAN_SPEED, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones)
                .with_bounds(zone::ROW_1_LEFT, AreaBounds::Int32 { min: 1, max: 7 })
                .with_bounds(zone::ROW_1_RIGHT, AreaBounds::Int32 { min: 1, max: 7 }),
            PropertyConfig::new(ids::HVAC_FAN_DIRECTION, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones),
            PropertyConfig::new(ids::HVAC_TEMPERATURE_SET, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_areas(hvac_zones)
                .with_bounds(zone::ROW_1_LEFT, AreaBounds::Float { min: 16.0, max: 32.0 })
                .with_bounds(zone::ROW_1_RIGHT, AreaBounds::Float { min: 16.0, max: 32.0 }),
            PropertyConfig::new(ids::NIGHT_MODE, PropertyAccess::Read, ChangeMode::OnChange),
            PropertyConfig::new(ids::DRIVING_STATUS, PropertyAccess::Read, ChangeMode::OnChange),
            PropertyConfig::new(ids::GEAR_SELECTION, PropertyAccess::Read, ChangeMode::OnChange),
            PropertyConfig::new(ids::INFO_FUEL_CAPACITY, PropertyAccess::Read, ChangeMode::OnChange)
                .with_bounds(0, AreaBounds::Float { min: 0.0, max: 1.0 }),
            PropertyConfig::new(ids::DISPLAY_BRIGHTNESS, PropertyAccess::ReadWrite, ChangeMode::OnChange)
                .with_bounds(0, AreaBounds::Int32 { min: 0, max: 10 }),
            PropertyConfig::new(ids::IGNITION_STATE, PropertyAccess::Read, ChangeMode::OnChange),
            // config_array = [vendor integer sensors, vendor float sensors]
            PropertyConfig::new(ids::OBD2_LIVE_FRAME, PropertyAccess::Read, ChangeMode::OnChange)
                .with_config_array([0, 0]),
            PropertyConfig::new(ids::OBD2_FREEZE_FRAME, PropertyAccess::Read, ChangeMode::OnChange)
                .with_config_array([0, 0]),
        ])
    }

    /// Parse a catalog from a JSON array of configs
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl PropertyCatalog for StaticCatalog {
    fn configs(&self) -> &[PropertyConfig] {
        &self.configs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhal_proto::PropertyType;

    #[test]
    fn test_builtin_has_unique_ids() {
        let catalog = StaticCatalog::builtin();
        let mut ids: Vec<_> = catalog.configs().iter().map(|c| c.prop).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_builtin_types_are_known() {
        for cfg in StaticCatalog::builtin().configs() {
            assert!(cfg.property_type().is_some(), "0x{:08x}", cfg.prop);
        }
    }

    #[test]
    fn test_config_lookup() {
        let catalog = StaticCatalog::builtin();
        let cfg = catalog.config(ids::HVAC_FAN_SPEED).unwrap();
        assert_eq!(cfg.area_ids(), vec![zone::ROW_1_LEFT, zone::ROW_1_RIGHT]);
        assert!(catalog.config(0x1140_0fff).is_none());
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {
                "prop": 289408000,
                "access": "read",
                "change_mode": "on_change"
            },
            {
                "prop": 306185472,
                "access": "read_write",
                "change_mode": "on_change",
                "supported_areas": 5,
                "area_configs": [
                    { "area_id": 1, "bounds": { "type": "int32", "min": 1, "max": 7 } }
                ]
            }
        ]"#;
        let catalog = StaticCatalog::from_json(json).unwrap();
        assert_eq!(catalog.configs().len(), 2);

        let gear = catalog.config(ids::GEAR_SELECTION).unwrap();
        assert_eq!(gear.property_type(), Some(PropertyType::Int32));
        assert_eq!(gear.access, PropertyAccess::Read);

        let fan = catalog.config(ids::HVAC_FAN_SPEED).unwrap();
        assert_eq!(fan.supported_areas, 5);
        assert_eq!(
            fan.area_configs[0].bounds,
            Some(AreaBounds::Int32 { min: 1, max: 7 })
        );
    }

    #[test]
    fn test_from_json_rejects_bad_access() {
        let json = r#"[{ "prop": 1, "access": "sometimes", "change_mode": "static" }]"#;
        assert!(matches!(
            StaticCatalog::from_json(json),
            Err(CatalogError::Json(_))
        ));
    }
}
