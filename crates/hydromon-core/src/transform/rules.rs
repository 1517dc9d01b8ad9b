use serde::{Deserialize, Serialize};

use crate::capabilities::{default_capability_rules, CapabilityRule};

/// NAD83 / UTM zone 16N.
pub const DEFAULT_SRID: i32 = 26916;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryThreshold {
    pub logger_type: String,
    pub threshold: f64,
    pub units: String,
}

impl BatteryThreshold {
    fn volts(logger_type: &str, threshold: f64) -> Self {
        Self {
            logger_type: logger_type.to_string(),
            threshold,
            units: "V".to_string(),
        }
    }
}

/// Data-driven parts of the transform, overridable from the `[transform]`
/// section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformRules {
    pub capability_rules: Vec<CapabilityRule>,
    pub rejected_measuring_point_names: Vec<String>,
    pub battery_thresholds: Vec<BatteryThreshold>,
    pub srid: i32,
}

impl Default for TransformRules {
    fn default() -> Self {
        Self {
            capability_rules: default_capability_rules(),
            rejected_measuring_point_names: vec![
                "NAVD88 0ft".to_string(),
                "NGVD29 0ft".to_string(),
            ],
            battery_thresholds: vec![
                BatteryThreshold::volts("CR1000X", 11.5),
                BatteryThreshold::volts("CR300", 11.5),
                BatteryThreshold::volts("CR200X", 11.0),
                BatteryThreshold::volts("Sutron XLink 500", 11.8),
                BatteryThreshold::volts("Waterlog H-500XL", 11.5),
            ],
            srid: DEFAULT_SRID,
        }
    }
}

impl TransformRules {
    pub fn battery_threshold(&self, logger_type: &str) -> Option<&BatteryThreshold> {
        self.battery_thresholds
            .iter()
            .find(|entry| entry.logger_type.eq_ignore_ascii_case(logger_type))
    }

    /// Case-sensitive.
    pub fn is_rejected_name(&self, name: &str) -> bool {
        self.rejected_measuring_point_names
            .iter()
            .any(|rejected| rejected == name)
    }
}
