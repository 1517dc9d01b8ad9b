use std::fmt;

use serde::{Deserialize, Serialize};

/// Monitoring capabilities a location can carry, derived from the free-text
/// monitoring type of the district sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Rainfall,
    Stage,
    Groundwater,
    Conductivity,
    VelocitySensor,
    Discharge,
    Temperature,
    WaterQuality,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Capability::Rainfall => "rainfall",
            Capability::Stage => "stage",
            Capability::Groundwater => "groundwater",
            Capability::Conductivity => "conductivity",
            Capability::VelocitySensor => "velocity sensor",
            Capability::Discharge => "discharge",
            Capability::Temperature => "temperature",
            Capability::WaterQuality => "water quality",
        };
        f.write_str(label)
    }
}

/// Case-insensitive substring rule. Exclusions are tested first, so
/// `D-Stage` does not light up `stage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRule {
    pub capability: Capability,
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl CapabilityRule {
    pub fn new(capability: Capability, include: &[&str], exclude: &[&str]) -> Self {
        Self {
            capability,
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn matches(&self, monitoring_type: &str) -> bool {
        let text = monitoring_type.to_lowercase();
        if self
            .exclude
            .iter()
            .any(|pattern| text.contains(&pattern.to_lowercase()))
        {
            return false;
        }
        self.include
            .iter()
            .any(|pattern| text.contains(&pattern.to_lowercase()))
    }
}

pub fn default_capability_rules() -> Vec<CapabilityRule> {
    vec![
        CapabilityRule::new(Capability::Rainfall, &["rainfall"], &[]),
        CapabilityRule::new(Capability::Stage, &["stage"], &["d-stage"]),
        CapabilityRule::new(Capability::Groundwater, &["gw level"], &[]),
        CapabilityRule::new(Capability::Conductivity, &["cond"], &[]),
        CapabilityRule::new(Capability::VelocitySensor, &["vel.ind"], &[]),
        CapabilityRule::new(Capability::Discharge, &["discharge"], &[]),
        CapabilityRule::new(Capability::Temperature, &["temp"], &[]),
        CapabilityRule::new(Capability::WaterQuality, &["wq"], &[]),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitoringFlags {
    pub rainfall: bool,
    pub stage: bool,
    pub groundwater: bool,
    pub conductivity: bool,
    pub velocity_sensor: bool,
    pub discharge: bool,
    pub temperature: bool,
    pub water_quality: bool,
}

impl MonitoringFlags {
    pub fn from_monitoring_type(monitoring_type: Option<&str>, rules: &[CapabilityRule]) -> Self {
        let mut flags = Self::default();
        let Some(text) = monitoring_type else {
            return flags;
        };
        for rule in rules {
            if rule.matches(text) {
                flags.set(rule.capability);
            }
        }
        flags
    }

    pub fn set(&mut self, capability: Capability) {
        match capability {
            Capability::Rainfall => self.rainfall = true,
            Capability::Stage => self.stage = true,
            Capability::Groundwater => self.groundwater = true,
            Capability::Conductivity => self.conductivity = true,
            Capability::VelocitySensor => self.velocity_sensor = true,
            Capability::Discharge => self.discharge = true,
            Capability::Temperature => self.temperature = true,
            Capability::WaterQuality => self.water_quality = true,
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Rainfall => self.rainfall,
            Capability::Stage => self.stage,
            Capability::Groundwater => self.groundwater,
            Capability::Conductivity => self.conductivity,
            Capability::VelocitySensor => self.velocity_sensor,
            Capability::Discharge => self.discharge,
            Capability::Temperature => self.temperature,
            Capability::WaterQuality => self.water_quality,
        }
    }

    pub fn any(&self) -> bool {
        self.rainfall
            || self.stage
            || self.groundwater
            || self.conductivity
            || self.velocity_sensor
            || self.discharge
            || self.temperature
            || self.water_quality
    }
}
