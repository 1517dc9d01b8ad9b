use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::transform::TransformRules;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout_secs: 10,
        }
    }
}

/// OS accounts allowed to run the loaders. Empty disables the check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub expected_accounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    pub location_tag: String,
    pub measuring_point_tag: String,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            location_tag: "Site Photo".to_string(),
            measuring_point_tag: "MP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HydroConfig {
    pub database: DatabaseConfig,
    pub credentials: CredentialsConfig,
    pub transform: TransformRules,
    pub photos: PhotoConfig,
}

impl HydroConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }
}

/// Reads the config file when one is given; built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<HydroConfig> {
    let Some(path) = path else {
        return Ok(HydroConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    HydroConfig::from_toml(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capability;

    #[test]
    fn empty_file_yields_defaults() {
        let config = HydroConfig::from_toml("").unwrap();
        assert_eq!(config, HydroConfig::default());
        assert_eq!(config.transform.srid, 26916);
        assert_eq!(config.photos.location_tag, "Site Photo");
    }

    #[test]
    fn sections_override_defaults() {
        let config = HydroConfig::from_toml(
            r#"
                [database]
                max_connections = 2

                [credentials]
                expected_accounts = ['HYDRO\LOADER']

                [transform]
                rejected_measuring_point_names = ["Temp Bolt"]

                [[transform.capability_rules]]
                capability = "groundwater"
                include = ["well"]

                [[transform.battery_thresholds]]
                logger_type = "CR6"
                threshold = 12.0
                units = "V"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.acquire_timeout_secs, 10);
        assert_eq!(config.credentials.expected_accounts, vec!["HYDRO\\LOADER"]);
        assert_eq!(config.transform.capability_rules.len(), 1);
        assert_eq!(
            config.transform.capability_rules[0].capability,
            Capability::Groundwater
        );
        assert!(config.transform.capability_rules[0].exclude.is_empty());
        assert!(config.transform.is_rejected_name("Temp Bolt"));
        assert!(!config.transform.is_rejected_name("NAVD88 0ft"));
        assert!(config.transform.battery_threshold("cr6").is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("hydromon.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
        assert!(load_config(None).is_ok());
    }
}
