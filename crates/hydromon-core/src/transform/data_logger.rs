use serde::Serialize;

use super::{pair, to_json, TransformRules};
use crate::error::{EntityKind, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLogger {
    pub logger_type: String,
    pub serial_number: String,
    pub low_battery_threshold: Option<f64>,
    pub low_battery_units: Option<String>,
    pub is_active: bool,
}

impl DataLogger {
    /// `Ok(None)` when the location has no recorder at all.
    pub fn from_parts(
        key: &str,
        logger_type: Option<&str>,
        serial_number: Option<&str>,
        rules: &TransformRules,
    ) -> Result<Option<Self>, ValidationError> {
        let Some((logger_type, serial_number)) = pair(
            EntityKind::DataLogger,
            key,
            "recorder",
            logger_type,
            serial_number,
        )?
        else {
            return Ok(None);
        };

        let threshold = rules.battery_threshold(logger_type);
        Ok(Some(Self {
            logger_type: logger_type.to_string(),
            serial_number: serial_number.to_string(),
            low_battery_threshold: threshold.map(|entry| entry.threshold),
            low_battery_units: threshold.map(|entry| entry.units.clone()),
            is_active: true,
        }))
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_absent_is_no_logger() {
        let rules = TransformRules::default();
        assert_eq!(DataLogger::from_parts("000001", None, None, &rules), Ok(None));
    }

    #[test]
    fn partial_pair_is_an_error() {
        let rules = TransformRules::default();
        let err = DataLogger::from_parts("000001", Some("CR1000X"), None, &rules).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Pairing {
                entity: EntityKind::DataLogger,
                ..
            }
        ));
        assert!(err.to_string().contains("CR1000X"));
        assert!(err.to_string().contains("000001"));

        assert!(DataLogger::from_parts("000001", None, Some("123"), &rules).is_err());
    }

    #[test]
    fn known_type_gets_battery_threshold() {
        let rules = TransformRules::default();
        let logger = DataLogger::from_parts("000001", Some("cr1000x"), Some("L-1"), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(logger.low_battery_threshold, Some(11.5));
        assert_eq!(logger.low_battery_units.as_deref(), Some("V"));
        assert!(logger.is_active);

        let logger = DataLogger::from_parts("000001", Some("Homebuilt"), Some("L-2"), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(logger.low_battery_threshold, None);
    }
}
