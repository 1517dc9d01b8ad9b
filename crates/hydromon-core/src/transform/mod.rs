//! Source records to validated entities. Nothing in here performs I/O.

mod data_logger;
mod location;
mod measuring_point;
mod rules;
mod sensor;

pub use data_logger::DataLogger;
pub use location::{Location, LocationSources, Point};
pub use measuring_point::{MeasuringPoint, RejectedMeasuringPoint, RejectionReason, Screening};
pub use rules::{BatteryThreshold, TransformRules, DEFAULT_SRID};
pub use sensor::{Sensor, SensorRole};

use crate::error::{EntityKind, ValidationError};

/// Type and serial number travel together: both or neither.
pub(crate) fn pair<'a>(
    entity: EntityKind,
    key: &str,
    label: &str,
    type_value: Option<&'a str>,
    serial_value: Option<&'a str>,
) -> Result<Option<(&'a str, &'a str)>, ValidationError> {
    match (type_value, serial_value) {
        (Some(type_value), Some(serial_value)) => Ok(Some((type_value, serial_value))),
        (None, None) => Ok(None),
        (type_value, serial_value) => Err(ValidationError::Pairing {
            entity,
            key: key.to_string(),
            label: label.to_string(),
            type_value: type_value.map(str::to_string),
            serial_value: serial_value.map(str::to_string),
        }),
    }
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}
