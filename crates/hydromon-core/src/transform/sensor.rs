use hydromon_parser::formats::schema::SENSOR_LIST_SEPARATOR;
use serde::Serialize;

use super::{pair, to_json};
use crate::error::{EntityKind, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorRole {
    TippingBucket,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sensor {
    pub sensor_type: String,
    pub serial_number: String,
    pub role: SensorRole,
    pub is_active: bool,
}

impl Sensor {
    pub fn from_parts(
        key: &str,
        role: SensorRole,
        sensor_type: Option<&str>,
        serial_number: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        let label = match role {
            SensorRole::TippingBucket => "tipping bucket",
            SensorRole::General => "sensor",
        };
        Ok(
            pair(EntityKind::Sensor, key, label, sensor_type, serial_number)?.map(
                |(sensor_type, serial_number)| Self {
                    sensor_type: sensor_type.to_string(),
                    serial_number: serial_number.to_string(),
                    role,
                    is_active: true,
                },
            ),
        )
    }

    /// Parses the parallel `|`-separated type and serial columns. The two
    /// lists must have the same length; nothing is truncated.
    pub fn list_from_columns(
        key: &str,
        types: Option<&str>,
        serials: Option<&str>,
    ) -> Result<Vec<Self>, ValidationError> {
        let type_items = split_list(types);
        let serial_items = split_list(serials);

        if type_items.len() != serial_items.len() {
            return Err(ValidationError::SensorListMismatch {
                entity: EntityKind::Sensor,
                key: key.to_string(),
                types: types.unwrap_or_default().to_string(),
                serials: serials.unwrap_or_default().to_string(),
                type_count: type_items.len(),
                serial_count: serial_items.len(),
            });
        }

        let mut sensors = Vec::with_capacity(type_items.len());
        for (position, (sensor_type, serial_number)) in
            type_items.into_iter().zip(serial_items).enumerate()
        {
            match Self::from_parts(key, SensorRole::General, sensor_type, serial_number)? {
                Some(sensor) => sensors.push(sensor),
                None => {
                    return Err(ValidationError::Invalid {
                        entity: EntityKind::Sensor,
                        key: key.to_string(),
                        field: "sensor list",
                        value: types.unwrap_or_default().to_string(),
                        reason: format!("entry {} is empty", position + 1),
                    })
                }
            }
        }
        Ok(sensors)
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

fn split_list(raw: Option<&str>) -> Vec<Option<&str>> {
    match raw {
        None => Vec::new(),
        Some(raw) => raw
            .split(SENSOR_LIST_SEPARATOR)
            .map(str::trim)
            .map(|item| (!item.is_empty()).then_some(item))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_lengths_must_match() {
        let err = Sensor::list_from_columns("000010", Some("A|B"), Some("1")).unwrap_err();
        match err {
            ValidationError::SensorListMismatch {
                type_count,
                serial_count,
                ..
            } => {
                assert_eq!(type_count, 2);
                assert_eq!(serial_count, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn list_pairs_by_position() {
        let sensors =
            Sensor::list_from_columns("000010", Some("PT12 | CS451"), Some("S-1|S-2")).unwrap();
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[1].sensor_type, "CS451");
        assert_eq!(sensors[1].serial_number, "S-2");
        assert!(sensors.iter().all(|s| s.role == SensorRole::General));
    }

    #[test]
    fn empty_columns_mean_no_sensors() {
        assert!(Sensor::list_from_columns("000010", None, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn serials_without_types_is_a_mismatch() {
        assert!(Sensor::list_from_columns("000010", None, Some("S-1")).is_err());
    }

    #[test]
    fn partial_entry_is_a_pairing_error() {
        let err = Sensor::list_from_columns("000010", Some("A|"), Some("1|2")).unwrap_err();
        assert!(matches!(err, ValidationError::Pairing { .. }));
    }

    #[test]
    fn tipping_bucket_pairs_like_any_sensor() {
        let bucket = Sensor::from_parts("000010", SensorRole::TippingBucket, Some("TE525"), Some("TB-9"))
            .unwrap()
            .unwrap();
        assert_eq!(bucket.role, SensorRole::TippingBucket);
        assert!(Sensor::from_parts("000010", SensorRole::TippingBucket, None, Some("TB-9")).is_err());
    }
}
