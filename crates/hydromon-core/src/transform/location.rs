use geojson::{GeoJson, Geometry, Value as GeoJsonValue};
use hydromon_parser::formats::schema::{
    COMMENTS, LOCATION_IDENTIFIER, MONITORING_TYPE, PROJECT_NUMBER, RECORDER_SERIAL,
    SENSOR_SERIAL, STATION_NAME, TIPPING_BUCKET_SERIAL, TYPE_OF_RECORDER, TYPE_OF_SENSOR,
    TYPE_OF_TIPPING_BUCKET, X, Y,
};
use hydromon_parser::{location_key, SourceRecord};
use serde::Serialize;
use tracing::warn;

use super::{
    to_json, DataLogger, MeasuringPoint, RejectedMeasuringPoint, Screening, Sensor, SensorRole,
    TransformRules,
};
use crate::capabilities::MonitoringFlags;
use crate::error::{EntityKind, ValidationError};

/// Projected point in the configured spatial reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub srid: i32,
}

impl Point {
    pub fn to_geojson(&self) -> String {
        let geometry = Geometry::new(GeoJsonValue::Point(vec![self.x, self.y]));
        GeoJson::Geometry(geometry).to_string()
    }

    pub fn from_geojson(text: &str, srid: i32) -> Option<Self> {
        match text.parse::<GeoJson>().ok()? {
            GeoJson::Geometry(geometry) => match geometry.value {
                GeoJsonValue::Point(coords) if coords.len() >= 2 => Some(Self {
                    x: coords[0],
                    y: coords[1],
                    srid,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The three inputs a location is built from.
#[derive(Debug, Clone, Copy)]
pub struct LocationSources<'a> {
    pub station: &'a SourceRecord,
    pub monitoring: &'a SourceRecord,
    pub measuring_points: &'a [SourceRecord],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub location_id: String,
    pub name: Option<String>,
    pub project: Option<i32>,
    pub shape: Point,
    pub comments: Option<String>,
    pub is_active: bool,
    pub has_rainfall: bool,
    pub has_stage: bool,
    pub has_groundwater: bool,
    pub has_conductivity: bool,
    pub has_velocity_sensor: bool,
    pub has_discharge: bool,
    pub has_temperature: bool,
    pub has_water_quality: bool,
    pub has_data_logger: bool,
    pub has_generic_sensor: bool,
    pub has_measuring_point: bool,
    pub data_logger: Option<DataLogger>,
    pub sensors: Vec<Sensor>,
    pub measuring_points: Vec<MeasuringPoint>,
    pub rejected_measuring_points: Vec<RejectedMeasuringPoint>,
}

struct Attributes {
    location_id: String,
    name: Option<String>,
    project: Option<i32>,
    shape: Point,
    comments: Option<String>,
}

struct Equipment {
    data_logger: Option<DataLogger>,
    sensors: Vec<Sensor>,
}

struct MeasuringPoints {
    accepted: Vec<MeasuringPoint>,
    rejected: Vec<RejectedMeasuringPoint>,
}

impl Location {
    pub fn transform(
        sources: LocationSources<'_>,
        rules: &TransformRules,
    ) -> Result<Self, ValidationError> {
        let flags = MonitoringFlags::from_monitoring_type(
            sources.monitoring.get(MONITORING_TYPE),
            &rules.capability_rules,
        );
        let attributes = read_attributes(sources.station, sources.monitoring, rules)?;
        let key = attributes.location_id.as_str();
        let equipment = read_equipment(key, sources.monitoring, rules)?;
        let points = read_measuring_points(key, sources.measuring_points, rules)?;

        let location = assemble(attributes, flags, equipment, points);
        location.check_invariants()?;
        Ok(location)
    }

    pub fn tipping_bucket_count(&self) -> usize {
        self.sensors
            .iter()
            .filter(|sensor| sensor.role == SensorRole::TippingBucket)
            .count()
    }

    pub fn has_any_capability(&self) -> bool {
        self.has_rainfall
            || self.has_stage
            || self.has_groundwater
            || self.has_conductivity
            || self.has_velocity_sensor
            || self.has_discharge
            || self.has_temperature
            || self.has_water_quality
            || self.has_data_logger
            || self.has_generic_sensor
            || self.has_measuring_point
    }

    pub fn to_json(&self) -> String {
        to_json(self)
    }

    fn check_invariants(&self) -> Result<(), ValidationError> {
        if !self.sensors.is_empty() && self.data_logger.is_none() {
            return Err(self.invariant(format!(
                "{} sensor(s) listed but no data logger",
                self.sensors.len()
            )));
        }
        if self.has_rainfall {
            if self.tipping_bucket_count() != 1 {
                return Err(self.invariant("rainfall monitoring requires a tipping bucket"));
            }
            if self.data_logger.is_none() {
                return Err(self.invariant("rainfall monitoring requires a data logger"));
            }
        }
        if (self.has_groundwater || self.has_stage) && self.measuring_points.is_empty() {
            return Err(self.invariant(format!(
                "groundwater or stage monitoring requires a measuring point ({} rejected)",
                self.rejected_measuring_points.len()
            )));
        }
        if !self.has_any_capability() {
            return Err(self.invariant("no monitoring capability, equipment or measuring point"));
        }
        Ok(())
    }

    fn invariant(&self, message: impl Into<String>) -> ValidationError {
        ValidationError::Invariant {
            entity: EntityKind::Location,
            key: self.location_id.clone(),
            message: message.into(),
        }
    }
}

fn read_attributes(
    station: &SourceRecord,
    monitoring: &SourceRecord,
    rules: &TransformRules,
) -> Result<Attributes, ValidationError> {
    let raw_id = station
        .get(LOCATION_IDENTIFIER)
        .ok_or_else(|| missing("<unknown>", LOCATION_IDENTIFIER))?;
    let location_id = location_key(raw_id).ok_or_else(|| ValidationError::Invalid {
        entity: EntityKind::Location,
        key: raw_id.to_string(),
        field: LOCATION_IDENTIFIER,
        value: raw_id.to_string(),
        reason: "not a location number".to_string(),
    })?;

    let x = coordinate(&location_id, station, X)?;
    let y = coordinate(&location_id, station, Y)?;

    let project = monitoring
        .get(PROJECT_NUMBER)
        .and_then(|raw| match raw.parse::<i32>() {
            Ok(project) => Some(project),
            Err(_) => {
                warn!(location_id = %location_id, value = raw, "Project number is not an integer; leaving it empty");
                None
            }
        });

    Ok(Attributes {
        name: monitoring.get(STATION_NAME).map(str::to_string),
        project,
        shape: Point {
            x,
            y,
            srid: rules.srid,
        },
        comments: monitoring.get(COMMENTS).map(str::to_string),
        location_id,
    })
}

fn coordinate(key: &str, station: &SourceRecord, field: &'static str) -> Result<f64, ValidationError> {
    let raw = station.get(field).ok_or_else(|| missing(key, field))?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::Invalid {
            entity: EntityKind::Location,
            key: key.to_string(),
            field,
            value: raw.to_string(),
            reason: "not a coordinate".to_string(),
        })
}

fn read_equipment(
    key: &str,
    monitoring: &SourceRecord,
    rules: &TransformRules,
) -> Result<Equipment, ValidationError> {
    let data_logger = DataLogger::from_parts(
        key,
        monitoring.get(TYPE_OF_RECORDER),
        monitoring.get(RECORDER_SERIAL),
        rules,
    )?;

    let mut sensors = Vec::new();
    if let Some(bucket) = Sensor::from_parts(
        key,
        SensorRole::TippingBucket,
        monitoring.get(TYPE_OF_TIPPING_BUCKET),
        monitoring.get(TIPPING_BUCKET_SERIAL),
    )? {
        sensors.push(bucket);
    }
    sensors.extend(Sensor::list_from_columns(
        key,
        monitoring.get(TYPE_OF_SENSOR),
        monitoring.get(SENSOR_SERIAL),
    )?);

    Ok(Equipment {
        data_logger,
        sensors,
    })
}

fn read_measuring_points(
    key: &str,
    candidates: &[SourceRecord],
    rules: &TransformRules,
) -> Result<MeasuringPoints, ValidationError> {
    let mut points = MeasuringPoints {
        accepted: Vec::new(),
        rejected: Vec::new(),
    };
    for record in candidates {
        match MeasuringPoint::screen(record, rules) {
            Screening::Accepted => {
                let display_order = points.accepted.len() as u32 + 1;
                points
                    .accepted
                    .push(MeasuringPoint::transform(key, record, display_order)?);
            }
            Screening::Rejected(reason) => {
                points
                    .rejected
                    .push(RejectedMeasuringPoint::from_record(record, reason));
            }
        }
    }
    Ok(points)
}

fn assemble(
    attributes: Attributes,
    flags: MonitoringFlags,
    equipment: Equipment,
    points: MeasuringPoints,
) -> Location {
    let has_generic_sensor = equipment
        .sensors
        .iter()
        .any(|sensor| sensor.role == SensorRole::General);
    Location {
        location_id: attributes.location_id,
        name: attributes.name,
        project: attributes.project,
        shape: attributes.shape,
        comments: attributes.comments,
        is_active: true,
        has_rainfall: flags.rainfall,
        has_stage: flags.stage,
        has_groundwater: flags.groundwater,
        has_conductivity: flags.conductivity,
        has_velocity_sensor: flags.velocity_sensor,
        has_discharge: flags.discharge,
        has_temperature: flags.temperature,
        has_water_quality: flags.water_quality,
        has_data_logger: equipment.data_logger.is_some(),
        has_generic_sensor,
        has_measuring_point: !points.accepted.is_empty(),
        data_logger: equipment.data_logger,
        sensors: equipment.sensors,
        measuring_points: points.accepted,
        rejected_measuring_points: points.rejected,
    }
}

fn missing(key: &str, field: &'static str) -> ValidationError {
    ValidationError::Missing {
        entity: EntityKind::Location,
        key: key.to_string(),
        field,
    }
}
