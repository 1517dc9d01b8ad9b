use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::store::AttachmentTarget;
use crate::transform::{DataLogger, Location, MeasuringPoint, Sensor, SensorRole};

/// Value stored in `yes_no` domain columns.
pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LocationRow {
    pub global_id: Uuid,
    pub location_id: String,
    pub name: Option<String>,
    pub project: Option<i32>,
    pub shape_geojson: String,
    pub srid: i32,
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
    pub is_active: bool,
    pub comments: Option<String>,
}

impl LocationRow {
    pub fn from_entity(global_id: Uuid, location: &Location) -> Self {
        Self {
            global_id,
            location_id: location.location_id.clone(),
            name: location.name.clone(),
            project: location.project,
            shape_geojson: location.shape.to_geojson(),
            srid: location.shape.srid,
            has_rainfall: location.has_rainfall,
            has_stage: location.has_stage,
            has_groundwater: location.has_groundwater,
            has_conductivity: location.has_conductivity,
            has_velocity_sensor: location.has_velocity_sensor,
            has_discharge: location.has_discharge,
            has_temperature: location.has_temperature,
            has_water_quality: location.has_water_quality,
            has_data_logger: location.has_data_logger,
            has_generic_sensor: location.has_generic_sensor,
            has_measuring_point: location.has_measuring_point,
            is_active: location.is_active,
            comments: location.comments.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DataLoggerRow {
    pub global_id: Uuid,
    pub location_global_id: Uuid,
    pub data_logger_type: String,
    pub serial_number: String,
    pub low_battery_threshold: Option<f64>,
    pub low_battery_units: Option<String>,
    pub is_active: bool,
}

impl DataLoggerRow {
    pub fn from_entity(global_id: Uuid, location_global_id: Uuid, logger: &DataLogger) -> Self {
        Self {
            global_id,
            location_global_id,
            data_logger_type: logger.logger_type.clone(),
            serial_number: logger.serial_number.clone(),
            low_battery_threshold: logger.low_battery_threshold,
            low_battery_units: logger.low_battery_units.clone(),
            is_active: logger.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SensorRow {
    pub global_id: Uuid,
    pub data_logger_global_id: Uuid,
    pub sensor_type: String,
    pub serial_number: String,
    pub is_tipping_bucket: bool,
    pub is_active: bool,
}

impl SensorRow {
    pub fn from_entity(global_id: Uuid, data_logger_global_id: Uuid, sensor: &Sensor) -> Self {
        Self {
            global_id,
            data_logger_global_id,
            sensor_type: sensor.sensor_type.clone(),
            serial_number: sensor.serial_number.clone(),
            is_tipping_bucket: sensor.role == SensorRole::TippingBucket,
            is_active: sensor.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MeasuringPointRow {
    pub global_id: Uuid,
    pub location_global_id: Uuid,
    pub name: Option<String>,
    pub external_id: Uuid,
    pub description: Option<String>,
    pub elevation: f64,
    pub display_order: i32,
    pub is_active: bool,
}

impl MeasuringPointRow {
    pub fn from_entity(global_id: Uuid, location_global_id: Uuid, point: &MeasuringPoint) -> Self {
        Self {
            global_id,
            location_global_id,
            name: point.name.clone(),
            external_id: point.external_id,
            description: point.description.clone(),
            elevation: point.elevation,
            display_order: i32::try_from(point.display_order).unwrap_or(i32::MAX),
            is_active: point.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRow {
    pub attachment_id: Uuid,
    pub target: AttachmentTarget,
    pub rel_global_id: Uuid,
    pub content_type: String,
    pub att_name: String,
    pub data_size: i32,
    pub keywords: Option<String>,
}

/// A stored location with everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationTree {
    pub location: LocationRow,
    pub data_loggers: Vec<DataLoggerRow>,
    pub sensors: Vec<SensorRow>,
    pub measuring_points: Vec<MeasuringPointRow>,
}
