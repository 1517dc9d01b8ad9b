//! Column names of the CSV exports consumed by the loaders.

pub const LOCATION_IDENTIFIER: &str = "LocationIdentifier";
pub const X: &str = "X";
pub const Y: &str = "Y";

pub const STATION_ID: &str = "Station_ID";
pub const STATION_NAME: &str = "Station_Name";
pub const MONITORING_TYPE: &str = "Monitoring_Type";
pub const PROJECT_NUMBER: &str = "Project_Number";
pub const TYPE_OF_RECORDER: &str = "Type_of_Recorder";
pub const RECORDER_SERIAL: &str = "Recorder_Serial__";
pub const TYPE_OF_TIPPING_BUCKET: &str = "Type_of_Tipping_Bucket";
pub const TIPPING_BUCKET_SERIAL: &str = "T_B__Serial__";
pub const TYPE_OF_SENSOR: &str = "Type_of_Sensor";
pub const SENSOR_SERIAL: &str = "Sensor_Serial__";
pub const COMMENTS: &str = "Comments";

pub const IDENTIFIER: &str = "Identifier";
pub const UNIQUE_ID: &str = "UniqueId";
pub const NAME: &str = "Name";
pub const DESCRIPTION: &str = "Description";
pub const MEASURED_AGAINST_LOCAL_DATUM: &str =
    "ReferencePointPeriods_0_IsMeasuredAgainstLocalAssumedDatum";
pub const ELEVATION: &str = "ReferencePointPeriods_0_Elevation";
pub const DECOMMISSIONED_DATE: &str = "DecommissionedDate";

pub const FILE_NAME: &str = "FileName";
pub const COMMENT: &str = "Comment";
pub const TAG_PREFIX: &str = "Tags_";
pub const TAG_SUFFIX: &str = "_Key";

/// Separator of the multi-valued sensor type and serial columns.
pub const SENSOR_LIST_SEPARATOR: char = '|';
