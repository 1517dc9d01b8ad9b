#![allow(dead_code)]

use hydromon_core::loader::LoadSources;
use hydromon_core::parser::{MeasuringPointIndex, MonitoringCache, SourceRecord};

pub const GAUGE_A_ID: &str = "0f9c2a4e5b6d4c8e9a1b2c3d4e5f6a7b";
pub const GAUGE_B_ID: &str = "1a2b3c4d5e6f47a8b9c0d1e2f3a4b5c6";
pub const DATUM_ID: &str = "9e8d7c6b5a4f43e2a1b0c9d8e7f6a5b4";

fn record(pairs: &[(&str, &str)]) -> SourceRecord {
    SourceRecord::new(
        pairs.iter().map(|(column, _)| column.to_string()),
        pairs.iter().map(|(_, value)| *value),
    )
    .expect("fixture columns are unique")
}

pub fn station(location_id: &str, x: &str, y: &str) -> SourceRecord {
    record(&[("LocationIdentifier", location_id), ("X", x), ("Y", y)])
}

#[derive(Debug, Clone, Default)]
pub struct MonitoringRow<'a> {
    pub station_id: &'a str,
    pub name: &'a str,
    pub monitoring_type: &'a str,
    pub project: &'a str,
    pub recorder: (&'a str, &'a str),
    pub bucket: (&'a str, &'a str),
    pub sensors: (&'a str, &'a str),
    pub comments: &'a str,
}

impl MonitoringRow<'_> {
    pub fn record(&self) -> SourceRecord {
        record(&[
            ("Station_ID", self.station_id),
            ("Station_Name", self.name),
            ("Monitoring_Type", self.monitoring_type),
            ("Project_Number", self.project),
            ("Type_of_Recorder", self.recorder.0),
            ("Recorder_Serial__", self.recorder.1),
            ("Type_of_Tipping_Bucket", self.bucket.0),
            ("T_B__Serial__", self.bucket.1),
            ("Type_of_Sensor", self.sensors.0),
            ("Sensor_Serial__", self.sensors.1),
            ("Comments", self.comments),
        ])
    }
}

/// A rain and stage site with a full equipment list.
pub fn rain_and_stage(station_id: &str) -> MonitoringRow<'_> {
    MonitoringRow {
        station_id,
        name: "Lake Outlet",
        monitoring_type: "Rainfall, Stage",
        project: "42",
        recorder: ("CR1000X", "L-100"),
        bucket: ("TE525", "TB-9"),
        sensors: ("PT12|CS451", "S-1|S-2"),
        comments: "Gauge house on east bank",
    }
}

pub fn measuring_point(location_id: &str, unique_id: &str, name: &str, flag: &str) -> SourceRecord {
    record(&[
        ("Identifier", location_id),
        ("UniqueId", unique_id),
        ("Name", name),
        ("Description", "Bolt on bridge pier"),
        ("ReferencePointPeriods_0_IsMeasuredAgainstLocalAssumedDatum", flag),
        ("ReferencePointPeriods_0_Elevation", "612.35"),
    ])
}

pub fn sources(
    stations: Vec<SourceRecord>,
    monitoring: Vec<SourceRecord>,
    measuring_points: Vec<SourceRecord>,
) -> LoadSources {
    LoadSources {
        stations,
        monitoring: MonitoringCache::new(monitoring),
        measuring_points: MeasuringPointIndex::new(measuring_points),
    }
}

pub fn photo_index_record(
    file_name: &str,
    location_id: &str,
    unique_id: &str,
    comment: &str,
    tags: [&str; 2],
) -> SourceRecord {
    record(&[
        ("FileName", file_name),
        ("Identifier", location_id),
        ("UniqueId", unique_id),
        ("Comment", comment),
        ("Tags_0_Key", tags[0]),
        ("Tags_1_Key", tags[1]),
    ])
}
