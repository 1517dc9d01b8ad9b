mod common;

use common::{measuring_point, rain_and_stage, station, MonitoringRow, DATUM_ID, GAUGE_A_ID, GAUGE_B_ID};
use hydromon_core::error::{EntityKind, ValidationError};
use hydromon_core::parser::SourceRecord;
use hydromon_core::transform::{
    Location, LocationSources, Point, RejectionReason, SensorRole, TransformRules,
};

fn build(
    station: &SourceRecord,
    monitoring: &SourceRecord,
    measuring_points: &[SourceRecord],
) -> Result<Location, ValidationError> {
    Location::transform(
        LocationSources {
            station,
            monitoring,
            measuring_points,
        },
        &TransformRules::default(),
    )
}

#[test]
fn full_site_builds_every_entity() {
    let station = station("1234.0", "512345.25", "4612345.5");
    let monitoring = rain_and_stage("1234").record();
    let points = vec![
        measuring_point("1234", DATUM_ID, "NAVD88 0ft", "FALSE"),
        measuring_point("1234", GAUGE_A_ID, "Staff Gauge A", "FALSE"),
        measuring_point("1234", GAUGE_B_ID, "Staff Gauge B", "True"),
    ];

    let location = build(&station, &monitoring, &points).expect("site should validate");

    assert_eq!(location.location_id, "001234");
    assert_eq!(location.name.as_deref(), Some("Lake Outlet"));
    assert_eq!(location.project, Some(42));
    assert_eq!(location.comments.as_deref(), Some("Gauge house on east bank"));
    assert_eq!(location.shape.x, 512345.25);
    assert_eq!(location.shape.srid, 26916);
    assert!(location.has_rainfall);
    assert!(location.has_stage);
    assert!(!location.has_groundwater);
    assert!(location.has_data_logger);
    assert!(location.has_generic_sensor);
    assert!(location.has_measuring_point);

    let logger = location.data_logger.as_ref().unwrap();
    assert_eq!(logger.logger_type, "CR1000X");
    assert_eq!(logger.low_battery_threshold, Some(11.5));

    assert_eq!(location.sensors.len(), 3);
    assert_eq!(location.tipping_bucket_count(), 1);
    assert_eq!(location.sensors[0].role, SensorRole::TippingBucket);
    assert_eq!(location.sensors[2].serial_number, "S-2");

    assert_eq!(location.measuring_points.len(), 1);
    assert_eq!(location.measuring_points[0].name.as_deref(), Some("Staff Gauge A"));
    assert_eq!(location.measuring_points[0].display_order, 1);
    assert_eq!(location.rejected_measuring_points.len(), 2);
    assert_eq!(
        location.measuring_points.len() + location.rejected_measuring_points.len(),
        points.len()
    );
    assert!(matches!(
        location.rejected_measuring_points[0].reason,
        RejectionReason::PlaceholderName { .. }
    ));
    assert!(matches!(
        location.rejected_measuring_points[1].reason,
        RejectionReason::LocalAssumedDatum { .. }
    ));
}

#[test]
fn d_stage_exclusion_wins_over_stage() {
    let station = station("10", "1", "2");
    let monitoring = MonitoringRow {
        monitoring_type: "Rainfall, Stage, D-Stage",
        ..rain_and_stage("10")
    }
    .record();

    let location = build(&station, &monitoring, &[]).expect("no measuring point needed");
    assert!(location.has_rainfall);
    assert!(!location.has_stage);
}

#[test]
fn no_capability_fails_construction() {
    let station = station("11", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "11",
        monitoring_type: "Snow survey",
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert_eq!(err.entity(), EntityKind::Location);
    assert_eq!(err.key(), "000011");
    assert!(matches!(err, ValidationError::Invariant { .. }));
}

#[test]
fn logger_alone_is_a_capability() {
    let station = station("12", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "12",
        recorder: ("CR300", "L-7"),
        ..Default::default()
    }
    .record();

    let location = build(&station, &monitoring, &[]).unwrap();
    assert!(location.has_data_logger);
    assert!(!location.has_generic_sensor);
}

#[test]
fn sensors_require_a_data_logger() {
    let station = station("13", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "13",
        monitoring_type: "Temp",
        sensors: ("PT12", "S-1"),
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert!(err.to_string().contains("no data logger"));
}

#[test]
fn rainfall_requires_a_tipping_bucket() {
    let station = station("14", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "14",
        monitoring_type: "Rainfall",
        recorder: ("CR300", "L-7"),
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert!(err.to_string().contains("tipping bucket"));
}

#[test]
fn stage_without_surviving_point_fails() {
    let station = station("15", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "15",
        monitoring_type: "Stage",
        ..Default::default()
    }
    .record();
    let rejected_only = vec![measuring_point("15", DATUM_ID, "NAVD88 0ft", "FALSE")];
    let err = build(&station, &monitoring, &rejected_only).unwrap_err();
    assert!(err.to_string().contains("requires a measuring point"));

    let accepted = vec![
        measuring_point("15", DATUM_ID, "NAVD88 0ft", "FALSE"),
        measuring_point("15", GAUGE_A_ID, "Staff Gauge A", "FALSE"),
    ];
    let location = build(&station, &monitoring, &accepted).unwrap();
    assert_eq!(location.measuring_points.len(), 1);
    assert_eq!(location.rejected_measuring_points.len(), 1);
}

#[test]
fn groundwater_display_order_counts_accepted_points_only() {
    let station = station("16", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "16",
        monitoring_type: "GW Level",
        ..Default::default()
    }
    .record();
    let points = vec![
        measuring_point("16", DATUM_ID, "NGVD29 0ft", "false"),
        measuring_point("16", GAUGE_A_ID, "Top of casing", "false"),
        measuring_point("16", GAUGE_B_ID, "Ground surface", "false"),
    ];

    let location = build(&station, &monitoring, &points).unwrap();
    assert!(location.has_groundwater);
    let orders: Vec<u32> = location
        .measuring_points
        .iter()
        .map(|point| point.display_order)
        .collect();
    assert_eq!(orders, vec![1, 2]);
}

#[test]
fn nameless_measuring_point_still_satisfies_groundwater() {
    let station = station("77", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "77",
        monitoring_type: "GW Level",
        ..Default::default()
    }
    .record();
    let points = vec![measuring_point("77", GAUGE_A_ID, "", "FALSE")];

    let location = build(&station, &monitoring, &points).expect("nameless point is loadable");
    assert_eq!(location.measuring_points.len(), 1);
    assert_eq!(location.measuring_points[0].name, None);
    assert!(location.rejected_measuring_points.is_empty());
}

#[test]
fn sensor_list_mismatch_fails_the_location() {
    let station = station("17", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "17",
        monitoring_type: "Cond",
        recorder: ("CR300", "L-7"),
        sensors: ("A|B", "1"),
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert!(matches!(err, ValidationError::SensorListMismatch { .. }));
}

#[test]
fn partial_recorder_pair_fails_the_location() {
    let station = station("18", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "18",
        monitoring_type: "Cond",
        recorder: ("CR300", ""),
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert_eq!(err.entity(), EntityKind::DataLogger);
    assert!(matches!(err, ValidationError::Pairing { .. }));
}

#[test]
fn non_integer_project_is_left_empty() {
    let station = station("19", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "19",
        monitoring_type: "WQ",
        project: "P-12",
        ..Default::default()
    }
    .record();

    let location = build(&station, &monitoring, &[]).unwrap();
    assert_eq!(location.project, None);
    assert!(location.has_water_quality);
}

#[test]
fn invalid_coordinates_are_reported() {
    let station = station("20", "east", "2");
    let monitoring = MonitoringRow {
        station_id: "20",
        monitoring_type: "WQ",
        ..Default::default()
    }
    .record();

    let err = build(&station, &monitoring, &[]).unwrap_err();
    assert!(matches!(err, ValidationError::Invalid { field: "X", .. }));
    assert!(err.to_string().contains("east"));
}

#[test]
fn shape_round_trips_through_geojson() {
    let point = Point {
        x: 512345.25,
        y: 4612345.5,
        srid: 26916,
    };
    let text = point.to_geojson();
    assert!(text.contains("\"Point\""));
    assert_eq!(Point::from_geojson(&text, 26916), Some(point));
}

#[test]
fn location_serializes_for_data_logging() {
    let station = station("21", "1", "2");
    let monitoring = MonitoringRow {
        station_id: "21",
        monitoring_type: "Discharge",
        ..Default::default()
    }
    .record();
    let location = build(&station, &monitoring, &[]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&location.to_json()).unwrap();
    assert_eq!(json["location_id"], "000021");
    assert_eq!(json["has_discharge"], true);
}
