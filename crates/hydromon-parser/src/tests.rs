use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::errors::{RecordError, SourceError};
use crate::formats::schema::{
    FILE_NAME, MONITORING_TYPE, STATION_ID, STATION_NAME, TYPE_OF_RECORDER,
};
use crate::formats::{
    tag_columns, tags, MeasuringPointFeed, MonitoringCache, MonitoringFeed, MonitoringLookup,
    PhotoIndexFeed, SourceFeed, StationsFeed,
};
use crate::keys::location_key;
use crate::record::SourceRecord;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(path)
}

#[test]
fn record_rejects_duplicate_columns() {
    let err = SourceRecord::new(["A", "B", "A"], ["1", "2", "3"]).unwrap_err();
    assert_eq!(
        err,
        RecordError::DuplicateColumn {
            name: "A".to_string()
        }
    );
}

#[test]
fn record_rejects_length_mismatch() {
    let err = SourceRecord::new(["A", "B"], ["1"]).unwrap_err();
    assert_eq!(
        err,
        RecordError::LengthMismatch {
            columns: 2,
            values: 1
        }
    );
}

#[test]
fn record_normalizes_blank_values() {
    let record =
        SourceRecord::from_pairs([("Name", "  Lake  "), ("Comments", "   "), ("Empty", "")])
            .unwrap();

    assert_eq!(record.get("Name"), Some("Lake"));
    assert_eq!(record.get("Comments"), None);
    assert_eq!(record.get("Empty"), None);
    assert!(record.contains("Comments"));
    assert!(!record.contains("Missing"));
    assert_eq!(record.get("Missing"), None);
}

#[test]
fn record_serializes_in_column_order() {
    let record = SourceRecord::from_pairs([("B", "2"), ("A", ""), ("C", "x")]).unwrap();
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(json, r#"{"B":"2","A":null,"C":"x"}"#);
}

#[test]
fn location_key_pads_and_accepts_float_rendering() {
    assert_eq!(location_key("1234").as_deref(), Some("001234"));
    assert_eq!(location_key(" 1234.0 ").as_deref(), Some("001234"));
    assert_eq!(location_key("001234").as_deref(), Some("001234"));
    assert_eq!(location_key("1234567").as_deref(), Some("1234567"));
    assert_eq!(location_key("12a"), None);
    assert_eq!(location_key("-5"), None);
    assert_eq!(location_key("12.5"), None);
    assert_eq!(location_key(""), None);
}

#[test]
fn monitoring_cache_reports_missing_found_and_ambiguous() {
    let records = MonitoringFeed
        .read_path(&fixture("monitoring.csv"))
        .expect("monitoring fixture should parse");
    assert_eq!(records.len(), 4);

    let cache = MonitoringCache::new(records);
    assert_eq!(cache.station_count(), 2);

    match cache.lookup("001234") {
        MonitoringLookup::Found(record) => {
            assert_eq!(record.get(STATION_NAME), Some("Lake Outlet"));
            assert_eq!(record.get(MONITORING_TYPE), Some("Rainfall, Stage"));
            assert_eq!(record.get(TYPE_OF_RECORDER), Some("CR1000X"));
        }
        other => panic!("expected a single record, got {other:?}"),
    }
    assert_eq!(cache.lookup("000077"), MonitoringLookup::Ambiguous(2));
    assert_eq!(cache.lookup("999999"), MonitoringLookup::Missing);
}

#[test]
fn measuring_point_index_groups_by_location() {
    let index = MeasuringPointFeed
        .read_index(&fixture("measuring_points.csv"))
        .expect("measuring point fixture should parse");

    let candidates = index.for_location("001234");
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].get("Name"), Some("Staff Gauge A"));
    assert!(index.for_location("000001").is_empty());
}

#[test]
fn feed_reports_missing_required_column() {
    let data = "LocationIdentifier,X\n1,2\n";
    let err = StationsFeed.read(data.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        SourceError::MissingColumn {
            feed: "stations",
            column: "Y"
        }
    ));
}

#[test]
fn feed_rejects_duplicate_header() {
    let data = "Station_ID,Station_Name,Monitoring_Type,Station_ID\n1,a,b,2\n";
    let err = MonitoringFeed.read(data.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        SourceError::Header {
            source: RecordError::DuplicateColumn { .. },
            ..
        }
    ));
}

#[test]
fn feed_strips_byte_order_mark_and_blank_rows() {
    let data = "\u{feff}LocationIdentifier,X,Y\n1,500000.5,4600000.25\n,,\n2,1,1\n";
    let records = StationsFeed.read(data.as_bytes()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("LocationIdentifier"), Some("1"));
}

#[test]
fn feed_reports_unreadable_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = StationsFeed
        .read_path(&dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, SourceError::Open { feed: "stations", .. }));
}

#[test]
fn feed_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photos.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "FileName,Identifier,UniqueId,Comment,Tags_10_Key,Tags_2_Key").unwrap();
    writeln!(file, "a.jpg,1234,abc,,MP,Site Photo").unwrap();
    drop(file);

    let records = PhotoIndexFeed.read_path(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get(FILE_NAME), Some("a.jpg"));
    assert_eq!(records[0].get(STATION_ID), None);
}

#[test]
fn tag_columns_are_ordered_numerically() {
    let record = SourceRecord::from_pairs([
        ("Tags_10_Key", "Ten"),
        ("Tags_2_Key", "Two"),
        ("Tags_x_Key", "Bad"),
        ("Tags_1_Key", ""),
        ("Tags_0_Value", "Ignored"),
    ])
    .unwrap();

    assert_eq!(
        tag_columns(record.columns()),
        vec!["Tags_1_Key", "Tags_2_Key", "Tags_10_Key"]
    );
    assert_eq!(tags(&record), vec!["Two".to_string(), "Ten".to_string()]);
}
